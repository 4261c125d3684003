use crate::error::SyncError;

/// Visibility and opacity an overlay should be drawn with.
///
/// Changed only by the controller in response to UI events, and applied to the engine every time
/// the overlay style layers are created or updated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesiredVisualState {
    visible: bool,
    opacity: f32,
}

impl DesiredVisualState {
    /// Creates a new state. Opacity is clamped into `[0, 1]`; NaN is treated as fully opaque.
    pub fn new(visible: bool, opacity: f32) -> Self {
        let opacity = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };

        Self { visible, opacity }
    }

    /// Whether the overlay is shown.
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Opacity in `[0, 1]`.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Stores the opacity clamped into `[0, 1]` and returns the stored value.
    pub(crate) fn set_opacity(&mut self, opacity: f32) -> Result<f32, SyncError> {
        if opacity.is_nan() {
            return Err(SyncError::InvalidOpacity(opacity));
        }

        self.opacity = opacity.clamp(0.0, 1.0);
        Ok(self.opacity)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn opacity_is_clamped() {
        let mut state = DesiredVisualState::new(true, 0.5);
        assert_relative_eq!(state.set_opacity(1.5).expect("valid"), 1.0);
        assert_relative_eq!(state.set_opacity(-0.1).expect("valid"), 0.0);
        assert_relative_eq!(state.set_opacity(0.3).expect("valid"), 0.3);
    }

    #[test]
    fn nan_opacity_is_rejected() {
        let mut state = DesiredVisualState::new(true, 0.5);
        assert_matches!(state.set_opacity(f32::NAN), Err(SyncError::InvalidOpacity(_)));
        assert_relative_eq!(state.opacity(), 0.5);
    }
}
