use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use web_time::Instant;

use super::fetch_state::FetchState;
use super::{
    CompletionOutcome, DesiredVisualState, FetchCompletion, LayerStatus, RefreshOutcome,
    Registration,
};
use crate::async_runtime;
use crate::basemap::{BasemapChoice, BasemapConfig};
use crate::engine::{Cursor, MapEngine, Popup, SourceData, Visibility};
use crate::error::SyncError;
use crate::event::{MapEvent, MapEventKind, PointerEvent, PointerEventKind, Subscription};
use crate::layer::{point_position, OverlayLayer};
use crate::platform::Transport;
use crate::provider::{ProviderRequest, ViewportProvider};
use crate::ui::{UiEvent, WidgetBinding, WidgetMap};

/// Keeps overlay layers of a map engine in sync with the UI state and the viewport.
///
/// The controller is owned by the thread that drives the engine. All methods are synchronous
/// except [`LayerSyncController::next_completion`]. Requests of viewport dependent overlays are
/// spawned onto the async runtime (tokio on native targets, the browser event loop on wasm), so
/// [`LayerSyncController::refresh`] and the methods calling it must run inside a tokio runtime on
/// native targets.
///
/// Use [`LayerSyncBuilder`](crate::LayerSyncBuilder) to create a controller.
pub struct LayerSyncController<E: MapEngine> {
    engine: E,
    transport: Arc<dyn Transport>,
    overlays: Vec<OverlayLayer>,
    visual: HashMap<String, DesiredVisualState>,
    fetches: HashMap<String, FetchState>,
    statuses: HashMap<String, LayerStatus>,
    basemap: Option<BasemapConfig>,
    basemap_choice: BasemapChoice,
    widgets: WidgetMap,
    subscriptions: HashSet<Subscription>,
    completion_sender: UnboundedSender<FetchCompletion>,
    completion_receiver: UnboundedReceiver<FetchCompletion>,
}

impl<E: MapEngine> LayerSyncController<E> {
    pub(crate) fn new(
        engine: E,
        transport: Arc<dyn Transport>,
        overlays: Vec<OverlayLayer>,
        basemap: Option<BasemapConfig>,
        widgets: WidgetMap,
    ) -> Self {
        let visual = overlays
            .iter()
            .map(|overlay| (overlay.id().to_owned(), overlay.initial_state()))
            .collect();
        let statuses = overlays
            .iter()
            .map(|overlay| (overlay.id().to_owned(), LayerStatus::Idle))
            .collect();
        let basemap_choice = basemap
            .as_ref()
            .map(|config| config.initial)
            .unwrap_or_default();
        let (completion_sender, completion_receiver) = mpsc::unbounded_channel();

        Self {
            engine,
            transport,
            overlays,
            visual,
            fetches: HashMap::new(),
            statuses,
            basemap,
            basemap_choice,
            widgets,
            subscriptions: HashSet::new(),
            completion_sender,
            completion_receiver,
        }
    }

    /// Map engine the controller drives.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable access to the map engine.
    ///
    /// Removing overlay sources or layers through this reference is not tracked by the
    /// controller; they are re-created on the next load event.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Declared overlays in declaration order.
    pub fn overlays(&self) -> &[OverlayLayer] {
        &self.overlays
    }

    /// Overlay with the given id.
    pub fn overlay(&self, layer_id: &str) -> Option<&OverlayLayer> {
        self.overlays.iter().find(|overlay| overlay.id() == layer_id)
    }

    /// Desired visibility and opacity of the overlay.
    pub fn desired_state(&self, layer_id: &str) -> Option<DesiredVisualState> {
        self.visual.get(layer_id).copied()
    }

    /// Loading state of the overlay.
    pub fn status(&self, layer_id: &str) -> Option<&LayerStatus> {
        self.statuses.get(layer_id)
    }

    /// Sequence number of the request of the overlay that is currently in flight.
    pub fn in_flight(&self, layer_id: &str) -> Option<u64> {
        self.fetches.get(layer_id)?.in_flight_seq()
    }

    /// Currently selected basemap.
    pub fn basemap(&self) -> BasemapChoice {
        self.basemap_choice
    }

    /// Widget mapping used by [`LayerSyncController::handle_ui_event`].
    pub fn widgets(&self) -> &WidgetMap {
        &self.widgets
    }

    /// Subscribes to the map lifecycle events the controller reacts to. Calling it more than once
    /// has no effect.
    pub fn attach(&mut self) {
        for kind in [
            MapEventKind::Load,
            MapEventKind::StyleLoaded,
            MapEventKind::MoveEnd,
        ] {
            subscribe(
                &mut self.subscriptions,
                &mut self.engine,
                Subscription::Map(kind),
            );
        }
    }

    /// Makes sure the source and all style layers of the overlay exist in the engine.
    ///
    /// Missing style layers are created with the current desired visibility and opacity. Existing
    /// ones are left untouched, so the method can be called on every load and style change.
    pub fn ensure_registered(&mut self, layer_id: &str) -> Result<Registration, SyncError> {
        let overlay = find_overlay(&self.overlays, layer_id)?;
        if !self.engine.is_style_loaded() {
            log::debug!("Style is not loaded yet, postponing registration of {layer_id}");
            return Ok(Registration::StyleNotReady);
        }

        let state = self
            .visual
            .get(layer_id)
            .copied()
            .unwrap_or_else(|| overlay.initial_state());

        let mut created = false;
        if !self.engine.has_source(layer_id) {
            self.engine.add_source(layer_id, overlay.source_spec())?;
            created = true;
        }

        for spec in overlay.sub_layers(&state) {
            if !self.engine.has_layer(&spec.id) {
                self.engine.add_layer(spec, None)?;
                created = true;
            }
        }

        if overlay.popup().is_some() {
            for layer in overlay.sub_layer_ids() {
                for kind in [
                    PointerEventKind::Enter,
                    PointerEventKind::Leave,
                    PointerEventKind::Click,
                ] {
                    subscribe(
                        &mut self.subscriptions,
                        &mut self.engine,
                        Subscription::Layer {
                            kind,
                            layer: layer.clone(),
                        },
                    );
                }
            }
        }

        if created {
            log::info!("Registered overlay {layer_id}");
            Ok(Registration::Created)
        } else {
            Ok(Registration::AlreadyPresent)
        }
    }

    /// Calls [`LayerSyncController::ensure_registered`] for every overlay in declaration order.
    pub fn ensure_all_registered(&mut self) -> Result<(), SyncError> {
        for layer_id in self.overlay_ids(|_| true) {
            self.ensure_registered(&layer_id)?;
        }

        Ok(())
    }

    /// Shows or hides the overlay.
    ///
    /// Showing a viewport dependent overlay requests its data for the current viewport. Hiding
    /// it aborts the request in flight and clears its data.
    pub fn set_visibility(&mut self, layer_id: &str, visible: bool) -> Result<(), SyncError> {
        let overlay = find_overlay(&self.overlays, layer_id)?;
        self.visual
            .entry(layer_id.to_owned())
            .or_insert_with(|| overlay.initial_state())
            .set_visible(visible);

        let value = Visibility::from_visible(visible).to_value();
        for sub_layer in overlay.sub_layer_ids() {
            if self.engine.has_layer(&sub_layer) {
                self.engine
                    .set_layout_property(&sub_layer, Visibility::PROPERTY, value.clone())?;
            }
        }

        if !overlay.is_viewport_dependent() {
            return Ok(());
        }

        if visible {
            self.refresh(layer_id)?;
        } else {
            self.clear(layer_id)?;
        }

        Ok(())
    }

    /// Sets opacity of all style layers of the overlay. The value is clamped into `[0, 1]` and
    /// returned.
    pub fn set_opacity(&mut self, layer_id: &str, opacity: f32) -> Result<f32, SyncError> {
        let overlay = find_overlay(&self.overlays, layer_id)?;
        let opacity = self
            .visual
            .entry(layer_id.to_owned())
            .or_insert_with(|| overlay.initial_state())
            .set_opacity(opacity)?;

        let value = Value::from(f64::from(opacity));
        for (sub_layer, kind) in overlay.sub_layer_kinds() {
            if !self.engine.has_layer(&sub_layer) {
                continue;
            }

            for property in kind.opacity_properties() {
                self.engine
                    .set_paint_property(&sub_layer, property, value.clone())?;
            }
        }

        Ok(opacity)
    }

    /// Requests the data of a viewport dependent overlay for the current viewport.
    ///
    /// The request in flight for the overlay, if any, is aborted and the response of the new one
    /// is the only one that will be applied. Hidden overlays are cleared instead. The request in
    /// flight is also aborted when no new one can be issued, either because the overlay source is
    /// missing or because the viewport is rejected by the provider. The data shown stays.
    pub fn refresh(&mut self, layer_id: &str) -> Result<RefreshOutcome, SyncError> {
        let overlay = find_overlay(&self.overlays, layer_id)?;
        let Some(provider) = overlay.provider().cloned() else {
            return Ok(RefreshOutcome::NotViewportDependent);
        };

        let visible = self
            .visual
            .get(layer_id)
            .copied()
            .unwrap_or_else(|| overlay.initial_state())
            .visible();
        if !visible {
            self.clear(layer_id)?;
            return Ok(RefreshOutcome::Hidden);
        }

        if !self.engine.has_source(layer_id) {
            log::debug!("Overlay {layer_id} is not registered yet, refresh deferred");
            self.cancel_in_flight(layer_id);
            return Ok(RefreshOutcome::Deferred);
        }

        let request = match provider.build_request(&self.engine.viewport().normalized()) {
            Ok(request) => request,
            Err(err) => {
                self.cancel_in_flight(layer_id);
                return Err(err);
            }
        };

        let fetch = self.fetches.entry(layer_id.to_owned()).or_default();
        let seq = fetch.next_seq();
        log::trace!("Requesting {layer_id} #{seq}: {}", request.url);

        let (task, handle) =
            async_runtime::abortable(fetch_data(self.transport.clone(), provider, request));
        fetch.track(seq, handle);
        self.statuses
            .insert(layer_id.to_owned(), LayerStatus::Loading);

        let sender = self.completion_sender.clone();
        let layer = layer_id.to_owned();
        async_runtime::spawn(async move {
            let result = task.await.unwrap_or(Err(SyncError::Cancelled));
            if sender.send(FetchCompletion { layer, seq, result }).is_err() {
                log::debug!("Controller is dropped, discarding response");
            }
        });

        Ok(RefreshOutcome::Issued(seq))
    }

    /// Refreshes every viewport dependent overlay. Errors are logged and stored in the overlay
    /// status. Returns the number of issued requests.
    pub fn refresh_all(&mut self) -> usize {
        let mut issued = 0;
        for layer_id in self.overlay_ids(OverlayLayer::is_viewport_dependent) {
            match self.refresh(&layer_id) {
                Ok(RefreshOutcome::Issued(_)) => issued += 1,
                Ok(_) => {}
                Err(err) => {
                    log::warn!("Failed to refresh overlay {layer_id}: {err}");
                    self.statuses
                        .insert(layer_id, LayerStatus::Failed(err.to_string()));
                }
            }
        }

        issued
    }

    /// Applies the result of a background request, if the request is still the current one for
    /// its overlay.
    pub fn apply_completion(&mut self, completion: FetchCompletion) -> CompletionOutcome {
        let FetchCompletion { layer, seq, result } = completion;
        if result.as_ref().is_err_and(SyncError::is_cancelled) {
            log::trace!("Request #{seq} of {layer} was cancelled");
            return CompletionOutcome::Cancelled;
        }

        let is_current = self
            .fetches
            .get_mut(&layer)
            .is_some_and(|fetch| fetch.complete(seq));
        if !is_current {
            log::debug!("Discarding superseded response #{seq} of {layer}");
            return CompletionOutcome::Superseded;
        }

        let data = match result {
            Ok(data) => data,
            Err(err) => {
                log::warn!("Failed to load overlay {layer}: {err}");
                self.statuses
                    .insert(layer, LayerStatus::Failed(err.to_string()));
                return CompletionOutcome::Failed;
            }
        };

        if !self.engine.has_source(&layer) {
            log::debug!("Source of overlay {layer} was removed before the data arrived");
            self.statuses.insert(layer, LayerStatus::Idle);
            return CompletionOutcome::Superseded;
        }

        let features = data.feature_count();
        if let Err(err) = self.engine.set_source_data(&layer, data) {
            log::warn!("Failed to set data of overlay {layer}: {err}");
            self.statuses
                .insert(layer, LayerStatus::Failed(err.to_string()));
            return CompletionOutcome::Failed;
        }

        match features {
            Some(count) => log::info!("Loaded {count} features of overlay {layer}"),
            None => log::info!("Loaded image of overlay {layer}"),
        }
        self.statuses.insert(layer, LayerStatus::Loaded { features });

        CompletionOutcome::Applied
    }

    /// Applies all results that already arrived without waiting for the ones still in flight.
    pub fn process_pending(&mut self) -> Vec<CompletionOutcome> {
        let mut outcomes = vec![];
        while let Ok(completion) = self.completion_receiver.try_recv() {
            outcomes.push(self.apply_completion(completion));
        }

        outcomes
    }

    /// Waits for the next result of a background request and applies it.
    ///
    /// Every issued request produces exactly one result, including aborted ones. If no request
    /// was issued, the returned future never resolves.
    pub async fn next_completion(&mut self) -> Option<CompletionOutcome> {
        let completion = self.completion_receiver.recv().await?;
        Some(self.apply_completion(completion))
    }

    /// Shows the given basemap group and hides the other one.
    ///
    /// The raster basemap is registered if the style doesn't contain it, and is kept beneath the
    /// lowest overlay style layer, so that it never covers the overlays.
    pub fn set_basemap(&mut self, choice: BasemapChoice) -> Result<(), SyncError> {
        self.basemap_choice = choice;
        let Some(config) = &self.basemap else {
            log::debug!("No basemap is configured, ignoring {choice:?} selection");
            return Ok(());
        };

        if !self.engine.is_style_loaded() {
            return Ok(());
        }

        let raster = &config.raster;
        let raster_visible = choice == BasemapChoice::Raster;
        if !self.engine.has_source(&raster.source_id) {
            self.engine
                .add_source(&raster.source_id, raster.source_spec())?;
        }
        if !self.engine.has_layer(&raster.layer_id) {
            self.engine
                .add_layer(raster.layer_spec(raster_visible), None)?;
        }

        self.engine.set_layout_property(
            &raster.layer_id,
            Visibility::PROPERTY,
            Visibility::from_visible(raster_visible).to_value(),
        )?;
        for layer in &config.vector_layers {
            if self.engine.has_layer(layer) {
                self.engine.set_layout_property(
                    layer,
                    Visibility::PROPERTY,
                    Visibility::from_visible(!raster_visible).to_value(),
                )?;
            }
        }

        let lowest_overlay = self.engine.layer_ids().into_iter().find(|id| {
            self.overlays
                .iter()
                .any(|overlay| overlay.owns_sub_layer(id))
        });
        if let Some(lowest_overlay) = lowest_overlay {
            self.engine
                .move_layer(&raster.layer_id, Some(&lowest_overlay))?;
        }

        Ok(())
    }

    /// Reacts to an event of the map engine.
    pub fn handle_map_event(&mut self, event: MapEvent) -> Result<(), SyncError> {
        match event {
            MapEvent::Map(MapEventKind::Load | MapEventKind::StyleLoaded) => {
                self.ensure_all_registered()?;
                self.set_basemap(self.basemap_choice)?;
                self.refresh_all();
            }
            MapEvent::Map(MapEventKind::MoveEnd) => {
                self.refresh_all();
            }
            MapEvent::Map(MapEventKind::Move) => {}
            MapEvent::Pointer(event) => self.handle_pointer(event),
        }

        Ok(())
    }

    /// Reacts to an event of a UI widget using the widget mapping.
    pub fn handle_ui_event(&mut self, event: UiEvent) -> Result<(), SyncError> {
        let Some(binding) = self.widgets.binding(event.widget()).cloned() else {
            log::debug!("Ignoring event of unknown widget {}", event.widget());
            return Ok(());
        };

        match (event, binding) {
            (UiEvent::Toggle { checked, .. }, WidgetBinding::Visibility(layer_id)) => {
                self.set_visibility(&layer_id, checked)
            }
            (UiEvent::Slider { value, .. }, WidgetBinding::Opacity(layer_id)) => {
                self.set_opacity(&layer_id, value).map(|_| ())
            }
            (UiEvent::Button { .. }, WidgetBinding::Basemap(choice))
            | (UiEvent::Toggle { checked: true, .. }, WidgetBinding::Basemap(choice)) => {
                self.set_basemap(choice)
            }
            (event, binding) => {
                log::debug!("Ignoring {event:?} of widget bound to {binding:?}");
                Ok(())
            }
        }
    }

    fn handle_pointer(&mut self, event: PointerEvent) {
        let Some(template) = self
            .overlays
            .iter()
            .find(|overlay| overlay.owns_sub_layer(&event.layer))
            .and_then(OverlayLayer::popup)
        else {
            log::debug!("Ignoring pointer event on non-interactive layer {}", event.layer);
            return;
        };

        match event.kind {
            PointerEventKind::Enter => self.engine.set_cursor(Cursor::Pointer),
            PointerEventKind::Leave => self.engine.set_cursor(Cursor::Default),
            PointerEventKind::Click => {
                let Some(feature) = &event.feature else {
                    log::debug!("Click on {} without a feature", event.layer);
                    return;
                };

                let html = template.render(feature);
                let position = point_position(feature).unwrap_or(event.position);
                self.engine.show_popup(Popup { position, html });
            }
        }
    }

    fn cancel_in_flight(&mut self, layer_id: &str) {
        let cancelled = self
            .fetches
            .get_mut(layer_id)
            .is_some_and(FetchState::cancel);
        if cancelled {
            log::debug!("Cancelled request of overlay {layer_id}");
            self.statuses
                .insert(layer_id.to_owned(), LayerStatus::Idle);
        }
    }

    fn clear(&mut self, layer_id: &str) -> Result<(), SyncError> {
        self.cancel_in_flight(layer_id);
        self.statuses
            .insert(layer_id.to_owned(), LayerStatus::Idle);

        let overlay = find_overlay(&self.overlays, layer_id)?;
        if self.engine.has_source(layer_id) {
            self.engine
                .set_source_data(layer_id, overlay.empty_data())?;
        }

        Ok(())
    }

    fn overlay_ids(&self, filter: impl Fn(&OverlayLayer) -> bool) -> Vec<String> {
        self.overlays
            .iter()
            .filter(|overlay| filter(*overlay))
            .map(|overlay| overlay.id().to_owned())
            .collect()
    }
}

impl<E: MapEngine + std::fmt::Debug> std::fmt::Debug for LayerSyncController<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerSyncController")
            .field("engine", &self.engine)
            .field("overlays", &self.overlays)
            .field("visual", &self.visual)
            .field("statuses", &self.statuses)
            .field("basemap_choice", &self.basemap_choice)
            .finish_non_exhaustive()
    }
}

fn find_overlay<'a>(
    overlays: &'a [OverlayLayer],
    layer_id: &str,
) -> Result<&'a OverlayLayer, SyncError> {
    overlays
        .iter()
        .find(|overlay| overlay.id() == layer_id)
        .ok_or_else(|| SyncError::UnknownLayer(layer_id.to_owned()))
}

fn subscribe<E: MapEngine>(
    subscriptions: &mut HashSet<Subscription>,
    engine: &mut E,
    subscription: Subscription,
) {
    if !subscriptions.contains(&subscription) {
        engine.subscribe(&subscription);
        subscriptions.insert(subscription);
    }
}

async fn fetch_data(
    transport: Arc<dyn Transport>,
    provider: Arc<dyn ViewportProvider>,
    request: ProviderRequest,
) -> Result<SourceData, SyncError> {
    let started = Instant::now();
    let bytes = transport.get(&request.url).await?;
    log::debug!(
        "Received {} bytes from {} in {:?}",
        bytes.len(),
        request.url,
        started.elapsed()
    );

    provider.decode(bytes, &request)
}
