use futures::future::AbortHandle;

/// Single-flight bookkeeping of a viewport dependent overlay.
///
/// Every issued request gets the next sequence number. Only the response of the request that is
/// currently in flight may be applied; issuing a new request or cancelling aborts the previous one.
#[derive(Debug, Default)]
pub(crate) struct FetchState {
    last_issued: u64,
    in_flight: Option<InFlight>,
}

#[derive(Debug)]
struct InFlight {
    seq: u64,
    handle: AbortHandle,
}

impl FetchState {
    /// Aborts the request in flight, if any. Returns true if there was one.
    pub fn cancel(&mut self) -> bool {
        match self.in_flight.take() {
            Some(in_flight) => {
                in_flight.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Cancels the current request and reserves the sequence number for the next one.
    pub fn next_seq(&mut self) -> u64 {
        self.cancel();
        self.last_issued += 1;
        self.last_issued
    }

    /// Records the request with the sequence number obtained from [`FetchState::next_seq`].
    pub fn track(&mut self, seq: u64, handle: AbortHandle) {
        debug_assert_eq!(seq, self.last_issued);
        self.in_flight = Some(InFlight { seq, handle });
    }

    /// Clears the in-flight request if it has the given sequence number. Returns false if the
    /// response belongs to a request that was superseded or cancelled.
    pub fn complete(&mut self, seq: u64) -> bool {
        match &self.in_flight {
            Some(in_flight) if in_flight.seq == seq => {
                self.in_flight = None;
                true
            }
            _ => false,
        }
    }

    pub fn in_flight_seq(&self) -> Option<u64> {
        self.in_flight.as_ref().map(|in_flight| in_flight.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_request_supersedes_previous() {
        let mut state = FetchState::default();

        let first = state.next_seq();
        let (first_handle, _) = AbortHandle::new_pair();
        state.track(first, first_handle.clone());

        let second = state.next_seq();
        let (second_handle, _) = AbortHandle::new_pair();
        state.track(second, second_handle);

        assert!(first_handle.is_aborted());
        assert!(second > first);
        assert!(!state.complete(first));
        assert!(state.complete(second));
        assert_eq!(state.in_flight_seq(), None);
    }

    #[test]
    fn cancelled_request_is_not_applied() {
        let mut state = FetchState::default();
        let seq = state.next_seq();
        let (handle, _) = AbortHandle::new_pair();
        state.track(seq, handle);

        assert!(state.cancel());
        assert!(!state.cancel());
        assert!(!state.complete(seq));
        assert_eq!(state.next_seq(), seq + 1);
    }
}
