use std::future::Future;

use futures::future::{AbortHandle, Abortable, Aborted};
#[cfg(not(target_arch = "wasm32"))]
use maybe_sync::MaybeSend;

#[cfg(not(target_arch = "wasm32"))]
pub fn spawn<T>(future: T)
where
    T: Future + MaybeSend + 'static,
    T::Output: MaybeSend + 'static,
{
    tokio::spawn(future);
}

#[cfg(target_arch = "wasm32")]
pub fn spawn<T>(future: T)
where
    T: Future + 'static,
    T::Output: 'static,
{
    wasm_bindgen_futures::spawn_local(async {
        future.await;
    });
}

/// Wraps the future so that it can be stopped from outside. The returned future resolves to
/// `Err(Aborted)` as soon as it is polled after [`AbortHandle::abort`] was called, without polling
/// the inner future again.
pub fn abortable<T>(future: T) -> (impl Future<Output = Result<T::Output, Aborted>>, AbortHandle)
where
    T: Future,
{
    let (handle, registration) = AbortHandle::new_pair();
    (Abortable::new(future, registration), handle)
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_pending, assert_ready_eq, block_on, task};

    use super::*;

    #[test]
    fn abortable_resolves_with_inner_output() {
        let (future, _handle) = abortable(async { 7 });
        assert_eq!(block_on(future), Ok(7));
    }

    #[test]
    fn aborted_future_resolves_on_next_poll() {
        let (future, handle) = abortable(std::future::pending::<u32>());
        let mut future = task::spawn(future);
        assert_pending!(future.poll());

        handle.abort();
        assert!(future.is_woken());
        assert_ready_eq!(future.poll(), Err(Aborted));
    }
}
