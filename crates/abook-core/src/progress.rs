//! Best-effort progress delivery.
//!
//! Workers report progress through plain callbacks. A frontend that wants
//! the updates on another thread can use [`channel`], whose sender side
//! never blocks: when the buffer is full the update is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TrySendError};
use std::sync::Arc;

/// Shared cooperative cancellation flag
pub type CancelFlag = Arc<AtomicBool>;

/// Create a fresh, un-cancelled flag
pub fn cancel_flag() -> CancelFlag {
    Arc::new(AtomicBool::new(false))
}

pub(crate) fn is_cancelled(flag: Option<&CancelFlag>) -> bool {
    flag.map(|f| f.load(Ordering::SeqCst)).unwrap_or(false)
}

/// A bounded, lossy progress channel.
///
/// Returns a callback suitable for the `with_progress_callback` builders and
/// the receiving end. Updates that do not fit into `capacity` are dropped.
pub fn channel<T>(capacity: usize) -> (Box<dyn Fn(&T) + Send + Sync>, Receiver<T>)
where
    T: Clone + Send + 'static,
{
    let (tx, rx) = mpsc::sync_channel(capacity.max(1));
    let callback = move |update: &T| match tx.try_send(update.clone()) {
        Ok(()) | Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {}
    };
    (Box::new(callback), rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_drops_when_full() {
        let (report, rx) = channel::<usize>(2);
        for i in 0..10 {
            report(&i);
        }
        let received: Vec<usize> = rx.try_iter().collect();
        assert_eq!(received, vec![0, 1]);
    }

    #[test]
    fn test_channel_survives_dropped_receiver() {
        let (report, rx) = channel::<String>(1);
        drop(rx);
        report(&"ignored".to_string());
    }

    #[test]
    fn test_cancel_flag() {
        let flag = cancel_flag();
        assert!(!is_cancelled(Some(&flag)));
        flag.store(true, Ordering::SeqCst);
        assert!(is_cancelled(Some(&flag)));
        assert!(!is_cancelled(None));
    }
}
