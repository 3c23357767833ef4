//! # Preview Regeneration
//!
//! Hand-off primitive between an interactive UI (a "regenerate" button on
//! the host's panel) and the render driver. Requests are coalesced: any
//! number of clicks while a render is in flight collapse into a single
//! pending regeneration.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TryRecvError, TrySendError};

/// UI-side half. Cheap to clone into button callbacks.
#[derive(Clone)]
pub struct RegenerateTrigger {
    sender: SyncSender<()>,
}

impl RegenerateTrigger {
    /// Request a regeneration. Returns `true` if this created a new pending
    /// request, `false` if one was already queued or the driver is gone.
    pub fn notify(&self) -> bool {
        match self.sender.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) | Err(TrySendError::Disconnected(())) => false,
        }
    }
}

/// Driver-side half. Polled between renders.
pub struct RegenerateReceiver {
    receiver: Receiver<()>,
}

impl RegenerateReceiver {
    /// Consume the pending request, if any.
    pub fn take(&self) -> bool {
        match self.receiver.try_recv() {
            Ok(()) => true,
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => false,
        }
    }

    /// Block until a request arrives. Returns `false` when every trigger
    /// has been dropped.
    pub fn wait(&self) -> bool {
        self.receiver.recv().is_ok()
    }
}

/// Create a connected trigger/receiver pair with a single request slot.
pub fn regenerate_channel() -> (RegenerateTrigger, RegenerateReceiver) {
    let (sender, receiver) = sync_channel(1);
    (
        RegenerateTrigger { sender },
        RegenerateReceiver { receiver },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_request_round_trip() {
        let (trigger, receiver) = regenerate_channel();
        assert!(!receiver.take());
        assert!(trigger.notify());
        assert!(receiver.take());
        assert!(!receiver.take());
    }

    #[test]
    fn test_requests_coalesce_while_pending() {
        let (trigger, receiver) = regenerate_channel();
        assert!(trigger.notify());
        assert!(!trigger.notify());
        assert!(!trigger.notify());

        // Three clicks, one regeneration
        assert!(receiver.take());
        assert!(!receiver.take());
    }

    #[test]
    fn test_notify_across_threads() {
        let (trigger, receiver) = regenerate_channel();
        let handle = std::thread::spawn(move || trigger.notify());
        assert!(handle.join().unwrap());
        assert!(receiver.wait());
    }

    #[test]
    fn test_wait_ends_when_triggers_drop() {
        let (trigger, receiver) = regenerate_channel();
        drop(trigger);
        assert!(!receiver.wait());
    }
}
