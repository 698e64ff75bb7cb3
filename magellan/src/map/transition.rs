//! Deferred completion signals for view transitions.
//!
//! A view transition completes in one of two ways, whichever happens first:
//!
//! * the animation driving the transition reaches its target - the "move finished"
//!   notification; or
//! * the settle check: a short while after the request the view is found already at the target
//!   pose (centers within tolerance, exact zoom). This covers the case where no actual
//!   movement was needed, no animation ever runs, and a finish notification would therefore
//!   never fire.
//!
//! Both arms feed the same oneshot sender, which makes the race explicit instead of a pile of
//! nested timers. When a new transition is requested while another one is still pending, the
//! pending handle is resolved with [`TransitionOutcome::Superseded`] right away; leaving it to
//! the settle check would let it resolve much later, with a misleading outcome.

use futures::channel::oneshot;
use web_time::SystemTime;

use crate::view::MapView;

/// How a view transition completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The animation reached the target view.
    Finished,
    /// The settle check found the view already at the target pose.
    Settled,
    /// A newer transition replaced this one before it completed.
    Superseded,
    /// The transition was not started, e.g. because the map is not initialized.
    Skipped,
}

/// Completion signal of a view transition.
///
/// Await [`TransitionHandle::wait`] to sequence work after the camera settles, e.g. to load
/// data for the new view. Dropping the handle is fine: the transition itself proceeds either
/// way.
pub struct TransitionHandle {
    receiver: oneshot::Receiver<TransitionOutcome>,
}

impl TransitionHandle {
    pub(crate) fn pending() -> (Self, oneshot::Sender<TransitionOutcome>) {
        let (sender, receiver) = oneshot::channel();
        (Self { receiver }, sender)
    }

    pub(crate) fn resolved(outcome: TransitionOutcome) -> Self {
        let (handle, sender) = Self::pending();
        let _ = sender.send(outcome);
        handle
    }

    /// Waits for the transition to complete.
    pub async fn wait(self) -> TransitionOutcome {
        self.receiver.await.unwrap_or(TransitionOutcome::Skipped)
    }

    /// Returns the outcome if the transition has already completed, without blocking.
    pub fn try_outcome(&mut self) -> Option<TransitionOutcome> {
        match self.receiver.try_recv() {
            Ok(outcome) => outcome,
            Err(_) => Some(TransitionOutcome::Skipped),
        }
    }
}

pub(crate) struct PendingTransition {
    pub(crate) target: MapView,
    pub(crate) settle_deadline: SystemTime,
    pub(crate) sender: oneshot::Sender<TransitionOutcome>,
}

impl PendingTransition {
    pub(crate) fn supersede(self) {
        let _ = self.sender.send(TransitionOutcome::Superseded);
    }
}
