use crate::{
    bindings::{TimerId, TimerReason},
    session::SessionToken,
};

/// What a timer is tied to, and hence what invalidates it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TimerScope {
    /// Lives as long as the mounted player (API loading, reconciliation).
    Mount,

    /// Only meaningful while the session with that token is current.
    Session(SessionToken),
}

struct PendingTimer {
    id: TimerId,
    reason: TimerReason,
    scope: TimerScope,
}

/// Keeps track of every timer started through the `PlayerHost` and of what
/// each one was started for.
///
/// Clearing a timer on the JavaScript-side may race with its callback being
/// already queued, so a fired timer is only acted upon if it is still known
/// here and, for session-scoped ones, if its session is still the current one.
#[derive(Default)]
pub(crate) struct TimerRegistry {
    pending: Vec<PendingTimer>,
}

impl TimerRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register(&mut self, id: TimerId, reason: TimerReason, scope: TimerScope) {
        self.pending.push(PendingTimer { id, reason, scope });
    }

    /// Forget the timer with the given `TimerId`, returning what it was
    /// registered for.
    ///
    /// Returns `None` if it was unknown, which happens when it was cancelled
    /// in the meantime.
    pub(crate) fn take(&mut self, id: TimerId) -> Option<(TimerReason, TimerScope)> {
        let idx = self.pending.iter().position(|t| t.id == id)?;
        let timer = self.pending.remove(idx);
        Some((timer.reason, timer.scope))
    }

    pub(crate) fn is_pending(&self, reason: TimerReason) -> bool {
        self.pending.iter().any(|t| t.reason == reason)
    }

    /// Remove all timers started for the given reason, returning their ids so
    /// they can be cleared.
    pub(crate) fn drain_reason(&mut self, reason: TimerReason) -> Vec<TimerId> {
        self.drain_where(|t| t.reason == reason)
    }

    /// Remove all session-scoped timers.
    pub(crate) fn drain_session_scoped(&mut self) -> Vec<TimerId> {
        self.drain_where(|t| matches!(t.scope, TimerScope::Session(_)))
    }

    pub(crate) fn drain_all(&mut self) -> Vec<TimerId> {
        self.drain_where(|_| true)
    }

    fn drain_where(&mut self, pred: impl Fn(&PendingTimer) -> bool) -> Vec<TimerId> {
        let mut removed = vec![];
        self.pending.retain(|t| {
            if pred(t) {
                removed.push(t.id);
                false
            } else {
                true
            }
        });
        removed
    }
}
