/// Lazily loads the embed widget's script, once for the mounted player.
///
/// Loading goes `Idle -> Pending -> Fulfilled | Rejected`. Neither outcome is
/// cached permanently: a `Rejected` load is started afresh on the next
/// `ensure` call, and so is a `Pending` one that has been stuck for too long.
pub(crate) struct ApiLoader {
    state: ApiLoadState,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ApiLoadState {
    Idle,
    Pending {
        /// When the current script load was started.
        started_at: f64,
        /// When we began waiting for the API, across stalled restarts.
        waiting_since: f64,
    },
    Fulfilled,
    Rejected,
}

/// What a caller of `ApiLoader::ensure` should do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EnsureOutcome {
    /// The API is usable right now.
    Loaded,
    /// A load is already in progress, just wait for it.
    AlreadyPending,
    /// A new load has to be started.
    StartLoad,
}

/// Result of a readiness poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ReadinessCheck {
    /// The API just became available.
    BecameReady,
    /// Still waiting.
    Waiting,
    /// We waited for too long, the load is now rejected.
    TimedOut,
    /// No load is pending.
    NotPending,
}

impl ApiLoader {
    pub(crate) fn new() -> Self {
        Self {
            state: ApiLoadState::Idle,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_loaded(&self) -> bool {
        self.state == ApiLoadState::Fulfilled
    }

    pub(crate) fn is_pending(&self) -> bool {
        matches!(self.state, ApiLoadState::Pending { .. })
    }

    /// Make sure the API is loaded or being loaded.
    ///
    /// A pending load started more than `stall_timeout` milliseconds ago is
    /// discarded and restarted.
    pub(crate) fn ensure(&mut self, now: f64, stall_timeout: f64) -> EnsureOutcome {
        match self.state {
            ApiLoadState::Fulfilled => EnsureOutcome::Loaded,
            ApiLoadState::Pending {
                started_at,
                waiting_since,
            } => {
                if now - started_at < stall_timeout {
                    EnsureOutcome::AlreadyPending
                } else {
                    self.state = ApiLoadState::Pending {
                        started_at: now,
                        waiting_since,
                    };
                    EnsureOutcome::StartLoad
                }
            }
            ApiLoadState::Idle | ApiLoadState::Rejected => {
                self.state = ApiLoadState::Pending {
                    started_at: now,
                    waiting_since: now,
                };
                EnsureOutcome::StartLoad
            }
        }
    }

    /// Poll-based fallback to the script's own callbacks.
    pub(crate) fn check_readiness(
        &mut self,
        now: f64,
        api_available: bool,
        ready_timeout: f64,
    ) -> ReadinessCheck {
        match self.state {
            ApiLoadState::Pending { waiting_since, .. } => {
                if api_available {
                    self.state = ApiLoadState::Fulfilled;
                    ReadinessCheck::BecameReady
                } else if now - waiting_since >= ready_timeout {
                    self.state = ApiLoadState::Rejected;
                    ReadinessCheck::TimedOut
                } else {
                    ReadinessCheck::Waiting
                }
            }
            _ => ReadinessCheck::NotPending,
        }
    }

    /// The script announced it is loaded. Returns `true` if we were waiting
    /// for it.
    pub(crate) fn on_loaded(&mut self) -> bool {
        let was_pending = self.is_pending();
        self.state = ApiLoadState::Fulfilled;
        was_pending
    }

    /// The script failed to load. Returns `true` if we were waiting for it.
    pub(crate) fn on_failed(&mut self) -> bool {
        if self.is_pending() {
            self.state = ApiLoadState::Rejected;
            true
        } else {
            false
        }
    }

    pub(crate) fn reset(&mut self) {
        self.state = ApiLoadState::Idle;
    }
}
