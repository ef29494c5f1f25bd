use crate::session::SessionToken;

/// Blocks the first user-initiated playback of a session until either enough
/// time passed or enough media got buffered, so the widget gets to warm up
/// its own buffer before the user presses play.
///
/// The minimum duration is counted from the first evaluation seeing a ready
/// player with metadata, not from the video selection: a slow embed API load
/// does not eat into the warm-up time.
///
/// Once satisfied, a gate stays satisfied until the next session starts.
pub(crate) struct PreloadGate {
    /// A session started gating.
    armed: bool,

    /// Timestamp, in milliseconds, at which the player was first seen ready
    /// with metadata for this session.
    ready_since: Option<f64>,

    /// Session this gate was started for.
    token: SessionToken,

    satisfied: bool,
}

/// What the gate needs to know about the player at each poll.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GateObservation {
    pub(crate) player_ready: bool,
    /// Duration of the video, in seconds. A positive value means metadata
    /// is loaded.
    pub(crate) duration: f64,
    pub(crate) buffered_seconds: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GateStatus {
    /// The gate just opened on this evaluation.
    Opened,
    /// The gate was already open.
    AlreadyOpen,
    Gated,
    /// The evaluation was made for another session than the gate's.
    Stale,
}

impl PreloadGate {
    pub(crate) fn new() -> Self {
        Self {
            armed: false,
            ready_since: None,
            token: SessionToken::default(),
            satisfied: false,
        }
    }

    /// Reset the gate and start gating for the session `token`.
    pub(crate) fn start(&mut self, token: SessionToken) {
        self.armed = true;
        self.ready_since = None;
        self.token = token;
        self.satisfied = false;
    }

    pub(crate) fn is_satisfied(&self) -> bool {
        self.satisfied
    }

    /// `true` while a started gate is not yet satisfied.
    pub(crate) fn is_gating(&self) -> bool {
        self.armed && !self.satisfied
    }

    pub(crate) fn evaluate(
        &mut self,
        now: f64,
        token: SessionToken,
        obs: GateObservation,
        min_duration_ms: f64,
        buffer_threshold: f64,
    ) -> GateStatus {
        if token != self.token || !self.armed {
            return GateStatus::Stale;
        }
        if self.satisfied {
            return GateStatus::AlreadyOpen;
        }
        if !obs.player_ready || obs.duration <= 0. {
            return GateStatus::Gated;
        }
        let ready_since = *self.ready_since.get_or_insert(now);
        if now - ready_since >= min_duration_ms || obs.buffered_seconds >= buffer_threshold {
            self.satisfied = true;
            GateStatus::Opened
        } else {
            GateStatus::Gated
        }
    }
}
