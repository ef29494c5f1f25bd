use crate::player::AudioState;

/// Forced branded intro played once per session before the real playback
/// starts.
///
/// While active, the intro owns the transport: the underlying player is kept
/// muted, paused and at the start of the video.
pub(crate) struct IntroSequence {
    active: bool,

    /// Set once any intro of this session finished. Never reverts until the
    /// next session.
    complete: bool,

    /// The minimum intro duration elapsed.
    min_elapsed: bool,

    /// The intro was force-finished because the player never became ready.
    hard_timed_out: bool,

    /// Audio settings to restore once the intro is over.
    restore: Option<AudioState>,

    start_playback_after: bool,
}

/// What has to be done once the intro finished.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct IntroOutcome {
    pub(crate) restore: Option<AudioState>,
    pub(crate) resume_playback: bool,
}

impl IntroSequence {
    pub(crate) fn new() -> Self {
        Self {
            active: false,
            complete: false,
            min_elapsed: false,
            hard_timed_out: false,
            restore: None,
            start_playback_after: false,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.complete
    }

    pub(crate) fn min_elapsed(&self) -> bool {
        self.min_elapsed
    }

    pub(crate) fn hard_timed_out(&self) -> bool {
        self.hard_timed_out
    }

    /// Begin the intro, remembering the audio settings to restore.
    ///
    /// Returns `false` and does nothing if an intro is already active or
    /// already completed for this session.
    pub(crate) fn start(&mut self, restore: AudioState, start_playback_after: bool) -> bool {
        if self.active || self.complete {
            return false;
        }
        self.active = true;
        self.min_elapsed = false;
        self.hard_timed_out = false;
        self.restore = Some(restore);
        self.start_playback_after = start_playback_after;
        true
    }

    pub(crate) fn mark_min_elapsed(&mut self) {
        if self.active {
            self.min_elapsed = true;
        }
    }

    /// Audio settings that will be restored when the intro finishes, so user
    /// volume changes made meanwhile are not lost.
    pub(crate) fn restore_mut(&mut self) -> Option<&mut AudioState> {
        if self.active {
            self.restore.as_mut()
        } else {
            None
        }
    }

    /// Stop an active intro without completing it, e.g. when the session it
    /// belongs to is replaced. Returns the audio settings to restore.
    pub(crate) fn abandon(&mut self) -> Option<AudioState> {
        if !self.active {
            return None;
        }
        self.active = false;
        self.restore.take()
    }

    /// End the intro.
    ///
    /// Only the first call after `start` has an effect, later ones return
    /// `None`. With `hard_timeout`, playback is never resumed.
    pub(crate) fn finish(&mut self, hard_timeout: bool) -> Option<IntroOutcome> {
        if !self.active {
            return None;
        }
        self.active = false;
        self.complete = true;
        self.hard_timed_out = hard_timeout;
        Some(IntroOutcome {
            restore: self.restore.take(),
            resume_playback: self.start_playback_after && !hard_timeout,
        })
    }
}
