use crate::session::LifecyclePhase;

/// Seeking is only possible once the video is actually playing and its intro
/// is over.
pub(crate) fn can_seek(phase: LifecyclePhase, intro_complete: bool) -> bool {
    phase == LifecyclePhase::Playing && intro_complete
}

/// Everything deciding whether a seek command may reach the player.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SeekGuard {
    pub(crate) can_seek: bool,
    pub(crate) switching_quality: bool,
    /// The widget has the session's video loaded.
    pub(crate) video_matches: bool,
}

impl SeekGuard {
    pub(crate) fn allows_seek(&self) -> bool {
        self.can_seek && !self.switching_quality && self.video_matches
    }
}

/// Clamp a wanted position to `[0, duration]`.
///
/// An unknown (non-positive) duration only clamps the lower bound.
pub(crate) fn clamp_position(position: f64, duration: f64) -> f64 {
    let position = if position.is_finite() { position } else { 0. };
    if duration > 0. {
        position.clamp(0., duration)
    } else {
        position.max(0.)
    }
}

/// Buffers seek-bar drags so only the final position reaches the player.
pub(crate) struct ScrubState {
    scrubbing: bool,
    scrub_target: Option<f64>,
}

impl ScrubState {
    pub(crate) fn new() -> Self {
        Self {
            scrubbing: false,
            scrub_target: None,
        }
    }

    pub(crate) fn is_scrubbing(&self) -> bool {
        self.scrubbing
    }

    pub(crate) fn target(&self) -> Option<f64> {
        self.scrub_target
    }

    pub(crate) fn begin(&mut self, position: f64) {
        self.scrubbing = true;
        self.scrub_target = Some(position);
    }

    pub(crate) fn update(&mut self, position: f64) {
        if self.scrubbing {
            self.scrub_target = Some(position);
        }
    }

    /// Stop scrubbing, returning the position to commit if one.
    pub(crate) fn end(&mut self, final_position: Option<f64>) -> Option<f64> {
        if !self.scrubbing {
            return None;
        }
        self.scrubbing = false;
        let target = final_position.or(self.scrub_target);
        self.scrub_target = None;
        target
    }

    pub(crate) fn cancel(&mut self) {
        self.scrubbing = false;
        self.scrub_target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_seek() {
        assert!(can_seek(LifecyclePhase::Playing, true));
        assert!(!can_seek(LifecyclePhase::Playing, false));
        for phase in [
            LifecyclePhase::Idle,
            LifecyclePhase::Loading,
            LifecyclePhase::Ready,
            LifecyclePhase::Intro,
            LifecyclePhase::Paused,
            LifecyclePhase::Buffering,
            LifecyclePhase::Ended,
            LifecyclePhase::Error,
        ] {
            assert!(!can_seek(phase, true));
        }
    }

    #[test]
    fn test_guard() {
        let guard = SeekGuard {
            can_seek: true,
            switching_quality: false,
            video_matches: true,
        };
        assert!(guard.allows_seek());
        assert!(!SeekGuard {
            switching_quality: true,
            ..guard
        }
        .allows_seek());
        assert!(!SeekGuard {
            video_matches: false,
            ..guard
        }
        .allows_seek());
    }

    #[test]
    fn test_clamp_position() {
        assert_eq!(clamp_position(-3., 120.), 0.);
        assert_eq!(clamp_position(130., 120.), 120.);
        assert_eq!(clamp_position(60., 120.), 60.);
        assert_eq!(clamp_position(60., 0.), 60.);
        assert_eq!(clamp_position(f64::NAN, 120.), 0.);
    }

    #[test]
    fn test_scrub_buffers_until_release() {
        let mut scrub = ScrubState::new();
        scrub.update(10.);
        assert_eq!(scrub.target(), None);
        scrub.begin(10.);
        scrub.update(20.);
        scrub.update(30.);
        assert!(scrub.is_scrubbing());
        assert_eq!(scrub.end(None), Some(30.));
        assert!(!scrub.is_scrubbing());
        assert_eq!(scrub.end(Some(40.)), None);
        scrub.begin(5.);
        assert_eq!(scrub.end(Some(45.)), Some(45.));
    }
}
