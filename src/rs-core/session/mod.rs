use crate::wasm_bindgen;

mod video_id;

pub(crate) use video_id::{VideoId, VideoIdError};

/// Generation counter identifying a `PlaybackSession`.
///
/// Every asynchronous operation started on behalf of a session is tagged with
/// its token. Once another video is selected, results tagged with an older
/// token are discarded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct SessionToken(u32);

impl SessionToken {
    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Playback-related phase the current session is in.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// No video selected.
    Idle,
    /// Waiting on the embed API, the player or the cue of the selected video.
    Loading,
    /// The video is cued and can be started.
    Ready,
    /// The branded intro owns the transport.
    Intro,
    Playing,
    Paused,
    Buffering,
    /// Playback reached the end of the video.
    Ended,
    /// A load or playback failure happened, see `PlaybackError`.
    Error,
}

/// One logical "watching this video" instance, bounded by video selection
/// events.
pub(crate) struct PlaybackSession {
    video_id: VideoId,

    /// Opaque identifier of the content this video belongs to, used when
    /// reporting completion.
    content_id: Option<String>,

    token: SessionToken,

    phase: LifecyclePhase,
}

impl PlaybackSession {
    pub(crate) fn new(video_id: VideoId, content_id: Option<String>, token: SessionToken) -> Self {
        Self {
            video_id,
            content_id,
            token,
            phase: LifecyclePhase::Loading,
        }
    }

    pub(crate) fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    pub(crate) fn content_id(&self) -> Option<&str> {
        self.content_id.as_deref()
    }

    pub(crate) fn token(&self) -> SessionToken {
        self.token
    }

    pub(crate) fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: LifecyclePhase) {
        self.phase = phase;
    }
}
