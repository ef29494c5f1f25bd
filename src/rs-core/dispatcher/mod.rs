use thiserror::Error;

use crate::{
    bindings::{RequestId, TimerId, TimerReason},
    host::PlayerHost,
    intro::IntroSequence,
    player::{ApiLoader, AudioState, ExternalPlayer, WidgetErrorKind, WidgetState},
    preload_gate::PreloadGate,
    progress::ProgressReporter,
    quality::QualityNegotiator,
    seek::ScrubState,
    session::{PlaybackSession, SessionToken},
    timers::TimerRegistry,
    wasm_bindgen,
};

mod api;
mod configuration;
mod core;
mod event_listeners;
mod snapshot;


pub(crate) use configuration::ControllerConfiguration;
pub use snapshot::PlayerSnapshot;

/// The `Dispatcher` is the playback session controller exported to the
/// JavaScript-side.
///
/// It wraps a single embed widget instance and owns everything derived from
/// it: which video is current, whether playback may start yet, the intro, the
/// quality being applied, seeking and completion reporting.
///
/// Commands coming from the UI are the methods defined in `api`. Callbacks from
/// the JavaScript-side (widget events, timers, report responses) are the
/// methods defined in `event_listeners`, each of which is turned into one
/// `PlayerEvent` handled by `dispatch`.
#[wasm_bindgen]
pub struct Dispatcher {
    /// Abstraction over the JavaScript environment.
    host: Box<dyn PlayerHost>,

    config: ControllerConfiguration,

    /// The video currently being watched. `None` until a video is selected.
    session: Option<PlaybackSession>,

    /// Token given to the last created session. Only ever grows.
    last_token: SessionToken,

    api_loader: ApiLoader,

    /// The embed widget instance, shared by every session of this mount.
    player: ExternalPlayer,

    /// Set when a video was selected while the player was not ready yet: the
    /// cue is replayed on readiness if that session is still the current one.
    pending_cue: Option<SessionToken>,

    preload_gate: PreloadGate,

    intro: IntroSequence,

    quality: QualityNegotiator,

    scrub: ScrubState,

    progress: ProgressReporter,

    /// Every timer currently started, and what it was started for.
    timers: TimerRegistry,

    /// Current error, if one. Only `PlaybackError::Stall` is non-terminal.
    error: Option<PlaybackError>,

    /// Last known position in the video, in seconds.
    current_time: f64,

    /// Duration of the current video in seconds, `0.` if unknown.
    duration: f64,

    /// Audio settings wanted by the user, which may differ from the
    /// underlying player's during the intro.
    audio: AudioState,

    /// Position at which the current buffering period was last checked for
    /// progress.
    stall_position: Option<f64>,
}

/// Every external callback the `Dispatcher` reacts to.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PlayerEvent {
    /// The embed widget's script reported that it is loaded.
    ApiLoaded,
    /// The embed widget's script failed to load.
    ApiLoadFailed,
    /// The widget instance fired its ready callback.
    PlayerReady,
    /// The widget reported a new state, through its event or through the
    /// reconciliation poll.
    StateChange(WidgetState),
    /// The widget reported a playback error code.
    PlayerError(i32),
    TimerEnded { id: TimerId, reason: TimerReason },
    ReportFinished {
        request_id: RequestId,
        payload: Option<String>,
    },
    ReportFailed { request_id: RequestId },
}

/// Stable error codes exposed to the JavaScript-side, which translates them
/// for the user.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackErrorCode {
    /// The embed widget could not be loaded.
    LoadFailure,
    InvalidVideoId,
    Html5Error,
    /// The video does not exist or is private.
    NotFound,
    /// The video's owner does not allow it to be embedded.
    EmbeddingDisallowed,
    UnknownPlaybackError,
    /// Buffering made no progress for too long.
    NetworkStall,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlaybackError {
    #[error("The video player could not be loaded.")]
    LoadFailure,
    #[error("{0}")]
    Widget(WidgetErrorKind),
    #[error("Network error, please try again.")]
    Stall,
}

impl PlaybackError {
    /// Terminal errors stop playback until `retry` is called.
    pub(crate) fn is_terminal(&self) -> bool {
        !matches!(self, PlaybackError::Stall)
    }

    pub(crate) fn code(&self) -> PlaybackErrorCode {
        match self {
            PlaybackError::LoadFailure => PlaybackErrorCode::LoadFailure,
            PlaybackError::Widget(WidgetErrorKind::InvalidVideoId) => {
                PlaybackErrorCode::InvalidVideoId
            }
            PlaybackError::Widget(WidgetErrorKind::Html5) => PlaybackErrorCode::Html5Error,
            PlaybackError::Widget(WidgetErrorKind::NotFound) => PlaybackErrorCode::NotFound,
            PlaybackError::Widget(WidgetErrorKind::EmbeddingDisallowed) => {
                PlaybackErrorCode::EmbeddingDisallowed
            }
            PlaybackError::Widget(WidgetErrorKind::Unknown(_)) => {
                PlaybackErrorCode::UnknownPlaybackError
            }
            PlaybackError::Stall => PlaybackErrorCode::NetworkStall,
        }
    }
}
