use std::fmt;

use crate::{
    host::{PlayerHost, WidgetCallError},
    quality::QualityTier,
    session::VideoId,
    Logger,
};

mod api_loader;

pub(crate) use api_loader::{ApiLoader, EnsureOutcome, ReadinessCheck};

/// States the embed widget reports through its numeric state codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WidgetState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl WidgetState {
    pub(crate) fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(WidgetState::Unstarted),
            0 => Some(WidgetState::Ended),
            1 => Some(WidgetState::Playing),
            2 => Some(WidgetState::Paused),
            3 => Some(WidgetState::Buffering),
            5 => Some(WidgetState::Cued),
            _ => None,
        }
    }
}

/// Snapshot of the underlying player's audio settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct AudioState {
    pub(crate) muted: bool,
    pub(crate) volume: f64,
}

/// Handle over the single embed widget instance of the mounted component.
///
/// Every command goes through here so a widget method throwing never
/// escapes: the failure is logged and the reconciliation poll corrects our
/// view of the player on its next tick.
pub(crate) struct ExternalPlayer {
    /// `true` once `create` succeeded and until `destroy` is called.
    created: bool,

    /// `true` once the widget fired its ready callback (or reported a state
    /// code, which implies the same).
    ready: bool,

    /// Last state reported by the widget, through events or polling.
    reported_state: Option<WidgetState>,

    /// Video the widget currently has cued or loaded.
    loaded_video_id: Option<VideoId>,
}

impl ExternalPlayer {
    pub(crate) fn new() -> Self {
        Self {
            created: false,
            ready: false,
            reported_state: None,
            loaded_video_id: None,
        }
    }

    pub(crate) fn is_created(&self) -> bool {
        self.created
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.ready
    }

    pub(crate) fn reported_state(&self) -> Option<WidgetState> {
        self.reported_state
    }

    /// Returns `true` if the widget currently has `video_id` loaded.
    pub(crate) fn has_loaded(&self, video_id: &VideoId) -> bool {
        self.loaded_video_id.as_ref() == Some(video_id)
    }

    pub(crate) fn set_ready(&mut self) {
        self.ready = true;
    }

    pub(crate) fn set_reported_state(&mut self, state: WidgetState) {
        self.reported_state = Some(state);
    }

    /// Create the widget instance, bound to the mount node, with `video_id`
    /// cued.
    ///
    /// Does nothing if an instance already exists: it has to be destroyed
    /// first.
    pub(crate) fn create(&mut self, host: &mut dyn PlayerHost, video_id: &VideoId) -> bool {
        if self.created {
            Logger::warn("Player: Instance already created, ignoring");
            return false;
        }
        match host.create_player(video_id.as_str()) {
            Ok(()) => {
                Logger::info("Player: Instance created");
                self.created = true;
                self.ready = false;
                self.reported_state = None;
                self.loaded_video_id = Some(video_id.clone());
                true
            }
            Err(err) => {
                Logger::error(&format!("Player: Could not create instance: {err}"));
                false
            }
        }
    }

    pub(crate) fn destroy(&mut self, host: &mut dyn PlayerHost) {
        if self.created {
            swallow("destroy", host.destroy_player());
        }
        *self = Self::new();
    }

    /// Load `video_id` without starting it: pause, go back to the start, then
    /// cue the new video.
    pub(crate) fn cue(&mut self, host: &mut dyn PlayerHost, video_id: &VideoId) {
        Logger::lazy_info(&|| format!("Player: Cueing {video_id}"));
        swallow("pauseVideo", host.pause_video());
        swallow("seekTo", host.seek_to(0., true));
        if swallow("cueVideoById", host.cue_video_by_id(video_id.as_str())) {
            self.loaded_video_id = Some(video_id.clone());
            self.reported_state = None;
        }
    }

    pub(crate) fn play(&self, host: &mut dyn PlayerHost) {
        swallow("playVideo", host.play_video());
    }

    pub(crate) fn pause(&self, host: &mut dyn PlayerHost) {
        swallow("pauseVideo", host.pause_video());
    }

    pub(crate) fn seek_to(&self, host: &mut dyn PlayerHost, position: f64) {
        swallow("seekTo", host.seek_to(position, true));
    }

    pub(crate) fn mute(&self, host: &mut dyn PlayerHost) {
        swallow("mute", host.mute());
    }

    pub(crate) fn un_mute(&self, host: &mut dyn PlayerHost) {
        swallow("unMute", host.un_mute());
    }

    pub(crate) fn set_volume(&self, host: &mut dyn PlayerHost, volume: f64) {
        swallow("setVolume", host.set_volume(volume));
    }

    /// Apply the given audio settings to the widget.
    pub(crate) fn apply_audio(&self, host: &mut dyn PlayerHost, audio: AudioState) {
        if audio.muted {
            self.mute(host);
        } else {
            self.un_mute(host);
        }
        self.set_volume(host, audio.volume);
    }

    /// Read the widget's current audio settings, falling back to `fallback`
    /// for what could not be read.
    pub(crate) fn audio_state(&self, host: &dyn PlayerHost, fallback: AudioState) -> AudioState {
        AudioState {
            muted: host.is_muted().unwrap_or(fallback.muted),
            volume: host.volume().unwrap_or(fallback.volume),
        }
    }

    /// Force a single quality tier.
    pub(crate) fn request_quality(&self, host: &mut dyn PlayerHost, tier: QualityTier) {
        swallow(
            "setPlaybackQualityRange",
            host.set_playback_quality_range(tier.as_str(), tier.as_str()),
        );
        swallow("setPlaybackQuality", host.set_playback_quality(tier.as_str()));
    }

    /// Let the widget choose freely amongst every tier.
    pub(crate) fn request_auto_quality(&self, host: &mut dyn PlayerHost) {
        swallow(
            "setPlaybackQualityRange",
            host.set_playback_quality_range(QualityTier::LOWEST.as_str(), QualityTier::HIGHEST.as_str()),
        );
        swallow("setPlaybackQuality", host.set_playback_quality("default"));
    }

    pub(crate) fn applied_quality(&self, host: &dyn PlayerHost) -> Option<QualityTier> {
        host.playback_quality()
            .and_then(|q| QualityTier::from_name(&q))
    }

    pub(crate) fn available_qualities(&self, host: &dyn PlayerHost) -> Vec<QualityTier> {
        let mut tiers: Vec<QualityTier> = host
            .available_quality_levels()
            .iter()
            .filter_map(|q| QualityTier::from_name(q))
            .collect();
        tiers.sort();
        tiers.dedup();
        tiers
    }

    /// Amount of media, in seconds, the widget has buffered.
    pub(crate) fn buffered_seconds(&self, host: &dyn PlayerHost, duration: f64) -> f64 {
        match host.video_loaded_fraction() {
            Some(fraction) if fraction.is_finite() && duration > 0. => {
                fraction.clamp(0., 1.) * duration
            }
            _ => 0.,
        }
    }
}

fn swallow(action: &str, res: Result<(), WidgetCallError>) -> bool {
    match res {
        Ok(()) => true,
        Err(err) => {
            Logger::lazy_debug(&|| format!("Player: {action} failed: {err}"));
            false
        }
    }
}

/// Kinds of failures the widget reports through its `onError` event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WidgetErrorKind {
    InvalidVideoId,
    Html5,
    NotFound,
    EmbeddingDisallowed,
    Unknown(i32),
}

impl WidgetErrorKind {
    pub(crate) fn from_code(code: i32) -> Self {
        match code {
            2 => WidgetErrorKind::InvalidVideoId,
            5 => WidgetErrorKind::Html5,
            100 => WidgetErrorKind::NotFound,
            101 | 150 => WidgetErrorKind::EmbeddingDisallowed,
            other => WidgetErrorKind::Unknown(other),
        }
    }
}

impl fmt::Display for WidgetErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WidgetErrorKind::InvalidVideoId => write!(f, "This video's identifier is invalid."),
            WidgetErrorKind::Html5 => write!(f, "This video cannot be played in this browser."),
            WidgetErrorKind::NotFound => write!(f, "This video was removed or is private."),
            WidgetErrorKind::EmbeddingDisallowed => {
                write!(f, "The owner of this video does not allow it to be played here.")
            }
            WidgetErrorKind::Unknown(code) => {
                write!(f, "An error happened while playing this video (code {code}).")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::fake::{Call, FakeHost};

    fn video(id: &str) -> VideoId {
        VideoId::resolve(id).unwrap()
    }

    #[test]
    fn test_state_codes() {
        assert_eq!(WidgetState::from_code(-1), Some(WidgetState::Unstarted));
        assert_eq!(WidgetState::from_code(0), Some(WidgetState::Ended));
        assert_eq!(WidgetState::from_code(1), Some(WidgetState::Playing));
        assert_eq!(WidgetState::from_code(2), Some(WidgetState::Paused));
        assert_eq!(WidgetState::from_code(3), Some(WidgetState::Buffering));
        assert_eq!(WidgetState::from_code(5), Some(WidgetState::Cued));
        assert_eq!(WidgetState::from_code(4), None);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(WidgetErrorKind::from_code(2), WidgetErrorKind::InvalidVideoId);
        assert_eq!(WidgetErrorKind::from_code(5), WidgetErrorKind::Html5);
        assert_eq!(WidgetErrorKind::from_code(100), WidgetErrorKind::NotFound);
        assert_eq!(WidgetErrorKind::from_code(101), WidgetErrorKind::EmbeddingDisallowed);
        assert_eq!(WidgetErrorKind::from_code(150), WidgetErrorKind::EmbeddingDisallowed);
        assert_eq!(WidgetErrorKind::from_code(7), WidgetErrorKind::Unknown(7));
    }

    #[test]
    fn test_create_only_once() {
        let mut host = FakeHost::new();
        let mut player = ExternalPlayer::new();
        assert!(player.create(&mut host, &video("aaaaaaaaaaa")));
        assert!(!player.create(&mut host, &video("bbbbbbbbbbb")));
        assert!(player.has_loaded(&video("aaaaaaaaaaa")));
        player.destroy(&mut host);
        assert!(!player.is_created());
        assert!(player.create(&mut host, &video("bbbbbbbbbbb")));
    }

    #[test]
    fn test_cue_pauses_and_rewinds_first() {
        let mut host = FakeHost::new();
        let mut player = ExternalPlayer::new();
        player.create(&mut host, &video("aaaaaaaaaaa"));
        host.take_calls();
        player.cue(&mut host, &video("bbbbbbbbbbb"));
        assert_eq!(
            host.take_calls(),
            vec![
                Call::Pause,
                Call::SeekTo(0.),
                Call::Cue("bbbbbbbbbbb".to_owned())
            ]
        );
        assert!(player.has_loaded(&video("bbbbbbbbbbb")));
    }

    #[test]
    fn test_failing_widget_is_swallowed() {
        let mut host = FakeHost::new();
        let mut player = ExternalPlayer::new();
        player.create(&mut host, &video("aaaaaaaaaaa"));
        host.borrow_mut().responsive = false;
        player.play(&mut host);
        player.cue(&mut host, &video("bbbbbbbbbbb"));
        assert!(player.has_loaded(&video("aaaaaaaaaaa")));
        let fallback = AudioState {
            muted: true,
            volume: 42.,
        };
        assert_eq!(player.audio_state(&host, fallback), fallback);
    }

    #[test]
    fn test_available_qualities_are_sorted() {
        let mut host = FakeHost::new();
        let mut player = ExternalPlayer::new();
        player.create(&mut host, &video("aaaaaaaaaaa"));
        host.borrow_mut().available_qualities = vec![
            "hd720".to_owned(),
            "auto".to_owned(),
            "small".to_owned(),
            "hd1080".to_owned(),
        ];
        assert_eq!(
            player.available_qualities(&host),
            vec![QualityTier::Small, QualityTier::Hd720, QualityTier::Hd1080]
        );
    }
}
