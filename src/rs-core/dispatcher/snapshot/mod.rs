use super::{Dispatcher, PlaybackErrorCode};
use crate::{
    quality::QualityPreference,
    session::LifecyclePhase,
    wasm_bindgen,
};

/// Everything the UI needs to render the player's current state.
///
/// Produced by `Dispatcher::snapshot`, generally after a state change
/// announcement.
#[wasm_bindgen]
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSnapshot {
    pub phase: LifecyclePhase,
    pub playing: bool,
    pub buffering: bool,
    /// Position in seconds. While scrubbing, the position being dragged to.
    pub current_time: f64,
    /// Duration in seconds, `0` while unknown.
    pub duration: f64,
    pub can_seek: bool,
    /// Playback is still held back by the preload gate.
    pub is_preloading: bool,
    pub intro_active: bool,
    /// The last intro had to be force-finished because the player was never
    /// ready.
    pub intro_timed_out: bool,
    /// A quality switch is in progress, controls should be disabled.
    pub switching_quality: bool,
    pub muted: bool,
    pub volume: f64,
    error_code: Option<PlaybackErrorCode>,
    error_message: Option<String>,
    quality_options: Vec<String>,
    displayed_quality: String,
}

#[wasm_bindgen]
impl PlayerSnapshot {
    #[wasm_bindgen(getter)]
    pub fn error_code(&self) -> Option<PlaybackErrorCode> {
        self.error_code
    }

    /// Message to display to the user, if an error happened.
    #[wasm_bindgen(getter)]
    pub fn error_message(&self) -> Option<String> {
        self.error_message.clone()
    }

    /// Qualities the user may choose from, `"auto"` first.
    #[wasm_bindgen(getter)]
    pub fn quality_options(&self) -> Vec<String> {
        self.quality_options.clone()
    }

    /// Quality to show as selected.
    #[wasm_bindgen(getter)]
    pub fn displayed_quality(&self) -> String {
        self.displayed_quality.clone()
    }
}

impl Dispatcher {
    pub(super) fn build_snapshot(&self) -> PlayerSnapshot {
        let phase = self.phase();
        let mut quality_options = vec![QualityPreference::AUTO_NAME.to_owned()];
        quality_options.extend(
            self.quality
                .available()
                .iter()
                .rev()
                .map(|tier| tier.as_str().to_owned()),
        );
        let displayed_quality = match self.quality.applied() {
            Some(tier) => tier.as_str().to_owned(),
            None => self.quality.preference().as_str().to_owned(),
        };
        PlayerSnapshot {
            phase,
            playing: phase == LifecyclePhase::Playing,
            buffering: phase == LifecyclePhase::Buffering,
            current_time: self.scrub.target().unwrap_or(self.current_time),
            duration: self.duration,
            can_seek: self.can_seek_now(),
            is_preloading: self.session.is_some() && self.preload_gate.is_gating(),
            intro_active: self.intro.is_active(),
            intro_timed_out: self.intro.hard_timed_out(),
            switching_quality: self.quality.is_switching(),
            muted: self.audio.muted,
            volume: self.audio.volume,
            error_code: self.error.map(|e| e.code()),
            error_message: self.error.map(|e| e.to_string()),
            quality_options,
            displayed_quality,
        }
    }
}
