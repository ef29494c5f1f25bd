use crate::{
    bindings::JsHost,
    host::PlayerHost,
    intro::IntroSequence,
    player::{ApiLoader, AudioState, ExternalPlayer},
    preload_gate::PreloadGate,
    progress::ProgressReporter,
    quality::{QualityNegotiator, QualityPreference},
    seek::ScrubState,
    session::SessionToken,
    timers::TimerRegistry,
    utils::logger::LoggerLevel,
    wasm_bindgen, Logger,
};

use super::{ControllerConfiguration, Dispatcher, PlayerSnapshot};

/// Methods exposed to the JavaScript-side.
///
/// Note that these are not the only methods callable by JavaScript. There's
/// also "event_listeners" which as its name point at, should be called when
/// particular events happen. Such "event_listeners" are defined in its own
/// file.
///
/// Every command below is followed by a state change announcement, so the UI
/// can read the new `snapshot`.
#[wasm_bindgen]
impl Dispatcher {
    /// Create a new `Dispatcher`, controlling the embed widget that will be
    /// mounted by the JavaScript-side.
    ///
    /// # Arguments
    ///
    /// * `initial_quality` - The quality preference persisted by a previous
    ///   session, if one. Unknown values are ignored.
    #[wasm_bindgen(constructor)]
    pub fn new(initial_quality: Option<String>) -> Self {
        Self::with_host(Box::new(JsHost), initial_quality.as_deref())
    }

    /// Select the video to play, as a raw 11-character id or as any of the
    /// usual watch, embed or short link URLs.
    ///
    /// Selecting the video already selected does nothing.
    ///
    /// # Arguments
    ///
    /// * `video` - The video id or URL.
    ///
    /// * `content_id` - Identifier of the content on the progress-reporting
    ///   backend. Completion is not reported without it.
    pub fn select_video(&mut self, video: &str, content_id: Option<String>) {
        self.select_video_core(video, content_id);
        self.announce();
    }

    pub fn toggle_play_pause(&mut self) {
        self.toggle_play_pause_core();
        self.announce();
    }

    /// Seek to `position`, in seconds. While scrubbing, only updates the
    /// position that will be seeked to on release.
    pub fn seek(&mut self, position: f64) {
        self.seek_core(position);
        self.announce();
    }

    /// The user started dragging the seek bar.
    pub fn seek_start(&mut self, position: f64) {
        self.seek_start_core(position);
        self.announce();
    }

    /// The user released the seek bar. The last position given through `seek`
    /// is used if `position` is not set.
    pub fn seek_end(&mut self, position: Option<f64>) {
        self.seek_end_core(position);
        self.announce();
    }

    /// Skip forward by `seconds`, or by the configured skip step.
    pub fn skip_forward(&mut self, seconds: Option<f64>) {
        let step = seconds.unwrap_or(self.config.skip_step);
        self.skip_core(step);
        self.announce();
    }

    /// Skip backward by `seconds`, or by the configured skip step.
    pub fn skip_backward(&mut self, seconds: Option<f64>) {
        let step = seconds.unwrap_or(self.config.skip_step);
        self.skip_core(-step);
        self.announce();
    }

    /// Update the wanted quality, either `"auto"` or one of the widget's tier
    /// names (`"small"`, `"medium"`, `"hd720"`...).
    ///
    /// Ignored while a quality switch is in progress.
    pub fn set_quality_preference(&mut self, quality: &str) {
        self.set_quality_preference_core(quality);
        self.announce();
    }

    pub fn toggle_mute(&mut self) {
        self.toggle_mute_core();
        self.announce();
    }

    /// Set the volume, from `0` to `100`.
    pub fn set_volume(&mut self, volume: f64) {
        self.set_volume_core(volume);
        self.announce();
    }

    /// Recover from the current error, if one.
    pub fn retry(&mut self) {
        self.retry_core();
        self.announce();
    }

    /// Destroy the player instance and cancel everything pending. The
    /// `Dispatcher` can still be used afterward by selecting a video.
    pub fn dispose(&mut self) {
        self.dispose_core();
        self.announce();
    }

    /// Produce the state the UI should currently render.
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.build_snapshot()
    }

    pub fn set_log_level(&mut self, level: LoggerLevel) {
        Logger::set_logger_level(level);
    }

    pub fn set_preload_duration(&mut self, duration_ms: f64) {
        self.config.preload_duration = duration_ms;
    }

    pub fn set_preload_buffer_threshold(&mut self, seconds: f64) {
        self.config.preload_buffer_threshold = seconds;
    }

    pub fn set_preload_poll_interval(&mut self, interval_ms: f64) {
        self.config.preload_poll_interval = interval_ms;
    }

    pub fn set_intro_duration(&mut self, duration_ms: f64) {
        self.config.intro_duration = duration_ms;
    }

    pub fn set_max_splash_duration(&mut self, duration_ms: f64) {
        self.config.max_splash_duration = duration_ms;
    }

    pub fn set_quality_switch_timeout(&mut self, timeout_ms: f64) {
        self.config.quality_switch_timeout = timeout_ms;
    }

    pub fn set_quality_max_attempts(&mut self, attempts: u32) {
        self.config.quality_max_attempts = attempts;
        self.quality.set_max_attempts(attempts);
    }

    pub fn set_api_stall_timeout(&mut self, timeout_ms: f64) {
        self.config.api_stall_timeout = timeout_ms;
    }

    pub fn set_api_ready_timeout(&mut self, timeout_ms: f64) {
        self.config.api_ready_timeout = timeout_ms;
    }

    pub fn set_reconciliation_interval(&mut self, interval_ms: f64) {
        self.config.reconciliation_interval = interval_ms;
    }

    pub fn set_stall_timeout(&mut self, timeout_ms: f64) {
        self.config.stall_timeout = timeout_ms;
    }

    pub fn set_skip_step(&mut self, seconds: f64) {
        self.config.skip_step = seconds;
    }
}

impl Dispatcher {
    pub(crate) fn with_host(host: Box<dyn PlayerHost>, initial_quality: Option<&str>) -> Self {
        let config = ControllerConfiguration::default();
        let preference = match initial_quality {
            None => QualityPreference::Auto,
            Some(name) => QualityPreference::from_name(name).unwrap_or_else(|| {
                Logger::warn(&format!("Quality: Unknown stored quality \"{name}\", using auto"));
                QualityPreference::Auto
            }),
        };
        Dispatcher {
            host,
            quality: QualityNegotiator::new(preference, config.quality_max_attempts),
            config,
            session: None,
            last_token: SessionToken::default(),
            api_loader: ApiLoader::new(),
            player: ExternalPlayer::new(),
            pending_cue: None,
            preload_gate: PreloadGate::new(),
            intro: IntroSequence::new(),
            scrub: ScrubState::new(),
            progress: ProgressReporter::new(),
            timers: TimerRegistry::new(),
            error: None,
            current_time: 0.,
            duration: 0.,
            audio: AudioState {
                muted: false,
                volume: 100.,
            },
            stall_position: None,
        }
    }

    fn announce(&mut self) {
        self.host.announce_state_change();
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(None)
    }
}
