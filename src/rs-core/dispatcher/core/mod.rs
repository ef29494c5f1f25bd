use super::{Dispatcher, PlaybackError, PlayerEvent};
use crate::{
    bindings::{TimerId, TimerReason},
    intro::IntroSequence,
    player::{EnsureOutcome, ReadinessCheck, WidgetErrorKind, WidgetState},
    preload_gate::{GateObservation, GateStatus},
    progress::{OutgoingReport, ProgressReport},
    quality::{QualityPreference, RetryStep},
    seek::{can_seek, clamp_position, SeekGuard},
    session::{LifecyclePhase, PlaybackSession, SessionToken, VideoId},
    timers::TimerScope,
    Logger,
};

/// Positions closer than this, in seconds, are considered identical when
/// checking that buffering progresses.
const STALL_PROGRESS_EPSILON: f64 = 0.1;

impl Dispatcher {
    /// Single entry point for every external callback.
    ///
    /// The JavaScript-side is notified once the event has been handled so it
    /// can read a new `PlayerSnapshot`.
    pub(super) fn dispatch(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::ApiLoaded => self.on_api_loaded_core(),
            PlayerEvent::ApiLoadFailed => self.on_api_load_failed_core(),
            PlayerEvent::PlayerReady => self.on_player_ready_core(),
            PlayerEvent::StateChange(state) => self.on_widget_state_core(state),
            PlayerEvent::PlayerError(code) => self.on_player_error_core(code),
            PlayerEvent::TimerEnded { id, reason } => self.on_timer_ended_core(id, reason),
            PlayerEvent::ReportFinished {
                request_id,
                payload,
            } => {
                if let Some(next) = self.progress.on_finished(request_id, payload) {
                    self.send_report(next);
                }
            }
            PlayerEvent::ReportFailed { request_id } => {
                if self.progress.on_failed(request_id) {
                    Logger::warn("Report: Completion will be reported again on the next end");
                }
            }
        }
        self.host.announce_state_change();
    }

    pub(super) fn phase(&self) -> LifecyclePhase {
        match (&self.error, &self.session) {
            (Some(err), _) if err.is_terminal() => LifecyclePhase::Error,
            (_, Some(session)) => session.phase(),
            (_, None) => LifecyclePhase::Idle,
        }
    }

    fn set_phase(&mut self, phase: LifecyclePhase) {
        if let Some(session) = self.session.as_mut() {
            if session.phase() != phase {
                Logger::lazy_debug(&|| format!("Core: Phase {:?} -> {:?}", session.phase(), phase));
                session.set_phase(phase);
            }
        }
    }

    fn current_token(&self) -> Option<SessionToken> {
        self.session.as_ref().map(|s| s.token())
    }

    pub(super) fn has_terminal_error(&self) -> bool {
        self.error.as_ref().map_or(false, |e| e.is_terminal())
    }

    // ---- Timers ----

    fn start_timer(&mut self, duration: f64, reason: TimerReason, scope: TimerScope) {
        let id = self.host.start_timer(duration, reason);
        self.timers.register(id, reason, scope);
    }

    /// Start a timer which is only relevant to the current session. Does
    /// nothing if there's no session.
    fn start_session_timer(&mut self, duration: f64, reason: TimerReason) {
        if let Some(token) = self.current_token() {
            self.start_timer(duration, reason, TimerScope::Session(token));
        }
    }

    fn cancel_timers(&mut self, reason: TimerReason) {
        for id in self.timers.drain_reason(reason) {
            self.host.clear_timer(id);
        }
    }

    pub(super) fn cancel_all_timers(&mut self) {
        for id in self.timers.drain_all() {
            self.host.clear_timer(id);
        }
    }

    fn on_timer_ended_core(&mut self, id: TimerId, reason: TimerReason) {
        let (registered_reason, scope) = match self.timers.take(id) {
            Some(timer) => timer,
            None => {
                Logger::lazy_debug(&|| format!("Core: Ignoring unknown timer {id} ({reason:?})"));
                return;
            }
        };
        if registered_reason != reason {
            Logger::warn("Core: Timer ended with an unexpected reason");
        }
        if let TimerScope::Session(token) = scope {
            if Some(token) != self.current_token() {
                Logger::debug("Core: Ignoring timer of a previous session");
                return;
            }
        }
        match registered_reason {
            TimerReason::ApiLoadStall => self.on_api_load_stall(),
            TimerReason::ApiReadyPoll => self.on_api_ready_poll(),
            TimerReason::Reconciliation => self.on_reconciliation_tick(),
            TimerReason::PreloadPoll => {
                if let TimerScope::Session(token) = scope {
                    self.on_preload_poll(token);
                }
            }
            TimerReason::IntroSoft => self.on_intro_soft_timer(),
            TimerReason::IntroHard => self.on_intro_hard_timer(),
            TimerReason::QualityWatchdog => self.on_quality_watchdog(),
            TimerReason::QualityRetry => self.on_quality_retry_timer(),
            TimerReason::StallCheck => self.on_stall_check(),
        }
    }

    // ---- Sessions ----

    pub(super) fn select_video_core(&mut self, input: &str, content_id: Option<String>) {
        let video_id = match VideoId::resolve(input) {
            Ok(id) => id,
            Err(err) => {
                Logger::warn(&format!("Core: Cannot select video: {err}"));
                return;
            }
        };
        if let Some(session) = &self.session {
            if session.video_id() == &video_id {
                Logger::debug("Core: Video already selected, ignoring");
                return;
            }
        }
        self.start_session(video_id, content_id);
    }

    /// Replace the current session, if one, by a new one for `video_id`.
    ///
    /// Everything started for the previous session is cancelled and any of
    /// its callbacks still to come will be ignored.
    fn start_session(&mut self, video_id: VideoId, content_id: Option<String>) {
        let token = self.last_token.next();
        self.last_token = token;
        Logger::info(&format!("Core: Starting session for video {video_id}"));

        for id in self.timers.drain_session_scoped() {
            self.host.clear_timer(id);
        }
        self.abandon_intro();
        self.reset_session_state();
        self.session = Some(PlaybackSession::new(video_id.clone(), content_id, token));

        self.preload_gate.start(token);
        self.start_session_timer(self.config.preload_poll_interval, TimerReason::PreloadPoll);

        if !self.player.is_created() {
            self.ensure_player();
        } else if self.player.is_ready() {
            self.player.cue(&mut *self.host, &video_id);
        } else {
            Logger::debug("Core: Player not ready yet, deferring cue");
            self.pending_cue = Some(token);
        }
    }

    fn reset_session_state(&mut self) {
        self.pending_cue = None;
        self.intro = IntroSequence::new();
        self.quality.reset_for_new_video();
        self.scrub.cancel();
        self.progress.reset();
        self.error = None;
        self.current_time = 0.;
        self.duration = 0.;
        self.stall_position = None;
    }

    /// Stop an intro still running without letting its muted audio leak
    /// into what comes next.
    fn abandon_intro(&mut self) {
        if let Some(restore) = self.intro.abandon() {
            Logger::info("Intro: Interrupted, restoring audio");
            if self.player.is_created() {
                self.player.apply_audio(&mut *self.host, restore);
            }
            self.audio = restore;
        }
    }

    pub(super) fn dispose_core(&mut self) {
        Logger::info("Core: Disposing");
        self.cancel_all_timers();
        self.abandon_intro();
        self.player.destroy(&mut *self.host);
        self.reset_session_state();
        self.session = None;
    }

    pub(super) fn retry_core(&mut self) {
        match self.error.take() {
            Some(PlaybackError::LoadFailure) => {
                Logger::info("Core: Retrying to load the player");
                self.api_loader.reset();
                self.set_phase(LifecyclePhase::Loading);
                self.ensure_player();
            }
            Some(PlaybackError::Widget(_)) => {
                Logger::info("Core: Recreating the player");
                self.cancel_timers(TimerReason::Reconciliation);
                self.player.destroy(&mut *self.host);
                if let Some(session) = self.session.take() {
                    let content_id = session.content_id().map(|c| c.to_owned());
                    self.start_session(session.video_id().clone(), content_id);
                }
            }
            Some(PlaybackError::Stall) => {
                Logger::info("Core: Retrying stalled playback");
                self.stall_position = None;
                let position = self.widget_current_time();
                self.player.seek_to(&mut *self.host, position);
                self.player.play(&mut *self.host);
            }
            None => {
                if self.session.is_some() && !self.player.is_created() {
                    self.ensure_player();
                }
            }
        }
    }

    fn fail(&mut self, error: PlaybackError) {
        Logger::error(&format!("Core: {error}"));
        self.cancel_timers(TimerReason::StallCheck);
        self.stall_position = None;
        self.scrub.cancel();
        if error.is_terminal() {
            self.cancel_timers(TimerReason::QualityWatchdog);
            self.cancel_timers(TimerReason::QualityRetry);
            self.quality.cancel_retry();
            self.quality.end_switch();
        }
        self.error = Some(error);
    }

    // ---- Embed API and player creation ----

    /// Make sure a player instance exists or is being created.
    fn ensure_player(&mut self) {
        if self.player.is_created() {
            return;
        }
        let now = self.host.now();
        match self
            .api_loader
            .ensure(now, self.config.api_stall_timeout)
        {
            EnsureOutcome::Loaded => self.create_player(),
            EnsureOutcome::AlreadyPending => {
                Logger::debug("API: Load already pending");
                // its timers may have been cancelled by a `dispose`
                self.arm_api_load_timers();
            }
            EnsureOutcome::StartLoad => {
                Logger::info("API: Loading embed API");
                self.host.load_embed_api();
                self.cancel_timers(TimerReason::ApiLoadStall);
                self.arm_api_load_timers();
            }
        }
    }

    /// Start the stall and readiness timers watching a pending API load, for
    /// those not already started.
    fn arm_api_load_timers(&mut self) {
        if !self.timers.is_pending(TimerReason::ApiLoadStall) {
            self.start_timer(
                self.config.api_stall_timeout,
                TimerReason::ApiLoadStall,
                TimerScope::Mount,
            );
        }
        if !self.timers.is_pending(TimerReason::ApiReadyPoll) {
            self.start_timer(
                self.config.api_ready_poll_interval,
                TimerReason::ApiReadyPoll,
                TimerScope::Mount,
            );
        }
    }

    fn create_player(&mut self) {
        if self.player.is_created() {
            return;
        }
        let video_id = match &self.session {
            Some(session) => session.video_id().clone(),
            None => return,
        };
        if self.player.create(&mut *self.host, &video_id) {
            self.pending_cue = None;
            if !self.timers.is_pending(TimerReason::Reconciliation) {
                self.start_timer(
                    self.config.reconciliation_interval,
                    TimerReason::Reconciliation,
                    TimerScope::Mount,
                );
            }
        } else {
            self.fail(PlaybackError::LoadFailure);
        }
    }

    fn on_api_loaded_core(&mut self) {
        if self.api_loader.on_loaded() {
            Logger::info("API: Embed API loaded");
        }
        self.cancel_timers(TimerReason::ApiLoadStall);
        self.cancel_timers(TimerReason::ApiReadyPoll);
        self.create_player();
    }

    fn on_api_load_failed_core(&mut self) {
        if self.api_loader.on_failed() {
            self.cancel_timers(TimerReason::ApiLoadStall);
            self.cancel_timers(TimerReason::ApiReadyPoll);
            self.fail(PlaybackError::LoadFailure);
        }
    }

    fn on_api_ready_poll(&mut self) {
        let now = self.host.now();
        let available = self.host.is_embed_api_available();
        match self
            .api_loader
            .check_readiness(now, available, self.config.api_ready_timeout)
        {
            ReadinessCheck::BecameReady => {
                Logger::info("API: Embed API available");
                self.cancel_timers(TimerReason::ApiLoadStall);
                self.create_player();
            }
            ReadinessCheck::Waiting => {
                self.start_timer(
                    self.config.api_ready_poll_interval,
                    TimerReason::ApiReadyPoll,
                    TimerScope::Mount,
                );
            }
            ReadinessCheck::TimedOut => {
                self.cancel_timers(TimerReason::ApiLoadStall);
                self.fail(PlaybackError::LoadFailure);
            }
            ReadinessCheck::NotPending => {}
        }
    }

    fn on_api_load_stall(&mut self) {
        if self.api_loader.is_pending() {
            Logger::warn("API: Embed API load seems stuck, restarting it");
            self.ensure_player();
        }
    }

    // ---- Widget events ----

    fn on_player_ready_core(&mut self) {
        if !self.player.is_created() || self.player.is_ready() {
            return;
        }
        Logger::info("Player: Ready");
        self.player.set_ready();
        self.audio = self.player.audio_state(&*self.host, self.audio);

        if let Some(token) = self.pending_cue.take() {
            if Some(token) == self.current_token() {
                if let Some(video_id) = self.session.as_ref().map(|s| s.video_id().clone()) {
                    self.player.cue(&mut *self.host, &video_id);
                }
            } else {
                Logger::debug("Core: Dropping cue of a previous session");
            }
        }
        self.refresh_media_info();
        if self.phase() == LifecyclePhase::Loading && self.current_video_loaded() {
            self.set_phase(LifecyclePhase::Ready);
        }
    }

    fn on_widget_state_core(&mut self, state: WidgetState) {
        if !self.player.is_created() {
            return;
        }
        if !self.player.is_ready() {
            // A state report implies readiness even if its callback was missed
            self.on_player_ready_core();
        }
        self.player.set_reported_state(state);
        if self.session.is_none() || self.pending_cue.is_some() || self.has_terminal_error() {
            return;
        }

        if self.intro.is_active() {
            if state == WidgetState::Playing {
                Logger::debug("Intro: Widget started playing during the intro, pausing it");
                self.player.pause(&mut *self.host);
                self.player.seek_to(&mut *self.host, 0.);
            }
            return;
        }

        match state {
            WidgetState::Playing => {
                if !self.intro.is_complete() {
                    Logger::warn("Core: Playback started before the intro, pausing");
                    self.player.pause(&mut *self.host);
                    self.player.seek_to(&mut *self.host, 0.);
                    return;
                }
                if self.quality.is_switching() {
                    Logger::debug("Quality: Playback resumed during a switch, pausing");
                    self.player.pause(&mut *self.host);
                    return;
                }
                self.set_phase(LifecyclePhase::Playing);
                self.clear_stall();
                if self.quality.is_pending_apply() {
                    self.apply_quality_preference();
                }
            }
            WidgetState::Paused => {
                if self.phase() != LifecyclePhase::Ended {
                    self.set_phase(LifecyclePhase::Paused);
                }
                self.clear_stall();
            }
            WidgetState::Buffering => {
                self.set_phase(LifecyclePhase::Buffering);
                self.arm_stall_check();
            }
            WidgetState::Ended => self.on_ended(),
            WidgetState::Cued | WidgetState::Unstarted => {
                if self.phase() == LifecyclePhase::Loading {
                    self.set_phase(LifecyclePhase::Ready);
                }
            }
        }
    }

    fn on_player_error_core(&mut self, code: i32) {
        if self.session.is_none() {
            return;
        }
        let kind = WidgetErrorKind::from_code(code);
        self.fail(PlaybackError::Widget(kind));
    }

    fn on_ended(&mut self) {
        if self.phase() == LifecyclePhase::Ended {
            return;
        }
        self.set_phase(LifecyclePhase::Ended);
        self.clear_stall();
        self.scrub.cancel();
        self.cancel_timers(TimerReason::QualityWatchdog);
        self.cancel_timers(TimerReason::QualityRetry);
        self.quality.cancel_retry();
        self.quality.end_switch();

        self.refresh_duration();
        if self.duration > 0. {
            self.current_time = self.duration;
        }
        let content_id = self
            .session
            .as_ref()
            .and_then(|s| s.content_id())
            .map(|c| c.to_owned());
        let report = ProgressReport {
            watched_duration: self.current_time,
            total_duration: self.duration,
        };
        if let Some(outgoing) = self.progress.on_ended(content_id.as_deref(), report) {
            self.send_report(outgoing);
        }
    }

    fn send_report(&mut self, report: OutgoingReport) {
        Logger::lazy_info(&|| format!("Report: Sending {:?}", report.step));
        let request_id = self
            .host
            .send_report(report.step, &report.content_id, &report.body);
        self.progress.track(request_id, report);
    }

    // ---- Reconciliation ----

    fn on_reconciliation_tick(&mut self) {
        if !self.player.is_created() {
            return;
        }
        self.start_timer(
            self.config.reconciliation_interval,
            TimerReason::Reconciliation,
            TimerScope::Mount,
        );
        self.refresh_media_info();

        if let Some(state) = self.host.player_state().and_then(WidgetState::from_code) {
            if !self.player.is_ready()
                || self.player.reported_state() != Some(state)
                || !self.phase_agrees_with(state)
            {
                Logger::lazy_debug(&|| format!("Core: Reconciled widget state {state:?}"));
                self.on_widget_state_core(state);
            }
        }

        if self.player.is_ready() && !self.quality.is_switching() {
            let available = self.player.available_qualities(&*self.host);
            self.quality.update_available(available);
            if let Some(applied) = self.player.applied_quality(&*self.host) {
                self.quality.set_applied(Some(applied));
            }
        }

        if self.intro.is_active() && self.intro.min_elapsed() && self.is_player_playable() {
            self.finish_intro(false);
        }
    }

    /// `false` if the widget's `state` contradicts our current phase, for
    /// example after an event was missed.
    fn phase_agrees_with(&self, state: WidgetState) -> bool {
        if self.has_terminal_error() || self.pending_cue.is_some() {
            return true;
        }
        let phase = self.phase();
        match state {
            WidgetState::Playing => phase == LifecyclePhase::Playing,
            WidgetState::Paused => {
                !matches!(phase, LifecyclePhase::Playing | LifecyclePhase::Buffering)
            }
            WidgetState::Buffering => {
                phase == LifecyclePhase::Buffering || self.intro.is_active()
            }
            WidgetState::Ended => phase == LifecyclePhase::Ended,
            WidgetState::Cued | WidgetState::Unstarted => phase != LifecyclePhase::Loading,
        }
    }

    fn refresh_duration(&mut self) {
        if let Some(duration) = self.host.duration() {
            if duration.is_finite() && duration > 0. {
                self.duration = duration;
            }
        }
    }

    fn refresh_media_info(&mut self) {
        self.refresh_duration();
        let frozen = self.intro.is_active()
            || self.scrub.is_scrubbing()
            || self.phase() == LifecyclePhase::Ended;
        if !frozen {
            if let Some(position) = self.host.current_time() {
                if position.is_finite() {
                    self.current_time = position;
                }
            }
        }
    }

    fn widget_current_time(&self) -> f64 {
        self.host
            .current_time()
            .filter(|t| t.is_finite())
            .unwrap_or(self.current_time)
    }

    fn current_video_loaded(&self) -> bool {
        self.pending_cue.is_none()
            && self
                .session
                .as_ref()
                .map_or(false, |s| self.player.has_loaded(s.video_id()))
    }

    /// `true` if the widget is ready and answering, or already playing.
    fn is_player_playable(&self) -> bool {
        let responsive = self.host.player_state().is_some();
        (self.player.is_ready() && responsive)
            || self.player.reported_state() == Some(WidgetState::Playing)
    }

    // ---- Preload gate ----

    fn on_preload_poll(&mut self, token: SessionToken) {
        self.refresh_duration();
        let observation = GateObservation {
            player_ready: self.player.is_ready() && self.current_video_loaded(),
            duration: self.duration,
            buffered_seconds: self.player.buffered_seconds(&*self.host, self.duration),
        };
        let now = self.host.now();
        match self.preload_gate.evaluate(
            now,
            token,
            observation,
            self.config.preload_duration,
            self.config.preload_buffer_threshold,
        ) {
            GateStatus::Opened => Logger::info("Gate: Preloading done, playback allowed"),
            GateStatus::Gated => {
                self.start_session_timer(self.config.preload_poll_interval, TimerReason::PreloadPoll)
            }
            GateStatus::AlreadyOpen | GateStatus::Stale => {}
        }
    }

    // ---- Transport ----

    pub(super) fn toggle_play_pause_core(&mut self) {
        if self.session.is_none() || self.has_terminal_error() {
            return;
        }
        if self.quality.is_switching() {
            Logger::debug("Core: Quality switch in progress, ignoring play/pause");
            return;
        }
        if self.intro.is_active() {
            Logger::debug("Core: Intro playing, ignoring play/pause");
            return;
        }
        match self.phase() {
            LifecyclePhase::Playing | LifecyclePhase::Buffering => {
                self.player.pause(&mut *self.host);
                self.set_phase(LifecyclePhase::Paused);
                self.clear_stall();
            }
            _ => self.request_play(),
        }
    }

    fn request_play(&mut self) {
        if !self.preload_gate.is_satisfied() {
            Logger::debug("Gate: Still preloading, ignoring play request");
            return;
        }
        if !self.intro.is_complete() {
            self.start_intro(true);
            return;
        }
        if self.phase() == LifecyclePhase::Ended {
            self.player.seek_to(&mut *self.host, 0.);
            self.current_time = 0.;
        }
        self.player.play(&mut *self.host);
    }

    // ---- Intro ----

    fn start_intro(&mut self, start_playback_after: bool) {
        let restore = self.player.audio_state(&*self.host, self.audio);
        if !self.intro.start(restore, start_playback_after) {
            return;
        }
        Logger::info("Intro: Starting");
        self.player.pause(&mut *self.host);
        self.player.seek_to(&mut *self.host, 0.);
        self.player.mute(&mut *self.host);
        self.current_time = 0.;
        self.set_phase(LifecyclePhase::Intro);
        self.start_session_timer(self.config.intro_duration, TimerReason::IntroSoft);
        self.start_session_timer(self.config.max_splash_duration, TimerReason::IntroHard);
    }

    fn on_intro_soft_timer(&mut self) {
        if !self.intro.is_active() {
            return;
        }
        self.intro.mark_min_elapsed();
        if self.is_player_playable() {
            self.finish_intro(false);
        } else {
            Logger::info("Intro: Minimum duration elapsed, waiting for the player");
        }
    }

    fn on_intro_hard_timer(&mut self) {
        if !self.intro.is_active() {
            return;
        }
        if self.is_player_playable() {
            self.finish_intro(false);
        } else {
            Logger::warn("Intro: Player still not ready, force-finishing the intro");
            self.finish_intro(true);
        }
    }

    fn finish_intro(&mut self, hard_timeout: bool) {
        let outcome = match self.intro.finish(hard_timeout) {
            Some(outcome) => outcome,
            None => return,
        };
        Logger::info("Intro: Finished");
        self.cancel_timers(TimerReason::IntroSoft);
        self.cancel_timers(TimerReason::IntroHard);
        if let Some(restore) = outcome.restore {
            self.player.apply_audio(&mut *self.host, restore);
            self.audio = restore;
        }
        self.set_phase(LifecyclePhase::Ready);
        if outcome.resume_playback {
            self.player.play(&mut *self.host);
        }
    }

    // ---- Audio ----

    pub(super) fn toggle_mute_core(&mut self) {
        let muted = !self.audio.muted;
        self.audio.muted = muted;
        if let Some(restore) = self.intro.restore_mut() {
            restore.muted = muted;
            return;
        }
        if muted {
            self.player.mute(&mut *self.host);
        } else {
            self.player.un_mute(&mut *self.host);
        }
    }

    pub(super) fn set_volume_core(&mut self, volume: f64) {
        if !volume.is_finite() {
            return;
        }
        let volume = volume.clamp(0., 100.);
        self.audio.volume = volume;
        if let Some(restore) = self.intro.restore_mut() {
            restore.volume = volume;
            return;
        }
        self.player.set_volume(&mut *self.host, volume);
    }

    // ---- Seeking ----

    pub(super) fn can_seek_now(&self) -> bool {
        let guard = SeekGuard {
            can_seek: can_seek(self.phase(), self.intro.is_complete()),
            switching_quality: self.quality.is_switching(),
            video_matches: self.current_video_loaded(),
        };
        guard.allows_seek()
    }

    pub(super) fn seek_core(&mut self, position: f64) {
        if !self.can_seek_now() {
            Logger::debug("Seek: Not allowed now, ignoring");
            return;
        }
        if self.scrub.is_scrubbing() {
            self.scrub.update(position);
        } else {
            self.commit_seek(position);
        }
    }

    pub(super) fn seek_start_core(&mut self, position: f64) {
        if !self.can_seek_now() {
            Logger::debug("Seek: Not allowed now, ignoring scrub");
            return;
        }
        self.scrub.begin(position);
    }

    pub(super) fn seek_end_core(&mut self, position: Option<f64>) {
        let target = match self.scrub.end(position) {
            Some(target) => target,
            None => return,
        };
        if self.can_seek_now() {
            self.commit_seek(target);
        } else {
            Logger::debug("Seek: Not allowed anymore, dropping scrub");
        }
    }

    pub(super) fn skip_core(&mut self, delta: f64) {
        if !self.can_seek_now() || !delta.is_finite() {
            Logger::debug("Seek: Not allowed now, ignoring skip");
            return;
        }
        let base = self.widget_current_time();
        self.commit_seek(base + delta);
    }

    fn commit_seek(&mut self, position: f64) {
        if !position.is_finite() {
            return;
        }
        let position = clamp_position(position, self.duration);
        Logger::lazy_debug(&|| format!("Seek: Seeking to {position}"));
        self.player.seek_to(&mut *self.host, position);
        self.current_time = position;
    }

    // ---- Quality ----

    pub(super) fn set_quality_preference_core(&mut self, name: &str) {
        let preference = match QualityPreference::from_name(name) {
            Some(preference) => preference,
            None => {
                Logger::warn(&format!("Quality: Unknown quality \"{name}\", ignoring"));
                return;
            }
        };
        if self.quality.is_switching() {
            Logger::debug("Quality: Switch already in progress, ignoring");
            return;
        }
        self.quality.set_preference(preference);
        self.host.store_quality_preference(preference.as_str());
        self.apply_quality_preference();
    }

    /// Apply the quality preference to the widget.
    ///
    /// A specific tier is only applied while playing, it is otherwise kept
    /// pending until playback starts.
    fn apply_quality_preference(&mut self) {
        if self.quality.is_switching() {
            return;
        }
        match self.quality.preference() {
            QualityPreference::Auto => {
                self.quality.clear_pending_apply();
                self.cancel_timers(TimerReason::QualityRetry);
                self.quality.cancel_retry();
                if self.player.is_ready() {
                    Logger::info("Quality: Letting the widget choose the quality");
                    self.player.request_auto_quality(&mut *self.host);
                }
                self.quality.set_applied(None);
            }
            QualityPreference::Tier(_) => {
                if self.phase() != LifecyclePhase::Playing {
                    Logger::debug("Quality: Not playing, applying preference later");
                    return;
                }
                self.quality.clear_pending_apply();
                let available = self.player.available_qualities(&*self.host);
                self.quality.update_available(available);
                let target = match self.quality.resolve_target() {
                    Some(target) => target,
                    None => {
                        Logger::debug("Quality: No quality level available yet");
                        return;
                    }
                };
                if self.player.applied_quality(&*self.host) == Some(target) {
                    self.quality.set_applied(Some(target));
                    return;
                }
                Logger::info(&format!("Quality: Switching to {target}"));
                self.player.pause(&mut *self.host);
                self.set_phase(LifecyclePhase::Paused);
                self.quality.begin_switch(target, true);
                self.cancel_timers(TimerReason::QualityWatchdog);
                self.start_session_timer(
                    self.config.quality_switch_timeout,
                    TimerReason::QualityWatchdog,
                );

                self.player.request_quality(&mut *self.host, target);
                self.cancel_timers(TimerReason::QualityRetry);
                self.quality.begin_retry(target);
                self.start_session_timer(self.quality.first_retry_delay(), TimerReason::QualityRetry);
            }
        }
    }

    fn on_quality_retry_timer(&mut self) {
        let reported = self.player.applied_quality(&*self.host);
        match self.quality.check_retry(reported) {
            RetryStep::Confirmed(tier) => {
                Logger::info(&format!("Quality: {tier} applied"));
                if self.pending_cue.is_none() && !self.intro.is_active() {
                    // flushes what was buffered in the previous quality
                    let position = self.widget_current_time();
                    self.player.seek_to(&mut *self.host, position);
                }
                self.release_quality_lock();
            }
            RetryStep::Reapply { target, delay } => {
                Logger::lazy_debug(&|| format!("Quality: {target} not applied yet, requesting again"));
                self.player.request_quality(&mut *self.host, target);
                self.start_session_timer(delay, TimerReason::QualityRetry);
            }
            RetryStep::GaveUp => {
                Logger::warn("Quality: Widget never confirmed the wanted quality");
                self.release_quality_lock();
            }
            RetryStep::Idle => {}
        }
    }

    fn on_quality_watchdog(&mut self) {
        if self.quality.is_switching() {
            Logger::warn("Quality: Switch took too long, unlocking controls");
            self.release_quality_lock();
        }
    }

    fn release_quality_lock(&mut self) {
        self.cancel_timers(TimerReason::QualityWatchdog);
        if let Some(lock) = self.quality.end_switch() {
            if lock.resume_playback && self.phase() != LifecyclePhase::Ended {
                self.player.play(&mut *self.host);
            }
        }
    }

    // ---- Stall detection ----

    fn arm_stall_check(&mut self) {
        if self.preload_gate.is_gating() || self.timers.is_pending(TimerReason::StallCheck) {
            return;
        }
        self.stall_position = Some(self.widget_current_time());
        self.start_session_timer(self.config.stall_timeout, TimerReason::StallCheck);
    }

    fn on_stall_check(&mut self) {
        if self.phase() != LifecyclePhase::Buffering || self.preload_gate.is_gating() {
            self.stall_position = None;
            return;
        }
        let position = self.widget_current_time();
        match self.stall_position {
            Some(start) if position <= start + STALL_PROGRESS_EPSILON => {
                self.fail(PlaybackError::Stall);
            }
            _ => {
                self.stall_position = Some(position);
                self.start_session_timer(self.config.stall_timeout, TimerReason::StallCheck);
            }
        }
    }

    fn clear_stall(&mut self) {
        self.cancel_timers(TimerReason::StallCheck);
        self.stall_position = None;
        if self.error == Some(PlaybackError::Stall) {
            self.error = None;
        }
    }
}
