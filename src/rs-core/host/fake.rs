use std::{cell::RefCell, rc::Rc};

use super::{PlayerHost, WidgetCallError};
use crate::bindings::{ReportStep, RequestId, TimerId, TimerReason};

/// Every side effect a `FakeHost` has been asked to perform.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    LoadEmbedApi,
    CreatePlayer(String),
    DestroyPlayer,
    Play,
    Pause,
    SeekTo(f64),
    Mute,
    UnMute,
    SetVolume(f64),
    SetQuality(String),
    SetQualityRange(String, String),
    Cue(String),
    Report(ReportStep, String, String),
    StorePreference(String),
}

/// State of the simulated environment, shared between a test and the
/// `Dispatcher` it drives.
pub(crate) struct FakeState {
    pub now: f64,
    next_timer_id: f64,
    /// Pending timers as `(id, deadline, reason)`.
    pub timers: Vec<(TimerId, f64, TimerReason)>,
    next_request_id: RequestId,
    pub calls: Vec<Call>,

    pub api_available: bool,
    pub player_exists: bool,
    /// When `false` the widget behaves as if every method threw.
    pub responsive: bool,
    pub state: Option<i32>,
    pub duration: f64,
    pub current_time: f64,
    pub loaded_fraction: f64,
    pub muted: bool,
    pub volume: f64,
    pub quality: String,
    pub available_qualities: Vec<String>,
    /// When `false`, `setPlaybackQuality` calls are silently ignored.
    pub applies_quality: bool,
    pub announcements: u32,
}

#[derive(Clone)]
pub(crate) struct FakeHost {
    state: Rc<RefCell<FakeState>>,
}

impl FakeHost {
    pub(crate) fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(FakeState {
                now: 0.,
                next_timer_id: 1.,
                timers: vec![],
                next_request_id: 1,
                calls: vec![],
                api_available: false,
                player_exists: false,
                responsive: true,
                state: None,
                duration: 0.,
                current_time: 0.,
                loaded_fraction: 0.,
                muted: false,
                volume: 100.,
                quality: "unknown".to_owned(),
                available_qualities: vec![],
                applies_quality: true,
                announcements: 0,
            })),
        }
    }

    pub(crate) fn borrow(&self) -> std::cell::Ref<'_, FakeState> {
        self.state.borrow()
    }

    pub(crate) fn borrow_mut(&self) -> std::cell::RefMut<'_, FakeState> {
        self.state.borrow_mut()
    }

    /// Removes and returns the earliest timer due at or before `deadline`.
    pub(crate) fn pop_due_timer(&self, deadline: f64) -> Option<(TimerId, f64, TimerReason)> {
        let mut state = self.state.borrow_mut();
        let idx = state
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.1 <= deadline)
            .min_by(|a, b| a.1 .1.total_cmp(&b.1 .1).then(a.1 .0.total_cmp(&b.1 .0)))
            .map(|(idx, _)| idx)?;
        Some(state.timers.remove(idx))
    }

    pub(crate) fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut self.state.borrow_mut().calls)
    }

    fn command(&self, call: Call) -> Result<(), WidgetCallError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(call);
        if !state.player_exists {
            Err(WidgetCallError::NoPlayer)
        } else if !state.responsive {
            Err(WidgetCallError::Threw {
                message: "unresponsive".to_owned(),
            })
        } else {
            Ok(())
        }
    }

    fn query<T>(&self, func: impl FnOnce(&FakeState) -> T) -> Option<T> {
        let state = self.state.borrow();
        if state.player_exists && state.responsive {
            Some(func(&state))
        } else {
            None
        }
    }
}

impl PlayerHost for FakeHost {
    fn now(&self) -> f64 {
        self.state.borrow().now
    }

    fn start_timer(&mut self, duration: f64, reason: TimerReason) -> TimerId {
        let mut state = self.state.borrow_mut();
        let id = state.next_timer_id;
        state.next_timer_id += 1.;
        let deadline = state.now + duration;
        state.timers.push((id, deadline, reason));
        id
    }

    fn clear_timer(&mut self, id: TimerId) {
        self.state.borrow_mut().timers.retain(|t| t.0 != id);
    }

    fn load_embed_api(&mut self) {
        self.state.borrow_mut().calls.push(Call::LoadEmbedApi);
    }

    fn is_embed_api_available(&self) -> bool {
        self.state.borrow().api_available
    }

    fn create_player(&mut self, video_id: &str) -> Result<(), WidgetCallError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::CreatePlayer(video_id.to_owned()));
        state.player_exists = true;
        Ok(())
    }

    fn destroy_player(&mut self) -> Result<(), WidgetCallError> {
        let res = self.command(Call::DestroyPlayer);
        let mut state = self.state.borrow_mut();
        state.player_exists = false;
        state.state = None;
        res
    }

    fn play_video(&mut self) -> Result<(), WidgetCallError> {
        self.command(Call::Play)?;
        self.state.borrow_mut().state = Some(1);
        Ok(())
    }

    fn pause_video(&mut self) -> Result<(), WidgetCallError> {
        self.command(Call::Pause)?;
        self.state.borrow_mut().state = Some(2);
        Ok(())
    }

    fn seek_to(&mut self, seconds: f64, _allow_seek_ahead: bool) -> Result<(), WidgetCallError> {
        self.command(Call::SeekTo(seconds))?;
        self.state.borrow_mut().current_time = seconds;
        Ok(())
    }

    fn mute(&mut self) -> Result<(), WidgetCallError> {
        self.command(Call::Mute)?;
        self.state.borrow_mut().muted = true;
        Ok(())
    }

    fn un_mute(&mut self) -> Result<(), WidgetCallError> {
        self.command(Call::UnMute)?;
        self.state.borrow_mut().muted = false;
        Ok(())
    }

    fn is_muted(&self) -> Option<bool> {
        self.query(|s| s.muted)
    }

    fn volume(&self) -> Option<f64> {
        self.query(|s| s.volume)
    }

    fn set_volume(&mut self, volume: f64) -> Result<(), WidgetCallError> {
        self.command(Call::SetVolume(volume))?;
        self.state.borrow_mut().volume = volume;
        Ok(())
    }

    fn duration(&self) -> Option<f64> {
        self.query(|s| s.duration)
    }

    fn current_time(&self) -> Option<f64> {
        self.query(|s| s.current_time)
    }

    fn player_state(&self) -> Option<i32> {
        self.query(|s| s.state).flatten()
    }

    fn playback_quality(&self) -> Option<String> {
        self.query(|s| s.quality.clone())
    }

    fn set_playback_quality(&mut self, quality: &str) -> Result<(), WidgetCallError> {
        self.command(Call::SetQuality(quality.to_owned()))?;
        let mut state = self.state.borrow_mut();
        if state.applies_quality {
            state.quality = quality.to_owned();
        }
        Ok(())
    }

    fn set_playback_quality_range(
        &mut self,
        min: &str,
        max: &str,
    ) -> Result<(), WidgetCallError> {
        self.command(Call::SetQualityRange(min.to_owned(), max.to_owned()))
    }

    fn available_quality_levels(&self) -> Vec<String> {
        self.query(|s| s.available_qualities.clone())
            .unwrap_or_default()
    }

    fn video_loaded_fraction(&self) -> Option<f64> {
        self.query(|s| s.loaded_fraction)
    }

    fn cue_video_by_id(&mut self, video_id: &str) -> Result<(), WidgetCallError> {
        self.command(Call::Cue(video_id.to_owned()))?;
        let mut state = self.state.borrow_mut();
        state.state = Some(5);
        state.current_time = 0.;
        Ok(())
    }

    fn send_report(&mut self, step: ReportStep, content_id: &str, body: &str) -> RequestId {
        let mut state = self.state.borrow_mut();
        state
            .calls
            .push(Call::Report(step, content_id.to_owned(), body.to_owned()));
        let id = state.next_request_id;
        state.next_request_id += 1;
        id
    }

    fn store_quality_preference(&mut self, quality: &str) {
        self.state
            .borrow_mut()
            .calls
            .push(Call::StorePreference(quality.to_owned()));
    }

    fn announce_state_change(&mut self) {
        self.state.borrow_mut().announcements += 1;
    }
}
