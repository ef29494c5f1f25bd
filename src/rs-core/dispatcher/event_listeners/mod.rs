use crate::{
    bindings::{RequestId, TimerId, TimerReason},
    dispatcher::{Dispatcher, PlayerEvent},
    player::WidgetState,
    wasm_bindgen, Logger,
};

/// Methods triggered on JavaScript events by the JavaScript code.
#[wasm_bindgen]
impl Dispatcher {
    /// The JS code should call this method once the embed widget's script,
    /// loaded through `jsLoadEmbedApi`, announced that it is ready.
    pub fn on_api_loaded(&mut self) {
        self.dispatch(PlayerEvent::ApiLoaded);
    }

    /// The JS code should call this method if the embed widget's script
    /// could not be loaded.
    pub fn on_api_load_failed(&mut self) {
        self.dispatch(PlayerEvent::ApiLoadFailed);
    }

    /// The JS code should call this method when the widget instance created
    /// through `jsCreatePlayer` fires its ready event.
    pub fn on_player_ready(&mut self) {
        self.dispatch(PlayerEvent::PlayerReady);
    }

    /// The JS code should call this method each time the widget fires a state
    /// change event.
    ///
    /// # Arguments
    ///
    /// * `code` - The numeric state given by the widget (`-1` unstarted, `0`
    ///   ended, `1` playing, `2` paused, `3` buffering, `5` cued).
    pub fn on_player_state_change(&mut self, code: i32) {
        match WidgetState::from_code(code) {
            Some(state) => self.dispatch(PlayerEvent::StateChange(state)),
            None => Logger::warn(&format!("Player: Unknown state code {code}, ignoring")),
        }
    }

    /// The JS code should call this method each time the widget fires an
    /// error event.
    ///
    /// # Arguments
    ///
    /// * `code` - The numeric error code given by the widget.
    pub fn on_player_error(&mut self, code: i32) {
        self.dispatch(PlayerEvent::PlayerError(code));
    }

    /// The JS code should call this method each time a timer started with
    /// `jsTimer` ended.
    ///
    /// # Arguments
    ///
    /// * `id` - The identifier returned by `jsTimer` when the timer was
    ///   started.
    ///
    /// * `reason` - The `TimerReason` given to `jsTimer`.
    pub fn on_timer_ended(&mut self, id: TimerId, reason: TimerReason) {
        self.dispatch(PlayerEvent::TimerEnded { id, reason });
    }

    /// The JS code should call this method when a report request started with
    /// `jsSendReport` succeeded.
    ///
    /// # Arguments
    ///
    /// * `request_id` - The identifier returned by `jsSendReport`.
    ///
    /// * `payload` - The response body, if one. It is forwarded to the next
    ///   reporting step.
    pub fn on_report_finished(&mut self, request_id: RequestId, payload: Option<String>) {
        self.dispatch(PlayerEvent::ReportFinished {
            request_id,
            payload,
        });
    }

    /// The JS code should call this method when a report request started with
    /// `jsSendReport` failed.
    pub fn on_report_failed(&mut self, request_id: RequestId) {
        self.dispatch(PlayerEvent::ReportFailed { request_id });
    }
}
