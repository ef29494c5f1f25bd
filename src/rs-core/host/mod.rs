use crate::bindings::{ReportStep, RequestId, TimerId, TimerReason};

#[cfg(test)]
pub(crate) mod fake;

/// Everything the `Dispatcher` needs from its environment: a clock, timers,
/// the embed widget and its API loader, and the progress-reporting backend.
///
/// On the web this is implemented by `JsHost`, which forwards to the
/// JavaScript functions listed in `bindings`. Keeping it behind a trait lets
/// the whole controller run against a deterministic double.
///
/// Widget commands return a `WidgetCallError` when the underlying method
/// threw; getters return `None` in the same situation.
pub(crate) trait PlayerHost {
    /// Monotonic timestamp, in milliseconds.
    fn now(&self) -> f64;
    fn start_timer(&mut self, duration: f64, reason: TimerReason) -> TimerId;
    fn clear_timer(&mut self, id: TimerId);

    fn load_embed_api(&mut self);
    fn is_embed_api_available(&self) -> bool;

    fn create_player(&mut self, video_id: &str) -> Result<(), WidgetCallError>;
    fn destroy_player(&mut self) -> Result<(), WidgetCallError>;
    fn play_video(&mut self) -> Result<(), WidgetCallError>;
    fn pause_video(&mut self) -> Result<(), WidgetCallError>;
    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool) -> Result<(), WidgetCallError>;
    fn mute(&mut self) -> Result<(), WidgetCallError>;
    fn un_mute(&mut self) -> Result<(), WidgetCallError>;
    fn is_muted(&self) -> Option<bool>;
    fn volume(&self) -> Option<f64>;
    fn set_volume(&mut self, volume: f64) -> Result<(), WidgetCallError>;
    fn duration(&self) -> Option<f64>;
    fn current_time(&self) -> Option<f64>;
    fn player_state(&self) -> Option<i32>;
    fn playback_quality(&self) -> Option<String>;
    fn set_playback_quality(&mut self, quality: &str) -> Result<(), WidgetCallError>;
    fn set_playback_quality_range(&mut self, min: &str, max: &str)
        -> Result<(), WidgetCallError>;
    fn available_quality_levels(&self) -> Vec<String>;
    fn video_loaded_fraction(&self) -> Option<f64>;
    fn cue_video_by_id(&mut self, video_id: &str) -> Result<(), WidgetCallError>;

    fn send_report(&mut self, step: ReportStep, content_id: &str, body: &str) -> RequestId;
    fn store_quality_preference(&mut self, quality: &str);
    fn announce_state_change(&mut self);
}

use thiserror::Error;

/// A method of the embed widget could not be called.
#[derive(Error, Debug)]
pub(crate) enum WidgetCallError {
    #[error("No player instance exists")]
    NoPlayer,
    #[error("The widget threw: {message}")]
    Threw { message: String },
}
