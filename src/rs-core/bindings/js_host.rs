use super::js_functions::*;
use crate::host::{PlayerHost, WidgetCallError};

/// `PlayerHost` implementation relying on the JavaScript functions imported
/// in `js_functions`.
pub(crate) struct JsHost;

fn convert(res: WidgetCallResult) -> Result<(), WidgetCallError> {
    res.result().map_err(|(code, desc)| match code {
        WidgetCallErrorCode::NoPlayer => WidgetCallError::NoPlayer,
        WidgetCallErrorCode::Threw => WidgetCallError::Threw {
            message: desc.unwrap_or_default(),
        },
    })
}

impl PlayerHost for JsHost {
    fn now(&self) -> f64 {
        jsNow()
    }

    fn start_timer(&mut self, duration: f64, reason: TimerReason) -> TimerId {
        jsTimer(duration, reason)
    }

    fn clear_timer(&mut self, id: TimerId) {
        jsClearTimer(id)
    }

    fn load_embed_api(&mut self) {
        jsLoadEmbedApi()
    }

    fn is_embed_api_available(&self) -> bool {
        jsIsEmbedApiAvailable()
    }

    fn create_player(&mut self, video_id: &str) -> Result<(), WidgetCallError> {
        convert(jsCreatePlayer(video_id))
    }

    fn destroy_player(&mut self) -> Result<(), WidgetCallError> {
        convert(jsDestroyPlayer())
    }

    fn play_video(&mut self) -> Result<(), WidgetCallError> {
        convert(jsPlayVideo())
    }

    fn pause_video(&mut self) -> Result<(), WidgetCallError> {
        convert(jsPauseVideo())
    }

    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool) -> Result<(), WidgetCallError> {
        convert(jsSeekTo(seconds, allow_seek_ahead))
    }

    fn mute(&mut self) -> Result<(), WidgetCallError> {
        convert(jsMute())
    }

    fn un_mute(&mut self) -> Result<(), WidgetCallError> {
        convert(jsUnMute())
    }

    fn is_muted(&self) -> Option<bool> {
        jsIsMuted()
    }

    fn volume(&self) -> Option<f64> {
        jsGetVolume()
    }

    fn set_volume(&mut self, volume: f64) -> Result<(), WidgetCallError> {
        convert(jsSetVolume(volume))
    }

    fn duration(&self) -> Option<f64> {
        jsGetDuration()
    }

    fn current_time(&self) -> Option<f64> {
        jsGetCurrentTime()
    }

    fn player_state(&self) -> Option<i32> {
        jsGetPlayerState()
    }

    fn playback_quality(&self) -> Option<String> {
        jsGetPlaybackQuality()
    }

    fn set_playback_quality(&mut self, quality: &str) -> Result<(), WidgetCallError> {
        convert(jsSetPlaybackQuality(quality))
    }

    fn set_playback_quality_range(
        &mut self,
        min: &str,
        max: &str,
    ) -> Result<(), WidgetCallError> {
        convert(jsSetPlaybackQualityRange(min, max))
    }

    fn available_quality_levels(&self) -> Vec<String> {
        jsGetAvailableQualityLevels()
    }

    fn video_loaded_fraction(&self) -> Option<f64> {
        jsGetVideoLoadedFraction()
    }

    fn cue_video_by_id(&mut self, video_id: &str) -> Result<(), WidgetCallError> {
        convert(jsCueVideoById(video_id))
    }

    fn send_report(&mut self, step: ReportStep, content_id: &str, body: &str) -> RequestId {
        jsSendReport(step, content_id, body)
    }

    fn store_quality_preference(&mut self, quality: &str) {
        jsStoreQualityPreference(quality)
    }

    fn announce_state_change(&mut self) {
        jsAnnounceStateChange()
    }
}
