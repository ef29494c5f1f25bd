use crate::wasm_bindgen;

/// # js_functions
///
/// This file lists all JavaScript functions that are callable from Rust as well as
/// struct and enumeration used by those functions.
///
/// Functions wrapping a method of the embed widget are expected to catch any
/// exception thrown by it: commands then return an error `WidgetCallResult`
/// and getters return `None` (or an empty `Vec`).

#[wasm_bindgen]
extern "C" {
    // Log the given text in the JavaScript console, with the log level given.
    pub fn jsLog(log_level: LogLevel, log: &str);

    // Returns a monotonic timestamp in milliseconds (e.g. `performance.now()`).
    pub fn jsNow() -> f64;

    // Starts a timer for the number of milliseconds indicated by the `duration` argument.
    //
    // Once this timer has elapsed, and unless `jsClearTimer` has been called since with
    // the `TimerId` returned by this function, the `on_timer_ended` method of the
    // `Dispatcher` will be called with both the corresponding `TimerId` and `reason`.
    pub fn jsTimer(duration: f64, reason: TimerReason) -> TimerId;

    // Clear a timer started with `jsTimer`.
    pub fn jsClearTimer(id: TimerId);

    // Inject the embed widget's script tag if not already done.
    //
    // The `on_api_loaded` or `on_api_load_failed` method of the `Dispatcher`
    // should then be called once the script reports its own readiness or
    // failed to load. Neither is guaranteed to be called, which is why
    // `jsIsEmbedApiAvailable` is polled as well.
    pub fn jsLoadEmbedApi();

    // Returns `true` if the embed widget's global constructor can be used.
    pub fn jsIsEmbedApiAvailable() -> bool;

    // Create the single player instance on the mount node linked to this
    // `Dispatcher`, with the given video cued.
    //
    // Its `onReady`, `onStateChange` and `onError` events should be forwarded
    // to the `on_player_ready`, `on_player_state_change` and `on_player_error`
    // methods of the `Dispatcher`.
    pub fn jsCreatePlayer(video_id: &str) -> WidgetCallResult;

    // Destroy the player instance created through `jsCreatePlayer`, if one.
    pub fn jsDestroyPlayer() -> WidgetCallResult;

    pub fn jsPlayVideo() -> WidgetCallResult;
    pub fn jsPauseVideo() -> WidgetCallResult;
    pub fn jsSeekTo(seconds: f64, allow_seek_ahead: bool) -> WidgetCallResult;
    pub fn jsMute() -> WidgetCallResult;
    pub fn jsUnMute() -> WidgetCallResult;
    pub fn jsIsMuted() -> Option<bool>;
    pub fn jsGetVolume() -> Option<f64>;
    pub fn jsSetVolume(volume: f64) -> WidgetCallResult;
    pub fn jsGetDuration() -> Option<f64>;
    pub fn jsGetCurrentTime() -> Option<f64>;
    pub fn jsGetPlayerState() -> Option<i32>;
    pub fn jsGetPlaybackQuality() -> Option<String>;
    pub fn jsSetPlaybackQuality(quality: &str) -> WidgetCallResult;
    pub fn jsSetPlaybackQualityRange(min: &str, max: &str) -> WidgetCallResult;
    pub fn jsGetAvailableQualityLevels() -> Vec<String>;
    pub fn jsGetVideoLoadedFraction() -> Option<f64>;
    pub fn jsCueVideoById(video_id: &str) -> WidgetCallResult;

    // POST the given JSON `body` to the progress-reporting backend, for the step
    // and content given.
    //
    // The `on_report_finished` or `on_report_failed` method of the `Dispatcher`
    // will then be called asynchronously with the returned `RequestId`.
    pub fn jsSendReport(step: ReportStep, content_id: &str, body: &str) -> RequestId;

    // Persist the user's quality preference so it survives video switches and
    // page reloads.
    pub fn jsStoreQualityPreference(quality: &str);

    // Signal that the `PlayerSnapshot` returned by the `Dispatcher` changed and
    // should be re-read by the UI.
    pub fn jsAnnounceStateChange();
}

/// Result of calling a JavaScript function wrapping a command of the embed
/// widget.
///
/// Creation of a `WidgetCallResult` should only be performed by the JavaScript side
/// through the exposed static constructors.
#[wasm_bindgen]
pub struct WidgetCallResult {
    error: Option<(WidgetCallErrorCode, Option<String>)>,
}

#[wasm_bindgen]
impl WidgetCallResult {
    /// Creates a `WidgetCallResult` indicating success.
    ///
    /// This function should only be called by the JavaScript-side.
    pub fn success() -> Self {
        Self { error: None }
    }

    /// Creates a `WidgetCallResult` indicating failure, with the corresponding
    /// error.
    ///
    /// This function should only be called by the JavaScript-side.
    pub fn error(err: WidgetCallErrorCode, desc: Option<String>) -> Self {
        Self {
            error: Some((err, desc)),
        }
    }
}

impl JsResult<(), WidgetCallErrorCode> for WidgetCallResult {
    fn result(self) -> Result<(), (WidgetCallErrorCode, Option<String>)> {
        if let Some(err) = self.error {
            Err(err)
        } else {
            Ok(())
        }
    }
}

/// Trait allowing to convert "JavaScript Results" as exposed by the JavaScript functions into
/// `Result` structs more idiomatic to Rust.
pub(crate) trait JsResult<T, E> {
    fn result(self) -> Result<T, (E, Option<String>)>;
}

/// Errors that can arise when calling a method of the embed widget.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetCallErrorCode {
    /// No player instance currently exists on the JavaScript-side.
    NoPlayer,

    /// The widget's method threw.
    Threw,
}

/// "Reason" associated to a timer started by the `Dispatcher`.
///
/// This can then help to identify what the timer was for once resolved.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerReason {
    /// The pending embed API load has been waited on for too long.
    ApiLoadStall = 0,

    /// Periodic check of the embed API's availability.
    ApiReadyPoll = 1,

    /// Periodic comparison of the widget's reported state against our own.
    Reconciliation = 2,

    /// Periodic evaluation of the preload gate.
    PreloadPoll = 3,

    /// The minimum intro duration elapsed.
    IntroSoft = 4,

    /// The maximum intro duration elapsed.
    IntroHard = 5,

    /// Upper bound on the time a quality switch may block the controls.
    QualityWatchdog = 6,

    /// Next attempt at applying and confirming a quality.
    QualityRetry = 7,

    /// Buffering went on for a suspiciously long time.
    StallCheck = 8,
}

/// Steps of the completion reporting sequence.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportStep {
    /// Report the watched and total durations.
    MarkWatched = 0,

    /// Mark the content as completed.
    MarkComplete = 1,

    /// Ask for gamification side effects linked to that completion.
    Gamification = 2,
}

/// Levels with which a log can be emitted.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd)]
pub enum LogLevel {
    /// Log level reserved for very important errors and highly unexpected events.
    Error = 0,

    /// Log level reserved for less important errors and unexpected events.
    Warn = 1,

    /// Log level reserved for important events
    Info = 2,

    /// Log level used when debugging. Small-ish yet impactful events should be logged with it.
    Debug = 3,
}

/// Identify a pending report request.
pub type RequestId = u32;

/// Identify a pending timer.
pub type TimerId = f64;
