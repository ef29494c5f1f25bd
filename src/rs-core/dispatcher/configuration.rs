/// Tunables of the `Dispatcher`.
///
/// Can be updated at any time through the `Dispatcher`'s setters. Durations
/// and intervals are in milliseconds unless stated otherwise.
pub(crate) struct ControllerConfiguration {
    /// Minimum time playback is gated for at the start of a session, unless
    /// enough media is buffered first.
    pub(crate) preload_duration: f64,

    /// Amount of buffered media, in seconds, opening the preload gate early.
    pub(crate) preload_buffer_threshold: f64,

    /// Interval at which the preload gate is evaluated.
    pub(crate) preload_poll_interval: f64,

    /// Time after which the intro finishes if the player is ready.
    pub(crate) intro_duration: f64,

    /// Time after which the intro is force-finished whatever the player's
    /// state.
    pub(crate) max_splash_duration: f64,

    /// Upper bound on the time a quality switch may lock the controls.
    pub(crate) quality_switch_timeout: f64,

    /// Maximum number of times a quality is applied before giving up on its
    /// confirmation.
    pub(crate) quality_max_attempts: u32,

    /// Time after which a pending embed API load is considered stuck and
    /// restarted.
    pub(crate) api_stall_timeout: f64,

    /// Interval at which the embed API's availability is polled while
    /// loading.
    pub(crate) api_ready_poll_interval: f64,

    /// Time after which a still unavailable embed API is considered as failed
    /// to load.
    pub(crate) api_ready_timeout: f64,

    /// Interval at which the widget's reported state is compared against ours.
    pub(crate) reconciliation_interval: f64,

    /// Time buffering may go on without progress before a network error is
    /// shown.
    pub(crate) stall_timeout: f64,

    /// Default amount of seconds skipped forward or backward.
    pub(crate) skip_step: f64,
}

impl Default for ControllerConfiguration {
    fn default() -> Self {
        Self {
            preload_duration: 15000.,
            preload_buffer_threshold: 30.,
            preload_poll_interval: 250.,
            intro_duration: 10000.,
            max_splash_duration: 12000.,
            quality_switch_timeout: 6000.,
            quality_max_attempts: 8,
            api_stall_timeout: 12000.,
            api_ready_poll_interval: 50.,
            api_ready_timeout: 20000.,
            reconciliation_interval: 250.,
            stall_timeout: 8000.,
            skip_step: 10.,
        }
    }
}
