use std::fmt;

use crate::Logger;

/// Discrete quality levels the widget can be asked for, in increasing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum QualityTier {
    Tiny,
    Small,
    Medium,
    Large,
    Hd720,
    Hd1080,
    Hd1440,
}

impl QualityTier {
    pub(crate) const LOWEST: QualityTier = QualityTier::Tiny;
    pub(crate) const HIGHEST: QualityTier = QualityTier::Hd1440;

    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "tiny" => Some(QualityTier::Tiny),
            "small" => Some(QualityTier::Small),
            "medium" => Some(QualityTier::Medium),
            "large" => Some(QualityTier::Large),
            "hd720" => Some(QualityTier::Hd720),
            "hd1080" => Some(QualityTier::Hd1080),
            "hd1440" => Some(QualityTier::Hd1440),
            _ => None,
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Tiny => "tiny",
            QualityTier::Small => "small",
            QualityTier::Medium => "medium",
            QualityTier::Large => "large",
            QualityTier::Hd720 => "hd720",
            QualityTier::Hd1080 => "hd1080",
            QualityTier::Hd1440 => "hd1440",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Quality wanted by the user. Persisted across sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum QualityPreference {
    Auto,
    Tier(QualityTier),
}

impl QualityPreference {
    pub(crate) const AUTO_NAME: &'static str = "auto";

    pub(crate) fn from_name(name: &str) -> Option<Self> {
        if name == Self::AUTO_NAME {
            Some(QualityPreference::Auto)
        } else {
            QualityTier::from_name(name).map(QualityPreference::Tier)
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            QualityPreference::Auto => Self::AUTO_NAME,
            QualityPreference::Tier(tier) => tier.as_str(),
        }
    }
}

/// Choose which tier to actually request for `wanted`, given the tiers the
/// widget reports as available for the current video.
///
/// The nearest lower-or-equal tier is preferred, then the nearest higher one.
/// `None` means no tier is reported, in which case `wanted` should be
/// requested as is.
pub(crate) fn nearest_available(
    wanted: QualityTier,
    available: &[QualityTier],
) -> Option<QualityTier> {
    let lower_or_equal = available.iter().filter(|t| **t <= wanted).max();
    let higher = available.iter().filter(|t| **t > wanted).min();
    lower_or_equal.or(higher).copied()
}

/// Delay in milliseconds before the retry following attempt number `attempt`
/// (starting at `0`).
pub(crate) fn retry_delay(attempt: u32) -> f64 {
    f64::min(2000., 150. + f64::from(attempt) * 200.)
}

/// A quality switch blocking the controls until confirmed or abandoned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SwitchLock {
    pub(crate) target: QualityTier,
    /// Playback was active when the switch began and is to be resumed.
    pub(crate) resume_playback: bool,
}

/// Ongoing apply-and-confirm loop for a tier.
#[derive(Clone, Copy, Debug, PartialEq)]
struct RetryLoop {
    target: QualityTier,
    attempts: u32,
}

/// Outcome of checking whether the widget applied the wanted tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum RetryStep {
    /// The widget confirmed the target tier.
    Confirmed(QualityTier),
    /// Apply the target again, then wait `delay` milliseconds.
    Reapply { target: QualityTier, delay: f64 },
    /// The retry budget is exhausted.
    GaveUp,
    /// No retry loop is running.
    Idle,
}

/// Tracks the user's quality preference and the state of applying it to the
/// widget.
pub(crate) struct QualityNegotiator {
    preference: QualityPreference,

    /// Tiers the widget reports for the current video, sorted.
    available: Vec<QualityTier>,

    /// Last tier the widget confirmed using.
    applied: Option<QualityTier>,

    switch_lock: Option<SwitchLock>,

    retry: Option<RetryLoop>,

    /// The preference still has to be applied once playback is active.
    pending_apply: bool,

    max_attempts: u32,
}

impl QualityNegotiator {
    pub(crate) fn new(preference: QualityPreference, max_attempts: u32) -> Self {
        Self {
            preference,
            available: vec![],
            applied: None,
            switch_lock: None,
            retry: None,
            pending_apply: preference != QualityPreference::Auto,
            max_attempts,
        }
    }

    /// Forget everything linked to the previous video. The preference is kept.
    pub(crate) fn reset_for_new_video(&mut self) {
        self.available.clear();
        self.applied = None;
        self.switch_lock = None;
        self.retry = None;
        self.pending_apply = self.preference != QualityPreference::Auto;
    }

    pub(crate) fn preference(&self) -> QualityPreference {
        self.preference
    }

    pub(crate) fn set_preference(&mut self, preference: QualityPreference) {
        self.preference = preference;
        self.pending_apply = preference != QualityPreference::Auto;
    }

    pub(crate) fn set_max_attempts(&mut self, max_attempts: u32) {
        self.max_attempts = max_attempts.max(1);
    }

    pub(crate) fn is_switching(&self) -> bool {
        self.switch_lock.is_some()
    }

    pub(crate) fn is_pending_apply(&self) -> bool {
        self.pending_apply
    }

    pub(crate) fn clear_pending_apply(&mut self) {
        self.pending_apply = false;
    }

    pub(crate) fn available(&self) -> &[QualityTier] {
        &self.available
    }

    pub(crate) fn update_available(&mut self, available: Vec<QualityTier>) {
        self.available = available;
    }

    pub(crate) fn applied(&self) -> Option<QualityTier> {
        self.applied
    }

    pub(crate) fn set_applied(&mut self, tier: Option<QualityTier>) {
        self.applied = tier;
    }

    /// Tier to request for the current preference, `None` in auto mode.
    pub(crate) fn resolve_target(&self) -> Option<QualityTier> {
        match self.preference {
            QualityPreference::Auto => None,
            QualityPreference::Tier(wanted) => {
                Some(nearest_available(wanted, &self.available).unwrap_or(wanted))
            }
        }
    }

    /// Lock the controls while switching to `target`.
    pub(crate) fn begin_switch(&mut self, target: QualityTier, resume_playback: bool) {
        self.switch_lock = Some(SwitchLock {
            target,
            resume_playback,
        });
    }

    /// Release the switching lock, returning it if one was held.
    pub(crate) fn end_switch(&mut self) -> Option<SwitchLock> {
        self.switch_lock.take()
    }

    /// Start the apply-and-confirm loop. The first application is counted as
    /// the first attempt and is expected to be performed by the caller.
    pub(crate) fn begin_retry(&mut self, target: QualityTier) {
        self.retry = Some(RetryLoop {
            target,
            attempts: 1,
        });
    }

    pub(crate) fn cancel_retry(&mut self) {
        self.retry = None;
    }

    /// Delay before the first confirmation check of a freshly begun loop.
    pub(crate) fn first_retry_delay(&self) -> f64 {
        retry_delay(0)
    }

    /// Compare the tier the widget reports against the retry loop's target.
    pub(crate) fn check_retry(&mut self, reported: Option<QualityTier>) -> RetryStep {
        let retry = match self.retry.as_mut() {
            Some(retry) => retry,
            None => return RetryStep::Idle,
        };
        if reported == Some(retry.target) {
            let target = retry.target;
            self.retry = None;
            self.applied = Some(target);
            return RetryStep::Confirmed(target);
        }
        if retry.attempts >= self.max_attempts {
            Logger::lazy_warn(&|| {
                format!(
                    "Quality: {} not confirmed after {} attempts, giving up",
                    retry.target, retry.attempts
                )
            });
            self.retry = None;
            return RetryStep::GaveUp;
        }
        let delay = retry_delay(retry.attempts);
        retry.attempts += 1;
        RetryStep::Reapply {
            target: retry.target,
            delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use QualityTier::*;

    #[test]
    fn test_names() {
        for tier in [Tiny, Small, Medium, Large, Hd720, Hd1080, Hd1440] {
            assert_eq!(QualityTier::from_name(tier.as_str()), Some(tier));
        }
        assert_eq!(QualityTier::from_name("highres"), None);
        assert_eq!(
            QualityPreference::from_name("auto"),
            Some(QualityPreference::Auto)
        );
        assert_eq!(
            QualityPreference::from_name("hd720"),
            Some(QualityPreference::Tier(Hd720))
        );
    }

    #[test]
    fn test_nearest_prefers_lower_or_equal() {
        assert_eq!(nearest_available(Hd1080, &[Small, Medium, Large]), Some(Large));
        assert_eq!(nearest_available(Hd720, &[Small, Hd720, Hd1080]), Some(Hd720));
        assert_eq!(nearest_available(Hd720, &[Small, Hd1080]), Some(Small));
    }

    #[test]
    fn test_nearest_falls_back_to_higher() {
        assert_eq!(nearest_available(Tiny, &[Hd720, Medium]), Some(Medium));
        assert_eq!(nearest_available(Small, &[]), None);
    }

    #[test]
    fn test_retry_delay() {
        assert_eq!(retry_delay(0), 150.);
        assert_eq!(retry_delay(1), 350.);
        assert_eq!(retry_delay(9), 1950.);
        assert_eq!(retry_delay(10), 2000.);
        assert_eq!(retry_delay(50), 2000.);
    }

    #[test]
    fn test_retry_is_bounded() {
        let mut negotiator = QualityNegotiator::new(QualityPreference::Tier(Hd720), 8);
        negotiator.begin_retry(Hd720);
        let mut reapplied = 0;
        loop {
            match negotiator.check_retry(Some(Small)) {
                RetryStep::Reapply { target, .. } => {
                    assert_eq!(target, Hd720);
                    reapplied += 1;
                }
                RetryStep::GaveUp => break,
                other => panic!("unexpected step {other:?}"),
            }
        }
        // one initial application plus seven re-applications
        assert_eq!(reapplied, 7);
        assert_eq!(negotiator.check_retry(Some(Small)), RetryStep::Idle);
        assert_eq!(negotiator.applied(), None);
    }

    #[test]
    fn test_retry_stops_on_confirmation() {
        let mut negotiator = QualityNegotiator::new(QualityPreference::Tier(Hd720), 8);
        negotiator.begin_retry(Hd720);
        assert_eq!(
            negotiator.check_retry(None),
            RetryStep::Reapply {
                target: Hd720,
                delay: 350.
            }
        );
        assert_eq!(
            negotiator.check_retry(Some(Hd720)),
            RetryStep::Confirmed(Hd720)
        );
        assert_eq!(negotiator.applied(), Some(Hd720));
        assert_eq!(negotiator.check_retry(Some(Hd720)), RetryStep::Idle);
    }

    #[test]
    fn test_resolve_target() {
        let mut negotiator = QualityNegotiator::new(QualityPreference::Auto, 8);
        assert_eq!(negotiator.resolve_target(), None);
        assert!(!negotiator.is_pending_apply());
        negotiator.set_preference(QualityPreference::Tier(Hd1080));
        assert!(negotiator.is_pending_apply());
        // nothing reported yet: passed through unvalidated
        assert_eq!(negotiator.resolve_target(), Some(Hd1080));
        negotiator.update_available(vec![Small, Medium, Large]);
        assert_eq!(negotiator.resolve_target(), Some(Large));
    }

    #[test]
    fn test_reset_keeps_preference() {
        let mut negotiator = QualityNegotiator::new(QualityPreference::Tier(Large), 8);
        negotiator.clear_pending_apply();
        negotiator.begin_switch(Large, true);
        negotiator.set_applied(Some(Large));
        negotiator.reset_for_new_video();
        assert!(!negotiator.is_switching());
        assert_eq!(negotiator.applied(), None);
        assert!(negotiator.is_pending_apply());
        assert_eq!(negotiator.preference(), QualityPreference::Tier(Large));
    }
}
