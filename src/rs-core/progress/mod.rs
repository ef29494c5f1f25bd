use serde::{Deserialize, Serialize};

use crate::{
    bindings::{ReportStep, RequestId},
    Logger,
};

/// Body sent to the progress-reporting backend.
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProgressReport {
    pub(crate) watched_duration: f64,
    pub(crate) total_duration: f64,
}

impl ProgressReport {
    pub(crate) fn to_json(&self) -> String {
        // non-finite values would be sent as `null`
        serde_json::to_string(&ProgressReport {
            watched_duration: finite_or_zero(self.watched_duration),
            total_duration: finite_or_zero(self.total_duration),
        })
        .unwrap_or_else(|_| String::from("{}"))
    }
}

/// Body answered by the backend to a completion report.
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportResponse {
    /// Opaque payload the gamification step has to be given.
    #[serde(default)]
    pub(crate) gamification: Option<serde_json::Value>,
}

impl ReportResponse {
    pub(crate) fn parse(payload: &str) -> Option<Self> {
        match serde_json::from_str(payload) {
            Ok(response) => Some(response),
            Err(err) => {
                Logger::warn(&format!("Report: Unreadable backend response: {err}"));
                None
            }
        }
    }

    /// The gamification payload, encoded back to JSON, if one.
    fn gamification_body(&self) -> Option<String> {
        self.gamification
            .as_ref()
            .filter(|g| !g.is_null())
            .and_then(|g| serde_json::to_string(g).ok())
    }
}

fn finite_or_zero(val: f64) -> f64 {
    if val.is_finite() {
        val
    } else {
        0.
    }
}

/// A report request that has to be sent.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct OutgoingReport {
    pub(crate) step: ReportStep,
    pub(crate) content_id: String,
    pub(crate) body: String,
}

struct InFlightReport {
    request_id: RequestId,
    step: ReportStep,
    content_id: String,
    body: String,
}

/// Reports the completion of a video, at most once per session.
///
/// Completion is reported in three best-effort steps (watched durations,
/// completion, then gamification). A failing step re-arms the reporter so the
/// next natural end of the video tries again.
pub(crate) struct ProgressReporter {
    reported: bool,
    in_flight: Option<InFlightReport>,
}

impl ProgressReporter {
    pub(crate) fn new() -> Self {
        Self {
            reported: false,
            in_flight: None,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.reported = false;
        self.in_flight = None;
    }

    #[cfg(test)]
    pub(crate) fn has_reported(&self) -> bool {
        self.reported
    }

    /// The video reached its end. Returns the first report to send, if this
    /// session has not reported yet.
    pub(crate) fn on_ended(
        &mut self,
        content_id: Option<&str>,
        report: ProgressReport,
    ) -> Option<OutgoingReport> {
        if self.reported {
            Logger::debug("Report: Completion already reported for this session");
            return None;
        }
        self.reported = true;
        let content_id = match content_id {
            Some(content_id) => content_id,
            None => {
                Logger::debug("Report: No content id, not reporting completion");
                return None;
            }
        };
        Some(OutgoingReport {
            step: ReportStep::MarkWatched,
            content_id: content_id.to_owned(),
            body: report.to_json(),
        })
    }

    /// Remember the request sent for `report`.
    pub(crate) fn track(&mut self, request_id: RequestId, report: OutgoingReport) {
        self.in_flight = Some(InFlightReport {
            request_id,
            step: report.step,
            content_id: report.content_id,
            body: report.body,
        });
    }

    /// A report request succeeded. Returns the next step to send, if one.
    pub(crate) fn on_finished(
        &mut self,
        request_id: RequestId,
        payload: Option<String>,
    ) -> Option<OutgoingReport> {
        let finished = self.take_in_flight(request_id)?;
        match finished.step {
            ReportStep::MarkWatched => Some(OutgoingReport {
                step: ReportStep::MarkComplete,
                content_id: finished.content_id,
                body: finished.body,
            }),
            ReportStep::MarkComplete => {
                let gamification = payload
                    .as_deref()
                    .and_then(ReportResponse::parse)
                    .and_then(|response| response.gamification_body());
                Some(OutgoingReport {
                    step: ReportStep::Gamification,
                    content_id: finished.content_id,
                    body: gamification.unwrap_or(finished.body),
                })
            }
            ReportStep::Gamification => {
                Logger::info("Report: Completion fully reported");
                None
            }
        }
    }

    /// A report request failed. Returns `true` if it was ours, in which case
    /// completion may be reported again on the next end of the video.
    pub(crate) fn on_failed(&mut self, request_id: RequestId) -> bool {
        match self.take_in_flight(request_id) {
            Some(failed) => {
                Logger::lazy_warn(&|| {
                    format!("Report: {:?} failed, completion will be reported again", failed.step)
                });
                self.reported = false;
                true
            }
            None => false,
        }
    }

    fn take_in_flight(&mut self, request_id: RequestId) -> Option<InFlightReport> {
        match &self.in_flight {
            Some(in_flight) if in_flight.request_id == request_id => self.in_flight.take(),
            _ => {
                Logger::debug("Report: Unknown report request finished");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: ProgressReport = ProgressReport {
        watched_duration: 119.5,
        total_duration: 120.,
    };

    #[test]
    fn test_body() {
        assert_eq!(
            REPORT.to_json(),
            r#"{"watchedDuration":119.5,"totalDuration":120.0}"#
        );
        let broken = ProgressReport {
            watched_duration: f64::NAN,
            total_duration: 3.,
        };
        assert_eq!(broken.to_json(), r#"{"watchedDuration":0.0,"totalDuration":3.0}"#);
    }

    #[test]
    fn test_reports_once() {
        let mut reporter = ProgressReporter::new();
        let first = reporter.on_ended(Some("lesson-1"), REPORT).unwrap();
        assert_eq!(first.step, ReportStep::MarkWatched);
        assert_eq!(first.content_id, "lesson-1");
        assert!(reporter.on_ended(Some("lesson-1"), REPORT).is_none());
        reporter.reset();
        assert!(reporter.on_ended(Some("lesson-1"), REPORT).is_some());
    }

    #[test]
    fn test_steps_chain() {
        let mut reporter = ProgressReporter::new();
        let first = reporter.on_ended(Some("lesson-1"), REPORT).unwrap();
        reporter.track(1, first);
        assert!(reporter.on_finished(2, None).is_none());
        let second = reporter.on_finished(1, None).unwrap();
        assert_eq!(second.step, ReportStep::MarkComplete);
        reporter.track(2, second);
        let third = reporter
            .on_finished(2, Some(r#"{"gamification":{"xp":10},"status":"ok"}"#.to_owned()))
            .unwrap();
        assert_eq!(third.step, ReportStep::Gamification);
        assert_eq!(third.body, r#"{"xp":10}"#);
        reporter.track(3, third);
        assert!(reporter.on_finished(3, None).is_none());
        assert!(reporter.has_reported());
    }

    #[test]
    fn test_failure_rearms() {
        let mut reporter = ProgressReporter::new();
        let first = reporter.on_ended(Some("lesson-1"), REPORT).unwrap();
        reporter.track(1, first);
        assert!(!reporter.on_failed(7));
        assert!(reporter.has_reported());
        assert!(reporter.on_failed(1));
        assert!(!reporter.has_reported());
        assert!(reporter.on_ended(Some("lesson-1"), REPORT).is_some());
    }

    #[test]
    fn test_no_content_id() {
        let mut reporter = ProgressReporter::new();
        assert!(reporter.on_ended(None, REPORT).is_none());
        assert!(reporter.has_reported());
    }

    #[test]
    fn test_gamification_falls_back_to_durations() {
        let durations = REPORT.to_json();
        for payload in [None, Some("{}"), Some(r#"{"gamification":null}"#), Some("<html>")] {
            let mut reporter = ProgressReporter::new();
            let first = reporter.on_ended(Some("lesson-1"), REPORT).unwrap();
            reporter.track(1, first);
            let second = reporter.on_finished(1, None).unwrap();
            reporter.track(2, second);
            let third = reporter
                .on_finished(2, payload.map(|p| p.to_owned()))
                .unwrap();
            assert_eq!(third.step, ReportStep::Gamification);
            assert_eq!(third.body, durations);
        }
    }

    #[test]
    fn test_parse_response() {
        let response = ReportResponse::parse(r#"{"gamification":{"badge":"first"}}"#).unwrap();
        assert_eq!(
            response.gamification,
            Some(serde_json::json!({ "badge": "first" }))
        );
        assert_eq!(ReportResponse::parse("{}"), Some(ReportResponse::default()));
        assert_eq!(ReportResponse::parse("not json"), None);
    }
}
