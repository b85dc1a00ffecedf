//! Per-record outcomes aggregated into a run report.

use serde::Serialize;

use crate::core::types::ConfigurationRecord;

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum OutcomeStatus {
    Applied,
    Failed { reason: String },
    /// Not attempted because an earlier record failed under fail-fast.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordOutcome {
    /// Position in manifest application order.
    pub index: usize,
    pub record: ConfigurationRecord,
    #[serde(flatten)]
    pub status: OutcomeStatus,
    pub duration_ms: u64,
}

impl RecordOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self.status, OutcomeStatus::Applied)
    }
}

/// Result of applying a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub outcomes: Vec<RecordOutcome>,
}

impl ApplyReport {
    pub fn applied(&self) -> usize {
        self.count(|status| matches!(status, OutcomeStatus::Applied))
    }

    pub fn failed(&self) -> usize {
        self.count(|status| matches!(status, OutcomeStatus::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|status| matches!(status, OutcomeStatus::Skipped))
    }

    /// True when every record was applied.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(RecordOutcome::is_applied)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecordOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, OutcomeStatus::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(index: usize, status: OutcomeStatus) -> RecordOutcome {
        RecordOutcome {
            index,
            record: ConfigurationRecord::Asset {
                image: format!("./{index}.png"),
            },
            status,
            duration_ms: 0,
        }
    }

    #[test]
    fn counts_and_success() {
        let report = ApplyReport {
            outcomes: vec![
                outcome(0, OutcomeStatus::Applied),
                outcome(
                    1,
                    OutcomeStatus::Failed {
                        reason: "exit 2".to_string(),
                    },
                ),
                outcome(2, OutcomeStatus::Skipped),
            ],
        };
        assert_eq!(report.applied(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        assert!(!report.is_success());
        assert_eq!(report.failures().map(|o| o.index).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn empty_report_is_success() {
        assert!(ApplyReport::default().is_success());
    }

    #[test]
    fn serializes_status_inline() {
        let json = serde_json::to_value(outcome(
            0,
            OutcomeStatus::Failed {
                reason: "boom".to_string(),
            },
        ))
        .expect("serialize");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "boom");
        assert_eq!(json["record"]["kind"], "asset");
    }
}
