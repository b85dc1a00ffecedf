//! Applying a seed manifest, one control tool call per record.

use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::core::invocation::{Invocation, TOKEN_PLACEHOLDER};
use crate::core::manifest::SeedManifest;
use crate::core::report::{ApplyReport, OutcomeStatus, RecordOutcome};
use crate::core::types::{SessionToken, TargetAddress};
use crate::io::config::FailurePolicy;
use crate::io::control::ControlTool;

/// Apply every record of `manifest` in application order.
///
/// Each record is a single blocking call. Failures are captured in the report;
/// under [`FailurePolicy::FailFast`] the remaining records are marked skipped.
/// No retries, no rollback.
pub fn apply_all<T: ControlTool + ?Sized>(
    tool: &T,
    manifest: &SeedManifest,
    address: &TargetAddress,
    token: &SessionToken,
    policy: FailurePolicy,
) -> ApplyReport {
    let total = manifest.len();
    if total == 0 {
        warn!("manifest has no records, nothing to apply");
    }
    info!(records = total, ?policy, "applying manifest");

    let mut outcomes = Vec::with_capacity(total);
    let mut halted = false;

    for (index, record) in manifest.records().enumerate() {
        if halted {
            outcomes.push(RecordOutcome {
                index,
                record,
                status: OutcomeStatus::Skipped,
                duration_ms: 0,
            });
            continue;
        }

        let started = Instant::now();
        let invocation = Invocation::for_record(&record, address, token.as_str());
        let status = match tool.invoke(&invocation) {
            Ok(response) if response.success => OutcomeStatus::Applied,
            Ok(response) => OutcomeStatus::Failed {
                reason: response.failure_reason(),
            },
            Err(err) => OutcomeStatus::Failed {
                reason: format!("launch failed: {err:#}"),
            },
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        match &status {
            OutcomeStatus::Failed { reason } => {
                error!(index, record = %record.label(), %reason, "record failed");
                if policy == FailurePolicy::FailFast {
                    warn!(
                        remaining = total - index - 1,
                        "fail-fast: skipping remaining records"
                    );
                    halted = true;
                }
            }
            _ => debug!(index, record = %record.label(), duration_ms, "record applied"),
        }

        outcomes.push(RecordOutcome {
            index,
            record,
            status,
            duration_ms,
        });
    }

    let report = ApplyReport { outcomes };
    info!(
        applied = report.applied(),
        failed = report.failed(),
        skipped = report.skipped(),
        "manifest applied"
    );
    report
}

/// The invocations `apply_all` would issue, with the token replaced by
/// [`TOKEN_PLACEHOLDER`]. Launches nothing.
pub fn plan(manifest: &SeedManifest, address: &TargetAddress) -> Vec<Invocation> {
    manifest
        .records()
        .map(|record| Invocation::for_record(&record, address, TOKEN_PLACEHOLDER))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ToolMode;
    use crate::test_support::{
        ScriptedControlTool, exit, launch_error, ok, sample_manifest, timed_out,
    };

    fn address() -> TargetAddress {
        TargetAddress::new("https://example.test")
    }

    fn token() -> SessionToken {
        SessionToken::from_output("abc123\n")
    }

    fn tail(invocation: &Invocation) -> Vec<&str> {
        invocation.args[4..].iter().map(String::as_str).collect()
    }

    #[test]
    fn applies_records_in_category_order() {
        let tool = ScriptedControlTool::default();
        let report = apply_all(
            &tool,
            &sample_manifest(),
            &address(),
            &token(),
            FailurePolicy::BestEffort,
        );

        assert!(report.is_success());
        assert_eq!(report.applied(), 5);
        assert_eq!(
            tool.modes(),
            vec![
                ToolMode::Asset,
                ToolMode::Asset,
                ToolMode::Nav,
                ToolMode::Admin,
                ToolMode::Admin,
            ]
        );

        let calls = tool.calls();
        assert_eq!(
            tail(&calls[3]),
            vec!["-cmd", "admin", "-text", "x", "-redirect", "/a", "-col", "new"]
        );
        assert_eq!(
            tail(&calls[4]),
            vec!["-cmd", "admin", "-text", "y", "-redirect", "/b", "-col", "modify"]
        );
        for call in &calls {
            assert_eq!(
                &call.args[..4],
                &["-address", "https://example.test", "-cookie", "abc123"]
            );
        }
    }

    #[test]
    fn replay_issues_identical_invocations() {
        let manifest = sample_manifest();
        let first = ScriptedControlTool::default();
        let second = ScriptedControlTool::default();
        apply_all(&first, &manifest, &address(), &token(), FailurePolicy::BestEffort);
        apply_all(&second, &manifest, &address(), &token(), FailurePolicy::BestEffort);
        assert_eq!(first.calls(), second.calls());
    }

    #[test]
    fn best_effort_continues_after_failures() {
        let tool = ScriptedControlTool::new(vec![
            ok(""),
            exit(2, "There was an error performing the desired request: 500"),
            launch_error("no such file"),
            timed_out(),
            ok(""),
        ]);
        let report = apply_all(
            &tool,
            &sample_manifest(),
            &address(),
            &token(),
            FailurePolicy::BestEffort,
        );

        assert_eq!(tool.calls().len(), 5);
        assert_eq!(report.applied(), 2);
        assert_eq!(report.failed(), 3);
        assert_eq!(report.skipped(), 0);
        assert!(!report.is_success());

        let reasons: Vec<String> = report
            .failures()
            .map(|outcome| match &outcome.status {
                OutcomeStatus::Failed { reason } => reason.clone(),
                other => panic!("unexpected status {other:?}"),
            })
            .collect();
        assert!(reasons[0].starts_with("exit status 2"));
        assert!(reasons[1].contains("launch failed: no such file"));
        assert_eq!(reasons[2], "control tool timed out");
    }

    #[test]
    fn fail_fast_skips_remaining_records() {
        let tool = ScriptedControlTool::new(vec![ok(""), exit(2, "boom")]);
        let report = apply_all(
            &tool,
            &sample_manifest(),
            &address(),
            &token(),
            FailurePolicy::FailFast,
        );

        assert_eq!(tool.calls().len(), 2);
        assert_eq!(report.outcomes.len(), 5);
        assert_eq!(report.applied(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 3);
        assert!(
            report.outcomes[2..]
                .iter()
                .all(|o| o.status == OutcomeStatus::Skipped)
        );
    }

    #[test]
    fn empty_manifest_issues_no_calls() {
        let tool = ScriptedControlTool::default();
        let report = apply_all(
            &tool,
            &SeedManifest::default(),
            &address(),
            &token(),
            FailurePolicy::BestEffort,
        );
        assert!(tool.calls().is_empty());
        assert!(report.is_success());
    }

    #[test]
    fn plan_matches_apply_without_token() {
        let manifest = sample_manifest();
        let planned = plan(&manifest, &address());

        let tool = ScriptedControlTool::default();
        apply_all(&tool, &manifest, &address(), &token(), FailurePolicy::BestEffort);
        let applied: Vec<Vec<String>> = tool.calls().iter().map(Invocation::redacted_args).collect();
        let planned_args: Vec<Vec<String>> = planned.iter().map(|i| i.args.clone()).collect();

        assert_eq!(planned_args, applied);
        assert!(planned.iter().all(|i| i.args[3] == TOKEN_PLACEHOLDER));
    }
}
