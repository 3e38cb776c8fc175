//! Result parser
//!
//! Flattens the nested suite/spec tree of an execution report into one
//! record per spec. The last recorded attempt is authoritative; earlier
//! attempts only contribute to the retry count.

use super::types::{Attempt, FlatResult, RunReport, RunSummary, Spec, Suite, TestStatus};

/// Upper bound on the error text carried into reports
const MAX_ERROR_LEN: usize = 200;

/// Flatten a report into one result per spec, in traversal order.
/// Specs with zero recorded attempts are dropped.
pub fn flatten(report: &RunReport) -> Vec<FlatResult> {
    let mut results = Vec::new();
    let mut titles: Vec<String> = Vec::new();
    for suite in &report.suites {
        walk_suite(suite, &mut titles, &mut results);
    }
    results
}

fn walk_suite(suite: &Suite, titles: &mut Vec<String>, out: &mut Vec<FlatResult>) {
    let pushed = !suite.title.is_empty();
    if pushed {
        titles.push(suite.title.clone());
    }

    for spec in &suite.specs {
        if let Some(result) = flatten_spec(spec, titles) {
            out.push(result);
        }
    }
    for child in &suite.suites {
        walk_suite(child, titles, out);
    }

    if pushed {
        titles.pop();
    }
}

fn flatten_spec(spec: &Spec, titles: &[String]) -> Option<FlatResult> {
    // Attempts across all test entries of the spec, in recorded order
    let attempts: Vec<&Attempt> = spec.tests.iter().flat_map(|t| &t.results).collect();
    let last = *attempts.last()?;

    let name = if titles.is_empty() {
        spec.title.clone()
    } else {
        format!("{} > {}", titles.join(" > "), spec.title)
    };

    let error = last
        .error
        .as_ref()
        .and_then(|e| e.message.as_deref())
        .map(truncate_error);

    let screenshot_path = attempts
        .iter()
        .rev()
        .flat_map(|a| &a.attachments)
        .find(|a| a.name == "screenshot" || a.content_type.starts_with("image/"))
        .and_then(|a| a.path.clone());

    Some(FlatResult {
        name,
        status: TestStatus::from_raw(&last.status),
        duration_ms: last.duration.max(0.0) as u64,
        error,
        retry_count: (attempts.len() - 1) as u32,
        screenshot_path,
    })
}

fn truncate_error(message: &str) -> String {
    if message.chars().count() <= MAX_ERROR_LEN {
        message.to_string()
    } else {
        message.chars().take(MAX_ERROR_LEN).collect()
    }
}

/// Scan the flattened list once and aggregate counts plus the run's time
/// window. Invariant: total = passed + failed + skipped.
pub fn summarize(report: &RunReport, results: &[FlatResult], environment: &str) -> RunSummary {
    let mut passed = 0;
    let mut failed = 0;
    let mut skipped = 0;
    for result in results {
        match result.status {
            TestStatus::Passed => passed += 1,
            TestStatus::Failed => failed += 1,
            TestStatus::Skipped => skipped += 1,
        }
    }

    let project_name = report
        .config
        .projects
        .first()
        .map(|p| p.name.clone())
        .unwrap_or_default();

    RunSummary {
        total: passed + failed + skipped,
        passed,
        failed,
        skipped,
        duration_ms: report.stats.duration.max(0.0) as u64,
        start_time: report.stats.start_time.clone(),
        end_time: report.stats.end_time.clone(),
        environment: environment.to_string(),
        project_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_from_json(json: serde_json::Value) -> RunReport {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_flatten_counts_match_summary_invariant() {
        let report = report_from_json(serde_json::json!({
            "config": {"projects": [{"name": "chromium"}]},
            "stats": {"duration": 60000.0, "startTime": "2026-08-24T10:00:00Z"},
            "suites": [{
                "title": "login.spec.ts",
                "suites": [{
                    "title": "Login",
                    "specs": [
                        {"title": "valid login", "tests": [{"results": [{"status": "passed", "duration": 1200.0}]}]},
                        {"title": "wrong password", "tests": [{"results": [{"status": "failed", "duration": 900.0, "error": {"message": "expected error banner"}}]}]},
                        {"title": "locked out", "tests": [{"results": [{"status": "skipped", "duration": 0.0}]}]}
                    ]
                }]
            }]
        }));

        let results = flatten(&report);
        assert_eq!(results.len(), 3);

        let summary = summarize(&report, &results, "staging");
        assert_eq!(summary.total, 3);
        assert_eq!(
            summary.passed + summary.failed + summary.skipped,
            summary.total
        );
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.project_name, "chromium");
    }

    #[test]
    fn test_last_attempt_wins_and_retry_count() {
        let report = report_from_json(serde_json::json!({
            "suites": [{
                "title": "checkout",
                "specs": [{
                    "title": "pay with card",
                    "tests": [{"results": [
                        {"status": "failed", "duration": 2000.0, "error": {"message": "timeout"}},
                        {"status": "passed", "duration": 1500.0}
                    ]}]
                }]
            }]
        }));

        let results = flatten(&report);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, TestStatus::Passed);
        assert_eq!(results[0].retry_count, 1);
        assert_eq!(results[0].duration_ms, 1500);
        assert!(results[0].error.is_none());
    }

    #[test]
    fn test_specs_without_attempts_are_dropped() {
        let report = report_from_json(serde_json::json!({
            "suites": [{
                "title": "pending",
                "specs": [
                    {"title": "never executed", "tests": [{"results": []}]},
                    {"title": "executed", "tests": [{"results": [{"status": "passed", "duration": 10.0}]}]}
                ]
            }]
        }));

        let results = flatten(&report);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "pending > executed");
    }

    #[test]
    fn test_nested_suites_build_name_path() {
        let report = report_from_json(serde_json::json!({
            "suites": [{
                "title": "smoke.spec.ts",
                "suites": [{
                    "title": "Cart",
                    "suites": [{
                        "title": "empty cart",
                        "specs": [{"title": "shows hint", "tests": [{"results": [{"status": "passed", "duration": 5.0}]}]}]
                    }],
                    "specs": []
                }]
            }]
        }));

        let results = flatten(&report);
        assert_eq!(results[0].name, "smoke.spec.ts > Cart > empty cart > shows hint");
    }

    #[test]
    fn test_error_truncated_to_bound() {
        let long = "x".repeat(500);
        let report = report_from_json(serde_json::json!({
            "suites": [{
                "title": "s",
                "specs": [{"title": "t", "tests": [{"results": [
                    {"status": "failed", "duration": 1.0, "error": {"message": long}}
                ]}]}]
            }]
        }));

        let results = flatten(&report);
        assert_eq!(results[0].error.as_ref().unwrap().len(), 200);
    }

    #[test]
    fn test_non_passed_non_skipped_statuses_count_as_failed() {
        assert_eq!(TestStatus::from_raw("timedOut"), TestStatus::Failed);
        assert_eq!(TestStatus::from_raw("interrupted"), TestStatus::Failed);
        assert_eq!(TestStatus::from_raw("passed"), TestStatus::Passed);
        assert_eq!(TestStatus::from_raw("skipped"), TestStatus::Skipped);
    }

    #[test]
    fn test_screenshot_attachment_is_carried() {
        let report = report_from_json(serde_json::json!({
            "suites": [{
                "title": "s",
                "specs": [{"title": "t", "tests": [{"results": [{
                    "status": "failed",
                    "duration": 1.0,
                    "attachments": [{"name": "screenshot", "contentType": "image/png", "path": "out/fail.png"}]
                }]}]}]
            }]
        }));

        let results = flatten(&report);
        assert_eq!(results[0].screenshot_path.as_deref(), Some("out/fail.png"));
    }
}
