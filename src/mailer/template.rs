//! HTML report rendering
//!
//! Literal, order-independent placeholder substitution over a template.
//! The template file is optional; the built-in default carries the same
//! placeholder set.

use crate::report::{FlatResult, RunSummary, TestStatus};
use std::path::Path;

/// Built-in fallback, used when no template file exists on disk
const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{{PROJECT_NAME}} - Test Report</title>
</head>
<body style="margin: 0; padding: 24px; background: #0a0f1d; color: #f9fafb; font-family: 'Inter', system-ui, sans-serif;">
    <div style="max-width: 720px; margin: 0 auto;">
        <h1 style="margin-bottom: 4px;">{{STATUS_EMOJI}} {{PROJECT_NAME}}</h1>
        <p style="color: #9ca3af; margin-top: 0;">Environment: {{ENVIRONMENT}} &middot; {{START_TIME}} &rarr; {{END_TIME}}</p>

        <table style="width: 100%; border-collapse: collapse; margin: 16px 0;">
            <tr>
                <td style="padding: 12px; background: #141b2d; border-radius: 8px;">Total<br><b style="font-size: 1.5rem;">{{TOTAL_TESTS}}</b></td>
                <td style="padding: 12px; background: #141b2d;">Passed<br><b style="font-size: 1.5rem; color: #10b981;">{{PASSED}}</b></td>
                <td style="padding: 12px; background: #141b2d;">Failed<br><b style="font-size: 1.5rem; color: #ef4444;">{{FAILED}}</b></td>
                <td style="padding: 12px; background: #141b2d;">Skipped<br><b style="font-size: 1.5rem; color: #f59e0b;">{{SKIPPED}}</b></td>
            </tr>
        </table>

        <p style="font-size: 1.1rem;">Pass rate: <b style="color: {{STATUS_COLOR}};">{{PASS_RATE}}%</b> &middot; Duration: {{DURATION}}</p>

        <table style="width: 100%; border-collapse: collapse; font-size: 0.875rem;">
            <tr style="text-align: left; color: #9ca3af;">
                <th style="padding: 8px; border-bottom: 1px solid #374151;">Test</th>
                <th style="padding: 8px; border-bottom: 1px solid #374151;">Status</th>
                <th style="padding: 8px; border-bottom: 1px solid #374151;">Duration</th>
                <th style="padding: 8px; border-bottom: 1px solid #374151;">Error</th>
            </tr>
            {{TEST_RESULTS_ROWS}}
        </table>

        <p style="margin-top: 24px;"><a href="{{BUILD_URL}}" style="color: #3b82f6;">View build</a></p>
    </div>
</body>
</html>"#;

/// Load the template file if present, otherwise the built-in default
pub fn load_template(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|_| DEFAULT_TEMPLATE.to_string())
}

/// Pass rate as a whole percentage. An empty run renders as 0% rather
/// than propagating a division by zero into the report.
pub fn pass_rate(summary: &RunSummary) -> u32 {
    if summary.total == 0 {
        return 0;
    }
    (summary.passed as f64 / summary.total as f64 * 100.0).round() as u32
}

/// Status glyph and accent color, chosen solely by whether anything failed
pub fn status_badge(summary: &RunSummary) -> (&'static str, &'static str) {
    if summary.failed > 0 {
        ("❌", "#ef4444")
    } else {
        ("✅", "#10b981")
    }
}

/// Email subject line
pub fn subject(summary: &RunSummary) -> String {
    let (emoji, _) = status_badge(summary);
    format!(
        "{} {} [{}] - {}% Pass Rate ({}/{} passed)",
        emoji,
        summary.project_name,
        summary.environment,
        pass_rate(summary),
        summary.passed,
        summary.total
    )
}

/// Render the full HTML body by substituting every placeholder
pub fn render(template: &str, summary: &RunSummary, results: &[FlatResult], build_url: Option<&str>) -> String {
    let (emoji, color) = status_badge(summary);
    let duration_min = (summary.duration_ms as f64 / 60_000.0).round() as u64;

    let substitutions: [(&str, String); 13] = [
        ("{{PROJECT_NAME}}", html_escape(&summary.project_name)),
        ("{{ENVIRONMENT}}", html_escape(&summary.environment)),
        ("{{TOTAL_TESTS}}", summary.total.to_string()),
        ("{{PASSED}}", summary.passed.to_string()),
        ("{{FAILED}}", summary.failed.to_string()),
        ("{{SKIPPED}}", summary.skipped.to_string()),
        ("{{PASS_RATE}}", pass_rate(summary).to_string()),
        ("{{DURATION}}", format!("{} min", duration_min)),
        (
            "{{START_TIME}}",
            html_escape(summary.start_time.as_deref().unwrap_or("-")),
        ),
        (
            "{{END_TIME}}",
            html_escape(summary.end_time.as_deref().unwrap_or("-")),
        ),
        ("{{STATUS_EMOJI}}", emoji.to_string()),
        ("{{STATUS_COLOR}}", color.to_string()),
        ("{{BUILD_URL}}", build_url.unwrap_or("#").to_string()),
    ];

    let mut html = template.to_string();
    for (placeholder, value) in substitutions {
        html = html.replace(placeholder, &value);
    }
    html.replace("{{TEST_RESULTS_ROWS}}", &build_rows(results))
}

/// One table row per flattened result
pub fn build_rows(results: &[FlatResult]) -> String {
    let mut rows = String::new();
    for result in results {
        let (label, color) = match result.status {
            TestStatus::Passed => ("Passed", "#10b981"),
            TestStatus::Failed => ("Failed", "#ef4444"),
            TestStatus::Skipped => ("Skipped", "#f59e0b"),
        };

        let retries = if result.retry_count > 0 {
            format!(" (retried {}x)", result.retry_count)
        } else {
            String::new()
        };

        rows.push_str(&format!(
            r#"<tr>
                <td style="padding: 8px; border-bottom: 1px solid #1f2937;">{}{}</td>
                <td style="padding: 8px; border-bottom: 1px solid #1f2937; color: {};">{}</td>
                <td style="padding: 8px; border-bottom: 1px solid #1f2937;">{}ms</td>
                <td style="padding: 8px; border-bottom: 1px solid #1f2937; color: #fca5a5;">{}</td>
            </tr>
"#,
            html_escape(&result.name),
            retries,
            color,
            label,
            result.duration_ms,
            html_escape(result.error.as_deref().unwrap_or("")),
        ));
    }
    rows
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(passed: u32, failed: u32, skipped: u32) -> RunSummary {
        RunSummary {
            total: passed + failed + skipped,
            passed,
            failed,
            skipped,
            duration_ms: 125_000,
            start_time: Some("2026-08-24T10:00:00Z".to_string()),
            end_time: Some("2026-08-24T10:02:05Z".to_string()),
            environment: "staging".to_string(),
            project_name: "Webshop E2E".to_string(),
        }
    }

    #[test]
    fn test_subject_contains_pass_rate_and_failure_glyph() {
        let s = summary(8, 2, 0);
        let subject = subject(&s);
        assert!(subject.contains("80% Pass Rate"));
        assert!(subject.contains("❌"));
    }

    #[test]
    fn test_subject_uses_success_glyph_when_nothing_failed() {
        let s = summary(5, 0, 1);
        assert!(subject(&s).contains("✅"));
    }

    #[test]
    fn test_empty_run_renders_zero_pass_rate() {
        let s = summary(0, 0, 0);
        assert_eq!(pass_rate(&s), 0);
        let html = render(DEFAULT_TEMPLATE, &s, &[], None);
        assert!(html.contains("0%"));
        assert!(!html.contains("NaN"));
    }

    #[test]
    fn test_render_substitutes_all_placeholders() {
        let s = summary(3, 1, 0);
        let results = vec![FlatResult {
            name: "Login > valid <user>".to_string(),
            status: TestStatus::Failed,
            duration_ms: 1500,
            error: Some("expected \"Dashboard\"".to_string()),
            retry_count: 1,
            screenshot_path: None,
        }];

        let html = render(DEFAULT_TEMPLATE, &s, &results, Some("https://ci/build/42"));
        assert!(!html.contains("{{"), "unsubstituted placeholder left in output");
        assert!(html.contains("Webshop E2E"));
        assert!(html.contains("https://ci/build/42"));
        // row content is escaped
        assert!(html.contains("Login &gt; valid &lt;user&gt;"));
        assert!(html.contains("expected &quot;Dashboard&quot;"));
        assert!(html.contains("(retried 1x)"));
    }

    #[test]
    fn test_duration_rendered_in_whole_minutes() {
        let s = summary(1, 0, 0);
        let html = render(DEFAULT_TEMPLATE, &s, &[], None);
        assert!(html.contains("2 min"));
    }

    #[test]
    fn test_missing_template_file_falls_back_to_default() {
        let template = load_template(Path::new("/nonexistent/template.html"));
        assert!(template.contains("{{TEST_RESULTS_ROWS}}"));
    }
}
