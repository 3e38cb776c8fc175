//! Squash TM result uploader
//!
//! Maps flattened results to the test-management REST API, keyed by the
//! `@squashTM:<ID>` marker embedded in test display names. Integration
//! failures never fail the test run: every outcome is a logged boolean.

use crate::logger::RunLogger;
use crate::report::{FlatResult, TestStatus};
use crate::settings::{Settings, SquashSettings};
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Body of the test-plan status update
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecutionUpdate {
    execution_status: &'static str,
    comment: String,
    last_executed_on: String,
}

/// Body of the screenshot attachment upload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentUpload {
    name: String,
    content: String,
    content_type: &'static str,
}

/// Data-driven iteration context attached to a reported result
#[derive(Debug, Clone, Copy)]
pub struct IterationInfo<'a> {
    /// Zero-based position within the data-driven batch
    pub index: usize,
    pub data: Option<&'a serde_json::Value>,
}

pub struct SquashClient {
    settings: SquashSettings,
    client: reqwest::Client,
}

impl SquashClient {
    pub fn new(settings: &Settings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            settings: settings.squash.clone(),
            client,
        }
    }

    /// Extract the full test-management identifier from a display name,
    /// e.g. `"Some test @squashTM:CAMP-4-TC-101"` -> `"CAMP-4-TC-101"`.
    /// Absence of the marker is not an error.
    pub fn extract_squash_id(name: &str) -> Option<String> {
        let re = Regex::new(r"@squashTM:([A-Za-z0-9_-]+)").ok()?;
        re.captures(name).map(|c| c[1].to_string())
    }

    /// Extract the addressable numeric test-case id from a full
    /// identifier, e.g. `"CAMP-4-TC-101"` -> `"101"`.
    pub fn extract_test_case_number(squash_id: &str) -> Option<String> {
        let re = Regex::new(r"TC-(\d+)").ok()?;
        re.captures(squash_id).map(|c| c[1].to_string())
    }

    /// Report one result. Returns whether the remote update succeeded;
    /// `false` covers disabled integration, unlinked tests, and remote
    /// failures alike.
    pub async fn report_result(
        &self,
        result: &FlatResult,
        iteration: Option<IterationInfo<'_>>,
        logger: &RunLogger,
    ) -> bool {
        if !self.settings.enabled {
            return false;
        }

        let squash_id = match Self::extract_squash_id(&result.name) {
            Some(id) => id,
            None => {
                logger.warn(&format!(
                    "No @squashTM marker in test name, not reporting: {}",
                    result.name
                ));
                return false;
            }
        };
        let test_case_id = match Self::extract_test_case_number(&squash_id) {
            Some(id) => id,
            None => {
                logger.warn(&format!(
                    "No TC-<digits> segment in squash id '{}', not reporting",
                    squash_id
                ));
                return false;
            }
        };

        let update = ExecutionUpdate {
            execution_status: execution_status(result.status),
            comment: build_comment(result, iteration),
            last_executed_on: chrono::Utc::now().to_rfc3339(),
        };

        match self.patch_test_plan(&test_case_id, &update).await {
            Ok(()) => {
                logger.info(&format!(
                    "Reported '{}' to Squash TM as {} (TC-{})",
                    result.name, update.execution_status, test_case_id
                ));
            }
            Err(e) => {
                logger.warn(&format!(
                    "Squash TM update failed for TC-{}: {:#}",
                    test_case_id, e
                ));
                return false;
            }
        }

        // Best effort: a failed upload never flips the primary outcome
        if result.status == TestStatus::Failed {
            if let Some(path) = result.screenshot_path.as_deref() {
                if Path::new(path).is_file() {
                    if let Err(e) = self.upload_screenshot(&test_case_id, Path::new(path)).await {
                        logger.warn(&format!(
                            "Screenshot upload failed for TC-{}: {:#}",
                            test_case_id, e
                        ));
                    }
                }
            }
        }

        true
    }

    /// Report a data-driven batch sequentially, each result tagged with
    /// its zero-based position. No atomicity: partial completion is
    /// expected on failure. Returns the number of successful updates.
    pub async fn report_ddt_results(&self, results: &[FlatResult], logger: &RunLogger) -> usize {
        let mut reported = 0;
        for (index, result) in results.iter().enumerate() {
            let iteration = IterationInfo { index, data: None };
            if self.report_result(result, Some(iteration), logger).await {
                reported += 1;
            }
        }
        reported
    }

    async fn patch_test_plan(&self, test_case_id: &str, update: &ExecutionUpdate) -> Result<()> {
        let url = format!(
            "{}/iterations/{}/test-plan",
            self.settings.base_url.trim_end_matches('/'),
            test_case_id
        );

        let resp = self
            .client
            .patch(&url)
            .bearer_auth(&self.settings.token)
            .json(update)
            .send()
            .await
            .context("Failed to reach Squash TM")?;

        resp.error_for_status()
            .context("Squash TM rejected the execution update")?;
        Ok(())
    }

    async fn upload_screenshot(&self, test_case_id: &str, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read screenshot: {}", path.display()))?;

        let upload = AttachmentUpload {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "failure.png".to_string()),
            content: BASE64.encode(bytes),
            content_type: "image/png",
        };

        let url = format!(
            "{}/iterations/{}/attachments",
            self.settings.base_url.trim_end_matches('/'),
            test_case_id
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.settings.token)
            .json(&upload)
            .send()
            .await
            .context("Failed to reach Squash TM")?;

        resp.error_for_status()
            .context("Squash TM rejected the attachment")?;
        Ok(())
    }
}

fn execution_status(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Passed => "SUCCESS",
        TestStatus::Failed => "FAILURE",
        TestStatus::Skipped => "BLOCKED",
    }
}

/// Textual comment shown in the Squash TM execution log
fn build_comment(result: &FlatResult, iteration: Option<IterationInfo<'_>>) -> String {
    let mut comment = format!("Automated E2E result: {:?}", result.status);

    if let Some(info) = iteration {
        comment.push_str(&format!("\nIteration: {}", info.index));
        if let Some(data) = info.data {
            comment.push_str(&format!("\nData: {}", data));
        }
    }

    comment.push_str(&format!("\nDuration: {}ms", result.duration_ms));
    if result.retry_count > 0 {
        comment.push_str(&format!("\nRetries: {}", result.retry_count));
    }
    if let Some(error) = &result.error {
        comment.push_str(&format!("\nError: {}", error));
    }

    comment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(name: &str, status: TestStatus) -> FlatResult {
        FlatResult {
            name: name.to_string(),
            status,
            duration_ms: 1234,
            error: None,
            retry_count: 0,
            screenshot_path: None,
        }
    }

    #[test]
    fn test_extract_squash_id() {
        assert_eq!(
            SquashClient::extract_squash_id("Some test @squashTM:CAMP-4-TC-101"),
            Some("CAMP-4-TC-101".to_string())
        );
        assert_eq!(SquashClient::extract_squash_id("No marker here"), None);
    }

    #[test]
    fn test_extract_test_case_number() {
        assert_eq!(
            SquashClient::extract_test_case_number("CAMP-4-TC-101"),
            Some("101".to_string())
        );
        assert_eq!(SquashClient::extract_test_case_number("CAMP-4"), None);
    }

    #[tokio::test]
    async fn test_disabled_integration_skips_without_remote_calls() {
        // base_url is empty: any attempted request would error loudly,
        // so a clean false proves the early return
        let settings = Settings::default();
        assert!(!settings.squash.enabled);
        let client = SquashClient::new(&settings);
        let logger = RunLogger::console_only();

        let result = flat("Login @squashTM:CAMP-1-TC-7", TestStatus::Passed);
        assert!(!client.report_result(&result, None, &logger).await);
    }

    #[tokio::test]
    async fn test_unlinked_test_is_not_an_error() {
        let mut settings = Settings::default();
        settings.squash.enabled = true;
        settings.squash.base_url = "http://localhost:1".to_string();
        let client = SquashClient::new(&settings);
        let logger = RunLogger::console_only();

        let result = flat("Test without marker", TestStatus::Passed);
        assert!(!client.report_result(&result, None, &logger).await);
    }

    #[test]
    fn test_execution_status_mapping() {
        assert_eq!(execution_status(TestStatus::Passed), "SUCCESS");
        assert_eq!(execution_status(TestStatus::Failed), "FAILURE");
        assert_eq!(execution_status(TestStatus::Skipped), "BLOCKED");
    }

    #[test]
    fn test_comment_carries_iteration_and_duration() {
        let data = serde_json::json!({"username": "a"});
        let mut result = flat("t", TestStatus::Failed);
        result.error = Some("boom".to_string());
        result.retry_count = 2;

        let comment = build_comment(
            &result,
            Some(IterationInfo {
                index: 3,
                data: Some(&data),
            }),
        );
        assert!(comment.contains("Iteration: 3"));
        assert!(comment.contains("username"));
        assert!(comment.contains("Duration: 1234ms"));
        assert!(comment.contains("Retries: 2"));
        assert!(comment.contains("Error: boom"));
    }
}
