use serde::{Deserialize, Serialize};

/// Serialized execution report as emitted by the browser-test runner.
/// Every field is defaulted so sparse or trimmed reports still parse.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunReport {
    pub config: ReportConfig,
    pub suites: Vec<Suite>,
    pub stats: RunStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportConfig {
    pub projects: Vec<ProjectConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RunStats {
    /// Wall-clock duration of the whole run in milliseconds
    pub duration: f64,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// A named grouping of specs and/or nested suites
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Suite {
    pub title: String,
    pub suites: Vec<Suite>,
    pub specs: Vec<Spec>,
}

/// One test case definition within a suite
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Spec {
    pub title: String,
    pub tests: Vec<TestEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestEntry {
    pub results: Vec<Attempt>,
}

/// One execution of a spec; multiple attempts occur under retry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attempt {
    pub status: String,
    /// Attempt duration in milliseconds
    pub duration: f64,
    pub error: Option<AttemptError>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttemptError {
    pub message: Option<String>,
}

/// Artifact recorded by the runner for one attempt (screenshots, traces)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attachment {
    pub name: String,
    pub content_type: String,
    pub path: Option<String>,
}

/// Post-processing outcome of one spec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

impl TestStatus {
    /// Map a raw runner status string. Anything that is neither a pass
    /// nor a skip (failed, timedOut, interrupted) counts as a failure.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "passed" => TestStatus::Passed,
            "skipped" => TestStatus::Skipped,
            _ => TestStatus::Failed,
        }
    }
}

/// Suite-structure-free representation of one spec's outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatResult {
    pub name: String,
    pub status: TestStatus,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub retry_count: u32,
    /// Failure screenshot captured by the runner, when one exists
    pub screenshot_path: Option<String>,
}

/// Aggregate counts and time window for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub duration_ms: u64,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub environment: String,
    pub project_name: String,
}
