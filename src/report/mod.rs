pub mod flatten;
pub mod types;

use anyhow::{Context, Result};
use std::path::Path;

pub use flatten::{flatten, summarize};
pub use types::{FlatResult, RunReport, RunSummary, TestStatus};

/// Read and deserialize a runner-produced JSON report
pub fn load_report(path: &Path) -> Result<RunReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse report JSON: {}", path.display()))
}
