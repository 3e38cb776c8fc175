//! Settings resolver
//!
//! Merges three layers into one immutable snapshot, lowest precedence first:
//! built-in defaults, an optional per-environment override file
//! (`config/<env>.yaml`), then process environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Test data serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    #[default]
    Json,
    Yaml,
}

impl DataFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(DataFormat::Json),
            "yaml" | "yml" => Some(DataFormat::Yaml),
            _ => None,
        }
    }

    /// Directory name and file extension under the test-data root
    pub fn dir_name(&self) -> &'static str {
        match self {
            DataFormat::Json => "json",
            DataFormat::Yaml => "yaml",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DataFormat::Json => "json",
            DataFormat::Yaml => "yaml",
        }
    }
}

/// SMTP / email reporter settings
#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub to: Vec<String>,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            username: None,
            password: None,
            from: "e2e-reports@localhost".to_string(),
            to: Vec::new(),
        }
    }
}

/// Squash TM integration settings
#[derive(Debug, Clone, Default)]
pub struct SquashSettings {
    pub enabled: bool,
    pub base_url: String,
    pub token: String,
    pub campaign_id: Option<String>,
}

/// Resolved configuration snapshot for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub environment: String,
    pub base_url: String,
    pub api_base_url: String,
    pub data_format: DataFormat,
    pub data_root: String,
    pub project_name: String,
    pub build_url: Option<String>,
    pub headless: bool,
    pub email: EmailSettings,
    pub squash: SquashSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: "local".to_string(),
            base_url: "http://localhost:3000".to_string(),
            api_base_url: "http://localhost:3000/api".to_string(),
            data_format: DataFormat::Json,
            data_root: "test-data".to_string(),
            project_name: "E2E Suite".to_string(),
            build_url: None,
            headless: true,
            email: EmailSettings::default(),
            squash: SquashSettings::default(),
        }
    }
}

/// Partial settings as authored in `config/<env>.yaml`; every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FileOverrides {
    base_url: Option<String>,
    api_base_url: Option<String>,
    data_format: Option<String>,
    data_root: Option<String>,
    project_name: Option<String>,
    build_url: Option<String>,
    headless: Option<bool>,
    email: Option<EmailOverrides>,
    squash: Option<SquashOverrides>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct EmailOverrides {
    enabled: Option<bool>,
    smtp_host: Option<String>,
    smtp_port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    from: Option<String>,
    to: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SquashOverrides {
    enabled: Option<bool>,
    base_url: Option<String>,
    token: Option<String>,
    campaign_id: Option<String>,
}

fn truthy(v: &str) -> bool {
    v == "true" || v == "1"
}

impl Settings {
    /// Resolve from the process environment and `config/<env>.yaml`
    pub fn resolve() -> Result<Self> {
        let env_map: HashMap<String, String> = std::env::vars().collect();
        Self::from_env_map(&env_map, Path::new("config"))
    }

    /// Resolve from an explicit variable map. Tests use this directly so
    /// they never mutate process-wide environment state.
    pub fn from_env_map(env: &HashMap<String, String>, config_dir: &Path) -> Result<Self> {
        let mut settings = Settings::default();

        if let Some(name) = env.get("E2E_ENV") {
            if !name.is_empty() {
                settings.environment = name.clone();
            }
        }

        // Layer 2: per-environment override file, absent is fine
        let override_path = config_dir.join(format!("{}.yaml", settings.environment));
        if override_path.is_file() {
            let content = std::fs::read_to_string(&override_path).with_context(|| {
                format!("Failed to read config file: {}", override_path.display())
            })?;
            let overrides: FileOverrides = serde_yaml::from_str(&content).with_context(|| {
                format!("Failed to parse config file: {}", override_path.display())
            })?;
            settings.apply_file_overrides(overrides)?;
        }

        // Layer 3: environment variables win over everything
        settings.apply_env(env)?;

        Ok(settings)
    }

    fn apply_file_overrides(&mut self, o: FileOverrides) -> Result<()> {
        if let Some(v) = o.base_url {
            self.base_url = v;
        }
        if let Some(v) = o.api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = o.data_format {
            self.data_format = DataFormat::parse(&v)
                .with_context(|| format!("Unknown data format in config: {}", v))?;
        }
        if let Some(v) = o.data_root {
            self.data_root = v;
        }
        if let Some(v) = o.project_name {
            self.project_name = v;
        }
        if let Some(v) = o.build_url {
            self.build_url = Some(v);
        }
        if let Some(v) = o.headless {
            self.headless = v;
        }
        if let Some(email) = o.email {
            if let Some(v) = email.enabled {
                self.email.enabled = v;
            }
            if let Some(v) = email.smtp_host {
                self.email.smtp_host = v;
            }
            if let Some(v) = email.smtp_port {
                self.email.smtp_port = v;
            }
            if email.username.is_some() {
                self.email.username = email.username;
            }
            if email.password.is_some() {
                self.email.password = email.password;
            }
            if let Some(v) = email.from {
                self.email.from = v;
            }
            if let Some(v) = email.to {
                self.email.to = v;
            }
        }
        if let Some(squash) = o.squash {
            if let Some(v) = squash.enabled {
                self.squash.enabled = v;
            }
            if let Some(v) = squash.base_url {
                self.squash.base_url = v;
            }
            if let Some(v) = squash.token {
                self.squash.token = v;
            }
            if squash.campaign_id.is_some() {
                self.squash.campaign_id = squash.campaign_id;
            }
        }
        Ok(())
    }

    fn apply_env(&mut self, env: &HashMap<String, String>) -> Result<()> {
        if let Some(v) = env.get("E2E_BASE_URL") {
            self.base_url = v.clone();
        }
        if let Some(v) = env.get("E2E_API_BASE_URL") {
            self.api_base_url = v.clone();
        }
        if let Some(v) = env.get("E2E_DATA_FORMAT") {
            self.data_format = DataFormat::parse(v)
                .with_context(|| format!("Unknown E2E_DATA_FORMAT value: {}", v))?;
        }
        if let Some(v) = env.get("E2E_DATA_ROOT") {
            self.data_root = v.clone();
        }
        if let Some(v) = env.get("E2E_PROJECT_NAME") {
            self.project_name = v.clone();
        }
        if let Some(v) = env.get("BUILD_URL") {
            self.build_url = Some(v.clone());
        }
        if let Some(v) = env.get("E2E_HEADLESS") {
            self.headless = truthy(v);
        }

        if let Some(v) = env.get("EMAIL_ENABLED") {
            self.email.enabled = truthy(v);
        }
        if let Some(v) = env.get("SMTP_HOST") {
            self.email.smtp_host = v.clone();
        }
        if let Some(v) = env.get("SMTP_PORT") {
            self.email.smtp_port = v
                .parse()
                .with_context(|| format!("Invalid SMTP_PORT value: {}", v))?;
        }
        if let Some(v) = env.get("SMTP_USERNAME") {
            self.email.username = Some(v.clone());
        }
        if let Some(v) = env.get("SMTP_PASSWORD") {
            self.email.password = Some(v.clone());
        }
        if let Some(v) = env.get("EMAIL_FROM") {
            self.email.from = v.clone();
        }
        if let Some(v) = env.get("EMAIL_TO") {
            self.email.to = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(v) = env.get("SQUASH_ENABLED") {
            self.squash.enabled = truthy(v);
        }
        if let Some(v) = env.get("SQUASH_BASE_URL") {
            self.squash.base_url = v.clone();
        }
        if let Some(v) = env.get("SQUASH_TOKEN") {
            self.squash.token = v.clone();
        }
        if let Some(v) = env.get("SQUASH_CAMPAIGN_ID") {
            self.squash.campaign_id = Some(v.clone());
        }

        Ok(())
    }
}
