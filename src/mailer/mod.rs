//! Email reporter
//!
//! Renders the HTML run report and dispatches it over SMTP. Transport
//! failures are observability concerns: they are logged and surfaced as a
//! boolean, never as an error that could fail the test run. Callers are
//! expected to `verify()` reachability before `send()`.

pub mod template;

use crate::logger::RunLogger;
use crate::report::{FlatResult, RunSummary};
use crate::settings::{EmailSettings, Settings};
use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::path::{Path, PathBuf};

/// Fixed relative path of the optional template override
const TEMPLATE_PATH: &str = "templates/email-report.html";

pub struct EmailReporter {
    settings: EmailSettings,
    build_url: Option<String>,
    template_path: PathBuf,
}

impl EmailReporter {
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.email.clone(),
            build_url: settings.build_url.clone(),
            template_path: PathBuf::from(TEMPLATE_PATH),
        }
    }

    /// Override the template location (used by tests and the CLI flag)
    pub fn with_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.template_path = path.into();
        self
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let builder = match (&self.settings.username, &self.settings.password) {
            (Some(user), Some(pass)) => {
                AsyncSmtpTransport::<Tokio1Executor>::relay(&self.settings.smtp_host)
                    .context("Failed to configure SMTP relay")?
                    .credentials(Credentials::new(user.clone(), pass.clone()))
            }
            // No credentials: plain transport, e.g. a local relay
            _ => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
                &self.settings.smtp_host,
            ),
        };
        Ok(builder.port(self.settings.smtp_port).build())
    }

    /// Check SMTP reachability without sending anything
    pub async fn verify(&self, logger: &RunLogger) -> bool {
        let transport = match self.transport() {
            Ok(t) => t,
            Err(e) => {
                logger.warn(&format!("SMTP transport configuration failed: {:#}", e));
                return false;
            }
        };

        match transport.test_connection().await {
            Ok(true) => {
                logger.info(&format!(
                    "SMTP server reachable at {}:{}",
                    self.settings.smtp_host, self.settings.smtp_port
                ));
                true
            }
            Ok(false) => {
                logger.warn("SMTP server refused the connection test");
                false
            }
            Err(e) => {
                logger.warn(&format!("SMTP connection test failed: {}", e));
                false
            }
        }
    }

    /// Render and dispatch the report. Returns whether the mail went out.
    pub async fn send(
        &self,
        summary: &RunSummary,
        results: &[FlatResult],
        attachment_paths: &[PathBuf],
        logger: &RunLogger,
    ) -> bool {
        if !self.settings.enabled {
            logger.info("Email reporting disabled, skipping");
            return false;
        }
        if self.settings.to.is_empty() {
            logger.warn("Email reporting enabled but no recipients configured");
            return false;
        }

        let html = template::render(
            &template::load_template(&self.template_path),
            summary,
            results,
            self.build_url.as_deref(),
        );

        let message = match self.build_message(summary, html, attachment_paths, logger) {
            Ok(m) => m,
            Err(e) => {
                logger.warn(&format!("Failed to build report email: {:#}", e));
                return false;
            }
        };

        let transport = match self.transport() {
            Ok(t) => t,
            Err(e) => {
                logger.warn(&format!("SMTP transport configuration failed: {:#}", e));
                return false;
            }
        };

        match transport.send(message).await {
            Ok(_) => {
                logger.info(&format!(
                    "Report email sent to {}",
                    self.settings.to.join(", ")
                ));
                true
            }
            Err(e) => {
                logger.warn(&format!("Failed to send report email: {}", e));
                false
            }
        }
    }

    fn build_message(
        &self,
        summary: &RunSummary,
        html: String,
        attachment_paths: &[PathBuf],
        logger: &RunLogger,
    ) -> Result<Message> {
        let from: Mailbox = self
            .settings
            .from
            .parse()
            .with_context(|| format!("Invalid sender address: {}", self.settings.from))?;

        let mut builder = Message::builder()
            .from(from)
            .subject(template::subject(summary));
        for recipient in &self.settings.to {
            let to: Mailbox = recipient
                .parse()
                .with_context(|| format!("Invalid recipient address: {}", recipient))?;
            builder = builder.to(to);
        }

        let mut body = MultiPart::mixed().singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(html),
        );

        for part in existing_attachments(attachment_paths, logger) {
            body = body.singlepart(part);
        }

        builder.multipart(body).context("Failed to assemble email")
    }
}

/// Read attachment files, silently filtering out anything missing
fn existing_attachments(paths: &[PathBuf], logger: &RunLogger) -> Vec<SinglePart> {
    let mut parts = Vec::new();
    for path in paths {
        if !path.is_file() {
            logger.debug(&format!("Skipping missing attachment: {}", path.display()));
            continue;
        }
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                logger.debug(&format!(
                    "Skipping unreadable attachment {}: {}",
                    path.display(),
                    e
                ));
                continue;
            }
        };
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "attachment".to_string());
        let content_type = content_type_for(path);
        parts.push(Attachment::new(filename).body(Body::new(bytes), content_type));
    }
    parts
}

fn content_type_for(path: &Path) -> ContentType {
    let mime = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("html") => "text/html",
        Some("txt") | Some("log") => "text/plain",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    };
    ContentType::parse(mime).unwrap_or(ContentType::TEXT_PLAIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::TestStatus;

    fn summary() -> RunSummary {
        RunSummary {
            total: 2,
            passed: 1,
            failed: 1,
            skipped: 0,
            duration_ms: 30_000,
            start_time: None,
            end_time: None,
            environment: "local".to_string(),
            project_name: "Suite".to_string(),
        }
    }

    #[tokio::test]
    async fn test_disabled_reporter_returns_false_without_sending() {
        let settings = Settings::default();
        assert!(!settings.email.enabled);
        let reporter = EmailReporter::new(&settings);
        let logger = RunLogger::console_only();
        let sent = reporter.send(&summary(), &[], &[], &logger).await;
        assert!(!sent);
    }

    #[tokio::test]
    async fn test_enabled_without_recipients_returns_false() {
        let mut settings = Settings::default();
        settings.email.enabled = true;
        let reporter = EmailReporter::new(&settings);
        let logger = RunLogger::console_only();
        assert!(!reporter.send(&summary(), &[], &[], &logger).await);
    }

    #[test]
    fn test_missing_attachments_are_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("shot.png");
        std::fs::write(&real, b"png-bytes").unwrap();
        let missing = dir.path().join("gone.png");

        let logger = RunLogger::console_only();
        let parts = existing_attachments(&[real, missing], &logger);
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn test_message_builds_with_results_table() {
        let mut settings = Settings::default();
        settings.email.enabled = true;
        settings.email.to = vec!["qa@example.com".to_string()];
        let reporter = EmailReporter::new(&settings);
        let logger = RunLogger::console_only();

        let results = vec![FlatResult {
            name: "Login > happy path".to_string(),
            status: TestStatus::Passed,
            duration_ms: 1200,
            error: None,
            retry_count: 0,
            screenshot_path: None,
        }];
        let html = template::render(
            &template::load_template(Path::new("/nonexistent")),
            &summary(),
            &results,
            None,
        );
        let message = reporter.build_message(&summary(), html, &[], &logger);
        assert!(message.is_ok());
    }
}
