//! Browser page session
//!
//! Owns the Playwright handles for one browser page and exposes the small
//! action surface the page objects are built from. Page objects borrow a
//! session instead of inheriting from a shared base.

use anyhow::{Context, Result};
use playwright::api::{Browser, BrowserContext, Page};
use playwright::Playwright;
use std::path::Path;

use crate::settings::Settings;

pub struct PageSession {
    #[allow(dead_code)]
    playwright: Playwright,
    #[allow(dead_code)]
    browser: Browser,
    #[allow(dead_code)]
    context: BrowserContext,
    page: Page,
    base_url: String,
}

impl PageSession {
    /// Launch a browser and open one page
    pub async fn launch(settings: &Settings) -> Result<Self> {
        let playwright = Playwright::initialize()
            .await
            .context("Failed to initialize Playwright")?;

        let browser = playwright
            .chromium()
            .launcher()
            .headless(settings.headless)
            .launch()
            .await
            .context("Failed to launch browser")?;

        let context = browser
            .context_builder()
            .build()
            .await
            .context("Failed to create browser context")?;
        let page = context.new_page().await.context("Failed to open page")?;

        Ok(Self {
            playwright,
            browser,
            context,
            page,
            base_url: settings.base_url.clone(),
        })
    }

    /// Navigate to an absolute URL, or a path resolved against the base URL
    pub async fn goto(&self, url: &str) -> Result<()> {
        let full_url = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{}", self.base_url.trim_end_matches('/'), url)
        };

        self.page
            .goto_builder(&full_url)
            .goto()
            .await
            .with_context(|| format!("Failed to navigate to {}", full_url))?;
        Ok(())
    }

    pub async fn click(&self, selector: &str) -> Result<()> {
        self.page
            .click_builder(selector)
            .click()
            .await
            .with_context(|| format!("Failed to click: {}", selector))
    }

    pub async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        self.page
            .fill_builder(selector, value)
            .fill()
            .await
            .with_context(|| format!("Failed to fill: {}", selector))
    }

    /// Input value, inner text or text content of the first match
    pub async fn text_of(&self, selector: &str) -> Result<String> {
        let js = "el => el.value || el.innerText || el.textContent || ''";
        self.page
            .evaluate_on_selector::<String, _>(selector, js, None::<String>)
            .await
            .with_context(|| format!("Failed to read text of: {}", selector))
    }

    pub async fn is_visible(&self, selector: &str) -> Result<bool> {
        Ok(self.page.query_selector(selector).await?.is_some())
    }

    /// Wait until the selector resolves; false on timeout, not an error
    pub async fn wait_visible(&self, selector: &str, timeout_ms: u64) -> Result<bool> {
        let result = self
            .page
            .wait_for_selector_builder(selector)
            .timeout(timeout_ms as f64)
            .wait_for_selector()
            .await;
        Ok(result.is_ok())
    }

    pub async fn screenshot(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.page
            .screenshot_builder()
            .path(path.to_path_buf())
            .screenshot()
            .await
            .context("Failed to capture screenshot")?;
        Ok(())
    }

    /// Dropping the handles shuts the browser down
    pub fn close(self) {}
}
