//! Login page object

use anyhow::{bail, Result};

use super::session::PageSession;

const PATH: &str = "/login";
const USERNAME_INPUT: &str = "#username";
const PASSWORD_INPUT: &str = "#password";
const SUBMIT_BUTTON: &str = "button[type='submit']";
const ERROR_BANNER: &str = "[data-test='error']";

pub struct LoginPage<'a> {
    session: &'a PageSession,
}

impl<'a> LoginPage<'a> {
    pub fn new(session: &'a PageSession) -> Self {
        Self { session }
    }

    pub async fn open(&self) -> Result<()> {
        self.session.goto(PATH).await
    }

    /// Fill the credential form and submit
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        self.session.fill(USERNAME_INPUT, username).await?;
        self.session.fill(PASSWORD_INPUT, password).await?;
        self.session.click(SUBMIT_BUTTON).await
    }

    /// Text of the error banner; empty when none is shown
    pub async fn error_message(&self) -> Result<String> {
        if !self.session.is_visible(ERROR_BANNER).await? {
            return Ok(String::new());
        }
        self.session.text_of(ERROR_BANNER).await
    }

    pub async fn assert_error_shown(&self, expected_fragment: &str) -> Result<()> {
        let message = self.error_message().await?;
        if !message.contains(expected_fragment) {
            bail!(
                "Expected error containing '{}' but banner said '{}'",
                expected_fragment,
                message
            );
        }
        Ok(())
    }
}
