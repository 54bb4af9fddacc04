use super::notifier::NotificationPresenter;
use crate::domain::ports::{Clipboard, LinkOpener};
use crate::error::Result;
use std::sync::Arc;
use url::Url;

pub const SUPPORT_EMAIL: &str = "support@bematore.com";
pub const SUPPORT_SUBJECT: &str = "Payment Support Request";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOutcome {
    Opened(Url),
    Copied(String),
    ShownInstructions(String),
}

/// Opens the support mail link, falling back to the clipboard and finally to
/// written instructions.
pub struct ContactLauncher {
    opener: Arc<dyn LinkOpener>,
    clipboard: Arc<dyn Clipboard>,
    notifier: NotificationPresenter,
    email: String,
    subject: String,
}

impl ContactLauncher {
    pub fn new(
        opener: Arc<dyn LinkOpener>,
        clipboard: Arc<dyn Clipboard>,
        notifier: NotificationPresenter,
    ) -> Self {
        Self {
            opener,
            clipboard,
            notifier,
            email: SUPPORT_EMAIL.to_string(),
            subject: SUPPORT_SUBJECT.to_string(),
        }
    }

    pub fn with_address(mut self, email: impl Into<String>, subject: impl Into<String>) -> Self {
        self.email = email.into();
        self.subject = subject.into();
        self
    }

    pub fn mailto(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("mailto:{}", self.email))?;
        url.query_pairs_mut().append_pair("subject", &self.subject);
        Ok(url)
    }

    pub fn launch(&self) -> ContactOutcome {
        let opened = self.mailto().and_then(|url| {
            self.opener.open(&url)?;
            Ok(url)
        });
        let e = match opened {
            Ok(url) => return ContactOutcome::Opened(url),
            Err(e) => e,
        };
        tracing::warn!("could not open mail client: {}", e);

        match self.clipboard.write_text(&self.email) {
            Ok(()) => {
                self.notifier
                    .success(format!("Email address {} copied to clipboard", self.email));
                ContactOutcome::Copied(self.email.clone())
            }
            Err(e) => {
                tracing::warn!("clipboard write failed: {}", e);
                let instructions = format!("Please email us at {}", self.email);
                self.notifier.warning(instructions.clone());
                ContactOutcome::ShownInstructions(instructions)
            }
        }
    }
}
