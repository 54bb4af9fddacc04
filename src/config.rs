use crate::domain::status::TransactionStatus;
use crate::error::{CheckoutError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_FORM_ACTION: &str = "/payments/form/";

/// Values the server renders into the checkout page before any client logic
/// runs. Built once and shared by every component.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageContext {
    pub base_url: Url,
    pub transaction_id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub payment_status: TransactionStatus,
    #[serde(default)]
    pub csrf_token: Option<String>,
    #[serde(default = "default_form_action")]
    pub form_action: String,
}

fn default_form_action() -> String {
    DEFAULT_FORM_ACTION.to_string()
}

impl PageContext {
    pub fn new(base_url: Url, transaction_id: impl Into<String>) -> Self {
        Self {
            base_url,
            transaction_id: transaction_id.into(),
            token: String::new(),
            payment_status: TransactionStatus::Pending,
            csrf_token: None,
            form_action: default_form_action(),
        }
    }

    /// Reads a context previously dumped as JSON by the page template.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let context: PageContext = serde_json::from_str(&raw)?;
        context.check()?;
        Ok(context)
    }

    pub fn check(&self) -> Result<()> {
        if self.transaction_id.trim().is_empty() {
            return Err(CheckoutError::Config(
                "transaction_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Timing knobs of the checkout page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSettings {
    pub poll_interval: Duration,
    /// Delay before the extra check fired when the page becomes visible again.
    pub resume_check_delay: Duration,
    pub toast_lifetime: Duration,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            resume_check_delay: Duration::from_secs(1),
            toast_lifetime: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_context_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"base_url":"http://localhost:8000","transaction_id":"TX-1","token":"t0k","payment_status":"pending"}}"#
        )
        .unwrap();

        let context = PageContext::from_json_file(file.path()).unwrap();
        assert_eq!(context.transaction_id, "TX-1");
        assert_eq!(context.token, "t0k");
        assert_eq!(context.payment_status, TransactionStatus::Pending);
        assert_eq!(context.form_action, DEFAULT_FORM_ACTION);
        assert_eq!(context.csrf_token, None);
    }

    #[test]
    fn test_context_requires_transaction_id() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"base_url":"http://localhost:8000","transaction_id":" "}}"#).unwrap();

        assert!(matches!(
            PageContext::from_json_file(file.path()),
            Err(CheckoutError::Config(_))
        ));
    }

    #[test]
    fn test_default_settings() {
        let settings = CheckoutSettings::default();
        assert_eq!(settings.poll_interval, Duration::from_secs(30));
        assert_eq!(settings.toast_lifetime, Duration::from_secs(5));
    }
}
