use super::completion::CompletionPayload;
use super::form::FormData;
use super::notification::{Notification, NotificationId};
use super::status::StatusResponse;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// What the server did with a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResponse {
    /// The request was redirected; the browsing surface should follow.
    Redirected(Url),
    /// A body came back without a redirect.
    Body(ResponseBody),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBody {
    pub status: u16,
    pub text: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// POSTs the form to `action` with its CSRF token.
    async fn submit(&self, action: &str, form: &FormData) -> Result<SubmissionResponse>;
    /// Fetches the current status of a transaction using a bearer token.
    async fn fetch_status(&self, transaction_id: &str, token: &str) -> Result<StatusResponse>;
}

/// Topmost visual layer where toasts are rendered.
pub trait ToastSurface: Send + Sync {
    fn present(&self, notification: &Notification);
    /// Removes a toast immediately.
    fn remove(&self, id: NotificationId);
    /// Removes a toast with its exit transition.
    fn dismiss(&self, id: NotificationId);
}

/// The browsing surface hosting the checkout page.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &Url);
    fn reload(&self);
    fn close(&self);
}

/// Enables or disables the form inputs and submit button.
pub trait FormSurface: Send + Sync {
    fn set_interactive(&self, interactive: bool);
}

/// A host-app callback named `paymentComplete`.
pub trait NativeBridge: Send + Sync {
    fn payment_complete(&self, payload: &CompletionPayload) -> Result<()>;
}

/// A host-app message channel accepting JSON strings.
pub trait MessageChannel: Send + Sync {
    fn post_message(&self, message: &str) -> Result<()>;
}

/// Hands a URL (deep link or `mailto:`) to the operating system.
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &Url) -> Result<()>;
}

pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
pub type ToastSurfaceRef = Arc<dyn ToastSurface>;
pub type NavigatorRef = Arc<dyn Navigator>;
pub type FormSurfaceRef = Arc<dyn FormSurface>;
