use crate::domain::completion::CompletionPayload;
use crate::domain::form::FormData;
use crate::domain::notification::{Notification, NotificationId};
use crate::domain::ports::{
    Clipboard, FormSurface, LinkOpener, MessageChannel, NativeBridge, Navigator, PaymentGateway,
    ResponseBody, SubmissionResponse, ToastSurface,
};
use crate::domain::status::{StatusResponse, TransactionStatus};
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;
use tokio::sync::Semaphore;
use url::Url;

fn transport_failure(message: &str) -> CheckoutError {
    CheckoutError::Io(io::Error::new(io::ErrorKind::ConnectionRefused, message.to_string()))
}

/// One scripted reply of [`InMemoryGateway::submit`].
#[derive(Debug, Clone)]
pub enum ScriptedSubmission {
    Redirect(Url),
    Body(ResponseBody),
    NetworkFailure(String),
}

/// One scripted reply of [`InMemoryGateway::fetch_status`].
#[derive(Debug, Clone)]
pub enum ScriptedStatus {
    Status(TransactionStatus),
    NetworkFailure(String),
}

/// A payment server living in memory.
///
/// Replies are consumed in order; once a script runs dry, submissions answer
/// with an empty `200` body and status checks with `pending`. Ideal for tests
/// and offline runs of the CLI.
#[derive(Default)]
pub struct InMemoryGateway {
    submissions: Mutex<VecDeque<ScriptedSubmission>>,
    statuses: Mutex<VecDeque<ScriptedStatus>>,
    submit_calls: Mutex<Vec<(String, FormData)>>,
    status_calls: Mutex<Vec<(String, String)>>,
    gate: Option<Semaphore>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submissions block until [`InMemoryGateway::release`] is called, which
    /// keeps a request in flight for as long as a test needs.
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn release(&self, submissions: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(submissions);
        }
    }

    pub fn push_submission(&self, reply: ScriptedSubmission) {
        lock(&self.submissions).push_back(reply);
    }

    pub fn push_status(&self, reply: ScriptedStatus) {
        lock(&self.statuses).push_back(reply);
    }

    pub fn submit_calls(&self) -> Vec<(String, FormData)> {
        lock(&self.submit_calls).clone()
    }

    pub fn status_calls(&self) -> Vec<(String, String)> {
        lock(&self.status_calls).clone()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    async fn submit(&self, action: &str, form: &FormData) -> Result<SubmissionResponse> {
        lock(&self.submit_calls).push((action.to_string(), form.clone()));

        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| transport_failure("gateway closed"))?;
            permit.forget();
        }

        let reply = lock(&self.submissions).pop_front();
        match reply {
            Some(ScriptedSubmission::Redirect(url)) => Ok(SubmissionResponse::Redirected(url)),
            Some(ScriptedSubmission::Body(body)) => Ok(SubmissionResponse::Body(body)),
            Some(ScriptedSubmission::NetworkFailure(message)) => Err(transport_failure(&message)),
            None => Ok(SubmissionResponse::Body(ResponseBody {
                status: 200,
                text: String::new(),
            })),
        }
    }

    async fn fetch_status(&self, transaction_id: &str, token: &str) -> Result<StatusResponse> {
        lock(&self.status_calls).push((transaction_id.to_string(), token.to_string()));

        let reply = lock(&self.statuses).pop_front();
        match reply {
            Some(ScriptedStatus::Status(status)) => Ok(StatusResponse {
                transaction_id: Some(transaction_id.to_string()),
                ..StatusResponse::new(status)
            }),
            Some(ScriptedStatus::NetworkFailure(message)) => Err(transport_failure(&message)),
            None => Ok(StatusResponse::new(TransactionStatus::Pending)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    ToastPresented(Notification),
    ToastRemoved(NotificationId),
    ToastDismissed(NotificationId),
    Navigated(Url),
    Reloaded,
    Closed,
    FormInteractive(bool),
}

/// Records everything the controllers do to the page.
#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
    toasts: Mutex<Vec<Notification>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        lock(&self.events).clone()
    }

    pub fn visible_toasts(&self) -> Vec<Notification> {
        lock(&self.toasts).clone()
    }

    /// Every toast presented so far, visible or not.
    pub fn presented(&self) -> Vec<Notification> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SurfaceEvent::ToastPresented(notification) => Some(notification),
                _ => None,
            })
            .collect()
    }

    pub fn reload_count(&self) -> usize {
        self.count(|event| matches!(event, SurfaceEvent::Reloaded))
    }

    pub fn navigations(&self) -> Vec<Url> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SurfaceEvent::Navigated(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    /// The form is interactive unless the last toggle disabled it.
    pub fn is_form_interactive(&self) -> bool {
        lock(&self.events)
            .iter()
            .rev()
            .find_map(|event| match event {
                SurfaceEvent::FormInteractive(interactive) => Some(*interactive),
                _ => None,
            })
            .unwrap_or(true)
    }

    fn count(&self, pred: impl Fn(&SurfaceEvent) -> bool) -> usize {
        lock(&self.events).iter().filter(|event| pred(*event)).count()
    }

    fn record(&self, event: SurfaceEvent) {
        lock(&self.events).push(event);
    }

    fn drop_toast(&self, id: NotificationId) {
        lock(&self.toasts).retain(|toast| toast.id != id);
    }
}

impl ToastSurface for RecordingSurface {
    fn present(&self, notification: &Notification) {
        lock(&self.toasts).push(notification.clone());
        self.record(SurfaceEvent::ToastPresented(notification.clone()));
    }

    fn remove(&self, id: NotificationId) {
        self.drop_toast(id);
        self.record(SurfaceEvent::ToastRemoved(id));
    }

    fn dismiss(&self, id: NotificationId) {
        self.drop_toast(id);
        self.record(SurfaceEvent::ToastDismissed(id));
    }
}

impl Navigator for RecordingSurface {
    fn navigate(&self, url: &Url) {
        self.record(SurfaceEvent::Navigated(url.clone()));
    }

    fn reload(&self) {
        self.record(SurfaceEvent::Reloaded);
    }

    fn close(&self) {
        self.record(SurfaceEvent::Closed);
    }
}

impl FormSurface for RecordingSurface {
    fn set_interactive(&self, interactive: bool) {
        self.record(SurfaceEvent::FormInteractive(interactive));
    }
}

/// Host-side capabilities that record what they receive and can be told to
/// fail.
#[derive(Default)]
pub struct RecordingHost {
    native_calls: Mutex<Vec<CompletionPayload>>,
    messages: Mutex<Vec<String>>,
    opened: Mutex<Vec<Url>>,
    clipboard: Mutex<Option<String>>,
    failing_opener: bool,
    failing_clipboard: bool,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_opener(mut self) -> Self {
        self.failing_opener = true;
        self
    }

    pub fn with_failing_clipboard(mut self) -> Self {
        self.failing_clipboard = true;
        self
    }

    pub fn native_calls(&self) -> Vec<CompletionPayload> {
        lock(&self.native_calls).clone()
    }

    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }

    pub fn opened(&self) -> Vec<Url> {
        lock(&self.opened).clone()
    }

    pub fn clipboard(&self) -> Option<String> {
        lock(&self.clipboard).clone()
    }
}

impl NativeBridge for RecordingHost {
    fn payment_complete(&self, payload: &CompletionPayload) -> Result<()> {
        lock(&self.native_calls).push(payload.clone());
        Ok(())
    }
}

impl MessageChannel for RecordingHost {
    fn post_message(&self, message: &str) -> Result<()> {
        lock(&self.messages).push(message.to_string());
        Ok(())
    }
}

impl LinkOpener for RecordingHost {
    fn open(&self, url: &Url) -> Result<()> {
        if self.failing_opener {
            return Err(CheckoutError::Bridge(format!("no handler for {}", url.scheme())));
        }
        lock(&self.opened).push(url.clone());
        Ok(())
    }
}

impl Clipboard for RecordingHost {
    fn write_text(&self, text: &str) -> Result<()> {
        if self.failing_clipboard {
            return Err(CheckoutError::Bridge("clipboard unavailable".to_string()));
        }
        *lock(&self.clipboard) = Some(text.to_string());
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
