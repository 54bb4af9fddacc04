use super::notifier::NotificationPresenter;
use crate::config::{CheckoutSettings, PageContext};
use crate::domain::ports::{NavigatorRef, PaymentGatewayRef};
use crate::domain::status::TransactionStatus;
use crate::error::Result;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Sleep};

pub const STILL_PROCESSING_MESSAGE: &str =
    "Payment is still being processed. Please complete the prompt on your phone.";
pub const STATUS_CHECK_FAILED_MESSAGE: &str =
    "Unable to check payment status. We will try again shortly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Result of a single status check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStep {
    /// A terminal status was seen and the page was reloaded.
    Finished(TransactionStatus),
    Pending(TransactionStatus),
    Failed,
}

/// Re-checks a pending transaction until the server reports a terminal state.
pub struct StatusPoller {
    gateway: PaymentGatewayRef,
    navigator: NavigatorRef,
    notifier: NotificationPresenter,
    context: Arc<PageContext>,
    interval: Duration,
    resume_delay: Duration,
}

impl StatusPoller {
    pub fn new(
        gateway: PaymentGatewayRef,
        navigator: NavigatorRef,
        notifier: NotificationPresenter,
        context: Arc<PageContext>,
        settings: &CheckoutSettings,
    ) -> Self {
        Self {
            gateway,
            navigator,
            notifier,
            context,
            interval: settings.poll_interval,
            resume_delay: settings.resume_check_delay,
        }
    }

    /// Spawns the polling task when the page was rendered for a pending
    /// transaction. The returned handle stops the task when cancelled or
    /// dropped.
    pub fn start(self, visibility: watch::Receiver<Visibility>) -> Option<PollHandle> {
        if self.context.payment_status != TransactionStatus::Pending {
            tracing::debug!(status = %self.context.payment_status, "not polling a settled payment");
            return None;
        }
        tracing::info!(
            transaction_id = %self.context.transaction_id,
            interval_secs = self.interval.as_secs(),
            "starting status polling"
        );
        let task = tokio::spawn(self.run(visibility));
        Some(PollHandle { task: Some(task) })
    }

    /// Asks the server for the transaction status and reacts to it.
    pub async fn check_status(&self) -> PollStep {
        match self.fetch().await {
            Ok(status) if status.is_terminal() => {
                tracing::info!(%status, "payment settled, reloading");
                self.navigator.reload();
                PollStep::Finished(status)
            }
            Ok(status) => {
                tracing::debug!(%status, "payment still pending");
                self.notifier.info(STILL_PROCESSING_MESSAGE);
                PollStep::Pending(status)
            }
            Err(e) => {
                tracing::warn!("status check failed: {}", e);
                self.notifier.error(STATUS_CHECK_FAILED_MESSAGE);
                PollStep::Failed
            }
        }
    }

    async fn fetch(&self) -> Result<TransactionStatus> {
        let response = self
            .gateway
            .fetch_status(&self.context.transaction_id, &self.context.token)
            .await?;
        Ok(response.status)
    }

    async fn run(self, mut visibility: watch::Receiver<Visibility>) -> TransactionStatus {
        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        let mut resume_check: Option<Pin<Box<Sleep>>> = None;
        let mut visibility_open = true;
        let mut last_seen = *visibility.borrow();

        loop {
            let step = tokio::select! {
                _ = ticker.tick() => {
                    let visible = *visibility.borrow() == Visibility::Visible;
                    if visible {
                        Some(self.check_status().await)
                    } else {
                        None
                    }
                }
                changed = visibility.changed(), if visibility_open => {
                    match changed {
                        Ok(()) => {
                            let now = *visibility.borrow_and_update();
                            if last_seen == Visibility::Hidden && now == Visibility::Visible {
                                resume_check = Some(Box::pin(tokio::time::sleep(self.resume_delay)));
                            }
                            last_seen = now;
                        }
                        Err(_) => visibility_open = false,
                    }
                    None
                }
                _ = wait_for(&mut resume_check) => {
                    resume_check = None;
                    Some(self.check_status().await)
                }
            };

            if let Some(PollStep::Finished(status)) = step {
                return status;
            }
        }
    }
}

/// Resolves when the pending resume timer fires; never resolves without one.
fn wait_for(timer: &mut Option<Pin<Box<Sleep>>>) -> impl Future<Output = ()> + '_ {
    async move {
        match timer {
            Some(sleep) => sleep.as_mut().await,
            None => std::future::pending().await,
        }
    }
}

/// Handle to a running poller.
pub struct PollHandle {
    task: Option<JoinHandle<TransactionStatus>>,
}

impl PollHandle {
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("status polling cancelled");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }

    /// Waits for the poller to observe a terminal status. Returns `None` when
    /// the poller was cancelled.
    pub async fn finished(mut self) -> Option<TransactionStatus> {
        let task = self.task.take()?;
        task.await.ok()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
