use crate::domain::notification::{Notification, NotificationId, NotificationKind};
use crate::domain::ports::ToastSurfaceRef;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

struct ActiveToast {
    id: NotificationId,
    dismiss_timer: Option<JoinHandle<()>>,
}

/// Shows at most one toast at a time and dismisses it automatically.
///
/// Cloning is cheap; clones share the visible toast.
#[derive(Clone)]
pub struct NotificationPresenter {
    surface: ToastSurfaceRef,
    active: Arc<Mutex<Option<ActiveToast>>>,
    next_id: Arc<AtomicU64>,
    lifetime: Duration,
}

impl NotificationPresenter {
    pub fn new(surface: ToastSurfaceRef, lifetime: Duration) -> Self {
        Self {
            surface,
            active: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(1)),
            lifetime,
        }
    }

    /// Replaces any visible toast with a new one.
    ///
    /// The auto-dismiss timer runs on the current Tokio runtime. Outside one,
    /// the toast stays until it is replaced.
    pub fn show(&self, message: impl Into<String>, kind: NotificationKind) -> NotificationId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let notification = Notification {
            id,
            kind,
            title: kind.title().to_string(),
            message: message.into(),
        };
        tracing::debug!(id, ?kind, message = %notification.message, "showing notification");

        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = active.take() {
            if let Some(timer) = previous.dismiss_timer {
                timer.abort();
            }
            self.surface.remove(previous.id);
        }

        self.surface.present(&notification);

        let surface = self.surface.clone();
        let slot = self.active.clone();
        let lifetime = self.lifetime;
        let dismiss_timer = match Handle::try_current() {
            Ok(runtime) => Some(runtime.spawn(async move {
                tokio::time::sleep(lifetime).await;
                let mut active = slot.lock().unwrap_or_else(|e| e.into_inner());
                if active.as_ref().is_some_and(|toast| toast.id == id) {
                    active.take();
                    surface.dismiss(id);
                }
            })),
            Err(_) => {
                tracing::warn!(id, "no async runtime, notification will not auto-dismiss");
                None
            }
        };

        *active = Some(ActiveToast { id, dismiss_timer });
        id
    }

    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.show(message, NotificationKind::Error)
    }

    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.show(message, NotificationKind::Success)
    }

    pub fn warning(&self, message: impl Into<String>) -> NotificationId {
        self.show(message, NotificationKind::Warning)
    }

    pub fn info(&self, message: impl Into<String>) -> NotificationId {
        self.show(message, NotificationKind::Info)
    }

    /// Id of the toast currently on screen.
    pub fn visible(&self) -> Option<NotificationId> {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|toast| toast.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::{RecordingSurface, SurfaceEvent};

    #[test]
    fn test_show_outside_runtime_keeps_toast() {
        let surface = Arc::new(RecordingSurface::new());
        let presenter = NotificationPresenter::new(surface.clone(), Duration::from_secs(5));

        let first = presenter.error("Payment failed");
        assert_eq!(presenter.visible(), Some(first));

        let second = presenter.info("Retrying");
        assert_eq!(presenter.visible(), Some(second));
        assert_eq!(surface.visible_toasts().len(), 1);
        assert_eq!(surface.visible_toasts()[0].message, "Retrying");
    }

    #[tokio::test(start_paused = true)]
    async fn test_toast_auto_dismisses() {
        let surface = Arc::new(RecordingSurface::new());
        let presenter = NotificationPresenter::new(surface.clone(), Duration::from_secs(5));

        let id = presenter.success("Payment completed");
        assert_eq!(presenter.visible(), Some(id));
        assert_eq!(surface.visible_toasts().len(), 1);
        assert_eq!(surface.visible_toasts()[0].title, "Success");

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(presenter.visible(), Some(id));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(presenter.visible(), None);
        assert!(surface.visible_toasts().is_empty());
        assert!(surface.events().contains(&SurfaceEvent::ToastDismissed(id)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_toast_replaces_previous() {
        let surface = Arc::new(RecordingSurface::new());
        let presenter = NotificationPresenter::new(surface.clone(), Duration::from_secs(5));

        let first = presenter.error("Network error");
        tokio::time::sleep(Duration::from_secs(3)).await;
        let second = presenter.info("Still processing");

        let visible = surface.visible_toasts();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, second);
        assert_eq!(visible[0].title, "Information");
        assert!(surface.events().contains(&SurfaceEvent::ToastRemoved(first)));

        // The first toast's timer must not take down the second one.
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(presenter.visible(), Some(second));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(presenter.visible(), None);
    }
}
