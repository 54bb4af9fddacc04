//! Terminal stand-ins for the browser surfaces, used by the CLI.

use crate::domain::notification::{Notification, NotificationId};
use crate::domain::ports::{Clipboard, FormSurface, LinkOpener, Navigator, ToastSurface};
use crate::error::{CheckoutError, Result};
use std::io::Write;
use url::Url;

/// Prints toasts and navigation to stderr; the form state goes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSurface;

impl ConsoleSurface {
    pub fn new() -> Self {
        Self
    }
}

impl ToastSurface for ConsoleSurface {
    fn present(&self, notification: &Notification) {
        eprintln!("[{}] {}", notification.title, notification.message);
    }

    fn remove(&self, id: NotificationId) {
        tracing::trace!(id, "toast replaced");
    }

    fn dismiss(&self, id: NotificationId) {
        tracing::trace!(id, "toast dismissed");
    }
}

impl Navigator for ConsoleSurface {
    fn navigate(&self, url: &Url) {
        eprintln!("-> navigate to {url}");
    }

    fn reload(&self) {
        eprintln!("-> reload page");
    }

    fn close(&self) {
        eprintln!("-> close window");
    }
}

impl FormSurface for ConsoleSurface {
    fn set_interactive(&self, interactive: bool) {
        tracing::debug!(interactive, "form state changed");
    }
}

/// "Opens" links by printing them on stdout for another program to pick up.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintingOpener;

impl LinkOpener for PrintingOpener {
    fn open(&self, url: &Url) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{url}")?;
        Ok(())
    }
}

/// A terminal has no clipboard to write to.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn write_text(&self, _text: &str) -> Result<()> {
        Err(CheckoutError::Bridge("clipboard not available".to_string()))
    }
}
