use crate::domain::completion::CompletionPayload;
use crate::domain::ports::{LinkOpener, MessageChannel, NativeBridge, NavigatorRef};
use crate::error::Result;
use std::fmt;
use std::sync::Arc;

/// Capabilities the host environment may expose to the status page.
pub struct HostCapabilities {
    pub native: Option<Arc<dyn NativeBridge>>,
    pub message_channel: Option<Arc<dyn MessageChannel>>,
    pub deep_link: Option<Arc<dyn LinkOpener>>,
    pub navigator: NavigatorRef,
}

impl HostCapabilities {
    /// Plain browsing surface with no host integration.
    pub fn browser(navigator: NavigatorRef) -> Self {
        Self {
            native: None,
            message_channel: None,
            deep_link: None,
            navigator,
        }
    }
}

/// How the "payment complete" signal reaches the host app. Resolved once at
/// startup from whatever the host offers.
#[derive(Clone)]
pub enum CompletionBridge {
    Native(Arc<dyn NativeBridge>),
    MessageChannel(Arc<dyn MessageChannel>),
    DeepLink(Arc<dyn LinkOpener>),
    CloseWindow(NavigatorRef),
}

impl CompletionBridge {
    /// Picks the first available capability, in order: native callback,
    /// message channel, deep link, closing the window.
    pub fn resolve(host: HostCapabilities) -> Self {
        let bridge = if let Some(native) = host.native {
            CompletionBridge::Native(native)
        } else if let Some(channel) = host.message_channel {
            CompletionBridge::MessageChannel(channel)
        } else if let Some(opener) = host.deep_link {
            CompletionBridge::DeepLink(opener)
        } else {
            CompletionBridge::CloseWindow(host.navigator)
        };
        tracing::debug!(bridge = %bridge, "resolved completion bridge");
        bridge
    }

    pub fn signal(&self, payload: &CompletionPayload) -> Result<()> {
        tracing::info!(
            transaction_id = %payload.transaction_id,
            status = %payload.status,
            bridge = %self,
            "signalling payment completion"
        );
        match self {
            CompletionBridge::Native(native) => native.payment_complete(payload),
            CompletionBridge::MessageChannel(channel) => channel.post_message(&payload.to_message()?),
            CompletionBridge::DeepLink(opener) => opener.open(&payload.to_deep_link()?),
            CompletionBridge::CloseWindow(navigator) => {
                navigator.close();
                Ok(())
            }
        }
    }
}

impl fmt::Display for CompletionBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompletionBridge::Native(_) => "native",
            CompletionBridge::MessageChannel(_) => "message-channel",
            CompletionBridge::DeepLink(_) => "deep-link",
            CompletionBridge::CloseWindow(_) => "close-window",
        };
        f.write_str(name)
    }
}
