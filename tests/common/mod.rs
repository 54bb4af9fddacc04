#![allow(dead_code)]

use bematore_checkout::application::checkout::{CheckoutController, CheckoutPorts};
use bematore_checkout::application::completion::{CompletionBridge, HostCapabilities};
use bematore_checkout::config::{CheckoutSettings, PageContext};
use bematore_checkout::domain::status::TransactionStatus;
use bematore_checkout::infrastructure::in_memory::{InMemoryGateway, RecordingHost, RecordingSurface};
use rand::Rng;
use std::sync::Arc;
use url::Url;

pub const TRANSACTION_ID: &str = "TX-100";
pub const TOKEN: &str = "bearer-token";
pub const CSRF_TOKEN: &str = "csrf-123";

pub fn context(status: TransactionStatus) -> PageContext {
    let mut context = PageContext::new(Url::parse("http://localhost:8000").unwrap(), TRANSACTION_ID);
    context.token = TOKEN.to_string();
    context.payment_status = status;
    context.csrf_token = Some(CSRF_TOKEN.to_string());
    context
}

/// A checkout page wired to in-memory adapters.
pub struct Harness {
    pub gateway: Arc<InMemoryGateway>,
    pub surface: Arc<RecordingSurface>,
    pub host: Arc<RecordingHost>,
    pub checkout: CheckoutController,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_gateway(InMemoryGateway::new(), TransactionStatus::Pending)
    }

    pub fn gated() -> Self {
        Self::with_gateway(InMemoryGateway::gated(), TransactionStatus::Pending)
    }

    pub fn with_gateway(gateway: InMemoryGateway, status: TransactionStatus) -> Self {
        let gateway = Arc::new(gateway);
        let surface = Arc::new(RecordingSurface::new());
        let host = Arc::new(RecordingHost::new());

        let bridge = CompletionBridge::resolve(HostCapabilities {
            native: None,
            message_channel: Some(host.clone()),
            deep_link: Some(host.clone()),
            navigator: surface.clone(),
        });
        let checkout = CheckoutController::new(
            context(status),
            CheckoutSettings::default(),
            CheckoutPorts {
                gateway: gateway.clone(),
                toasts: surface.clone(),
                navigator: surface.clone(),
                form: surface.clone(),
            },
            bridge,
        );

        Self {
            gateway,
            surface,
            host,
            checkout,
        }
    }
}

/// `len` random decimal digits.
pub fn random_digits(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}
