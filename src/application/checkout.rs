use super::completion::CompletionBridge;
use super::notifier::NotificationPresenter;
use super::poller::{PollHandle, StatusPoller, Visibility};
use super::selector::{PaymentMethodSelector, SubmitButton};
use super::submission::{SubmissionController, SubmitOutcome};
use crate::config::{CheckoutSettings, PageContext};
use crate::domain::completion::CompletionPayload;
use crate::domain::form::{CSRF_FIELD, FormData, PAYMENT_METHOD_FIELD, PHONE_FIELD, TRANSACTION_ID_FIELD};
use crate::domain::method::PaymentMethod;
use crate::domain::phone::{PhoneField, PhoneValidation};
use crate::domain::ports::{FormSurfaceRef, NavigatorRef, PaymentGatewayRef, ToastSurfaceRef};
use crate::domain::status::TransactionStatus;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// The surfaces and server the checkout page talks to.
pub struct CheckoutPorts {
    pub gateway: PaymentGatewayRef,
    pub toasts: ToastSurfaceRef,
    pub navigator: NavigatorRef,
    pub form: FormSurfaceRef,
}

/// One checkout page: method selection, the phone field, submission, status
/// polling and the completion signal, all sharing one [`PageContext`].
pub struct CheckoutController {
    context: Arc<PageContext>,
    settings: CheckoutSettings,
    gateway: PaymentGatewayRef,
    navigator: NavigatorRef,
    notifier: NotificationPresenter,
    selector: Mutex<PaymentMethodSelector>,
    phone: Mutex<PhoneField>,
    submission: SubmissionController,
    bridge: CompletionBridge,
}

impl CheckoutController {
    pub fn new(
        context: PageContext,
        settings: CheckoutSettings,
        ports: CheckoutPorts,
        bridge: CompletionBridge,
    ) -> Self {
        let notifier = NotificationPresenter::new(ports.toasts, settings.toast_lifetime);
        let submission = SubmissionController::new(
            ports.gateway.clone(),
            ports.navigator.clone(),
            ports.form,
            notifier.clone(),
            context.form_action.clone(),
        );
        Self {
            context: Arc::new(context),
            settings,
            gateway: ports.gateway,
            navigator: ports.navigator,
            notifier,
            selector: Mutex::new(PaymentMethodSelector::new()),
            phone: Mutex::new(PhoneField::new()),
            submission,
            bridge,
        }
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    pub fn notifier(&self) -> &NotificationPresenter {
        &self.notifier
    }

    pub fn on_select(&self, method: PaymentMethod) -> SubmitButton {
        let mut selector = lock(&self.selector);
        selector.select(method);
        tracing::info!(%method, "payment method selected");
        selector.submit_button().clone()
    }

    pub fn selected_method(&self) -> Option<PaymentMethod> {
        lock(&self.selector).selected()
    }

    pub fn submit_button(&self) -> SubmitButton {
        lock(&self.selector).submit_button().clone()
    }

    /// Returns the text the phone input should display after the keystroke.
    pub fn on_phone_input(&self, raw: &str) -> String {
        lock(&self.phone).on_input(raw)
    }

    pub fn on_phone_blur(&self) -> PhoneValidation {
        lock(&self.phone).on_blur()
    }

    pub fn phone_error(&self) -> Option<String> {
        lock(&self.phone).error().map(str::to_string)
    }

    /// Fills the page-owned fields into `form` and submits it.
    pub async fn on_submit(&self, mut form: FormData) -> SubmitOutcome {
        self.fill(&mut form);

        let outcome = self.submission.submit(form).await;
        if let SubmitOutcome::Rejected(error) = outcome {
            if error.is_phone_error() {
                lock(&self.phone).set_error(error.message());
            } else {
                self.notifier.error(error.message());
            }
        }
        outcome
    }

    pub fn is_processing(&self) -> bool {
        self.submission.is_processing()
    }

    /// Starts polling when the page was rendered for a pending payment.
    pub fn start_polling(&self, visibility: watch::Receiver<Visibility>) -> Option<PollHandle> {
        StatusPoller::new(
            self.gateway.clone(),
            self.navigator.clone(),
            self.notifier.clone(),
            self.context.clone(),
            &self.settings,
        )
        .start(visibility)
    }

    /// Tells the host app the user is done with the status page.
    pub fn on_complete(&self, status: TransactionStatus) {
        let payload = CompletionPayload::new(self.context.transaction_id.clone(), status);
        if let Err(e) = self.bridge.signal(&payload) {
            tracing::error!("completion signal failed: {}", e);
            self.notifier
                .error("Could not return to the app. Please close this page.");
        }
    }

    fn fill(&self, form: &mut FormData) {
        if form.get(TRANSACTION_ID_FIELD).is_none() {
            form.set(TRANSACTION_ID_FIELD, self.context.transaction_id.clone());
        }
        if form.csrf_token().is_none()
            && let Some(token) = &self.context.csrf_token
        {
            form.set(CSRF_FIELD, token.clone());
        }
        if let Some(method) = self.selected_method() {
            form.set(PAYMENT_METHOD_FIELD, method.as_str());
        }
        let phone = lock(&self.phone);
        if !phone.input().is_empty() {
            form.set(PHONE_FIELD, phone.input().display());
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
