use super::notifier::NotificationPresenter;
use crate::domain::form::{FormData, PAYMENT_METHOD_FIELD, PHONE_FIELD};
use crate::domain::method::PaymentMethod;
use crate::domain::phone::{INVALID_PHONE_MESSAGE, PhoneNumberInput, PhoneValidation};
use crate::domain::ports::{
    FormSurfaceRef, NavigatorRef, PaymentGatewayRef, ResponseBody, SubmissionResponse,
};
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

pub const NETWORK_ERROR_MESSAGE: &str =
    "Network error. Please check your connection and try again.";

/// Why a submission never left the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    MissingMethod,
    UnknownMethod,
    MissingPhone,
    InvalidPhone,
}

impl ValidationError {
    pub fn message(self) -> &'static str {
        match self {
            ValidationError::MissingMethod => "Please select a payment method",
            ValidationError::UnknownMethod => "Invalid payment method selected",
            ValidationError::MissingPhone => "Phone number is required for M-Pesa payment",
            ValidationError::InvalidPhone => INVALID_PHONE_MESSAGE,
        }
    }

    /// Phone problems are shown under the field rather than as a toast.
    pub fn is_phone_error(self) -> bool {
        matches!(self, ValidationError::MissingPhone | ValidationError::InvalidPhone)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another submission was still in flight.
    Ignored,
    Rejected(ValidationError),
    Redirected(Url),
    /// The server answered without redirecting. Interpreting the body is left
    /// to the caller.
    Responded(ResponseBody),
    NetworkError(String),
}

/// Returns the controller to Idle and re-enables the form when dropped, so
/// every exit path of a submission releases it.
struct ProcessingGuard<'a> {
    processing: &'a AtomicBool,
    form: &'a FormSurfaceRef,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.form.set_interactive(true);
        self.processing.store(false, Ordering::Release);
        tracing::debug!("submission finished, form re-enabled");
    }
}

/// Validates and posts the checkout form, one submission at a time.
pub struct SubmissionController {
    gateway: PaymentGatewayRef,
    navigator: NavigatorRef,
    form: FormSurfaceRef,
    notifier: NotificationPresenter,
    action: String,
    processing: AtomicBool,
}

impl SubmissionController {
    pub fn new(
        gateway: PaymentGatewayRef,
        navigator: NavigatorRef,
        form: FormSurfaceRef,
        notifier: NotificationPresenter,
        action: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            navigator,
            form,
            notifier,
            action: action.into(),
            processing: AtomicBool::new(false),
        }
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// Checks the form and returns the payload to send, with the phone number
    /// in its canonical international form.
    pub fn prepare(form: FormData) -> Result<FormData, ValidationError> {
        let method = match form.get(PAYMENT_METHOD_FIELD).map(str::trim) {
            None | Some("") => return Err(ValidationError::MissingMethod),
            Some(raw) => raw
                .parse::<PaymentMethod>()
                .map_err(|_| ValidationError::UnknownMethod)?,
        };

        if !method.requires_phone() {
            return Ok(form);
        }

        let phone = PhoneNumberInput::normalize(form.get(PHONE_FIELD).unwrap_or_default());
        match phone.validate() {
            PhoneValidation::Empty => Err(ValidationError::MissingPhone),
            PhoneValidation::Invalid => Err(ValidationError::InvalidPhone),
            PhoneValidation::Valid => {
                let mut form = form;
                form.set(PHONE_FIELD, phone.international());
                Ok(form)
            }
        }
    }

    pub async fn submit(&self, form: FormData) -> SubmitOutcome {
        if self.is_processing() {
            tracing::debug!("submission already in flight, ignoring");
            return SubmitOutcome::Ignored;
        }

        let payload = match Self::prepare(form) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::debug!(?error, "submission rejected by validation");
                return SubmitOutcome::Rejected(error);
            }
        };

        if self
            .processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return SubmitOutcome::Ignored;
        }
        let _guard = ProcessingGuard {
            processing: &self.processing,
            form: &self.form,
        };
        self.form.set_interactive(false);

        tracing::info!(
            action = %self.action,
            method = payload.get(PAYMENT_METHOD_FIELD).unwrap_or_default(),
            "submitting payment"
        );
        match self.gateway.submit(&self.action, &payload).await {
            Ok(SubmissionResponse::Redirected(url)) => {
                tracing::info!(%url, "following redirect");
                self.navigator.navigate(&url);
                SubmitOutcome::Redirected(url)
            }
            Ok(SubmissionResponse::Body(body)) => {
                tracing::debug!(status = body.status, "submission answered without redirect");
                SubmitOutcome::Responded(body)
            }
            Err(e) => {
                tracing::error!("payment submission failed: {}", e);
                self.notifier.error(NETWORK_ERROR_MESSAGE);
                SubmitOutcome::NetworkError(e.to_string())
            }
        }
    }
}
