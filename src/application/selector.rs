use crate::domain::method::{FieldGroup, PaymentMethod};

pub const NO_METHOD_LABEL: &str = "Select Payment Method";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitButton {
    pub label: &'static str,
    pub enabled: bool,
}

/// Tracks the single active payment method and what the form shows for it.
#[derive(Debug, Clone)]
pub struct PaymentMethodSelector {
    /// Value of the hidden `payment_method` input.
    carrier: Option<PaymentMethod>,
    button: SubmitButton,
    pulses: u64,
}

impl Default for PaymentMethodSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentMethodSelector {
    pub fn new() -> Self {
        Self {
            carrier: None,
            button: SubmitButton {
                label: NO_METHOD_LABEL,
                enabled: false,
            },
            pulses: 0,
        }
    }

    /// Selects `method`, deselecting every other one. Last write wins.
    pub fn select(&mut self, method: PaymentMethod) {
        if let Some(previous) = self.carrier.filter(|m| *m != method) {
            tracing::debug!(from = %previous, to = %method, "switching payment method");
        }
        self.carrier = Some(method);
        self.button = SubmitButton {
            label: method.submit_label(),
            enabled: true,
        };
        self.pulses += 1;
    }

    pub fn selected(&self) -> Option<PaymentMethod> {
        self.carrier
    }

    pub fn is_selected(&self, method: PaymentMethod) -> bool {
        self.carrier == Some(method)
    }

    pub fn is_visible(&self, group: FieldGroup) -> bool {
        self.carrier.is_some_and(|m| m.field_group() == group)
    }

    /// Field groups currently revealed; at most one.
    pub fn visible_groups(&self) -> Vec<FieldGroup> {
        self.carrier.map(|m| m.field_group()).into_iter().collect()
    }

    pub fn submit_button(&self) -> &SubmitButton {
        &self.button
    }

    /// Number of feedback pulses played on the option cards.
    pub fn pulses(&self) -> u64 {
        self.pulses
    }
}
