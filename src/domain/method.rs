use crate::error::CheckoutError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment methods offered on the checkout form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Mpesa,
    Flutterwave,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 2] = [PaymentMethod::Mpesa, PaymentMethod::Flutterwave];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Mpesa => "mpesa",
            PaymentMethod::Flutterwave => "flutterwave",
        }
    }

    /// Label of the submit button once this method is selected.
    pub fn submit_label(self) -> &'static str {
        match self {
            PaymentMethod::Mpesa => "Pay with M-Pesa",
            PaymentMethod::Flutterwave => "Pay with Card",
        }
    }

    /// The group of inputs revealed while this method is selected.
    pub fn field_group(self) -> FieldGroup {
        match self {
            PaymentMethod::Mpesa => FieldGroup::MpesaPhone,
            PaymentMethod::Flutterwave => FieldGroup::CardRedirect,
        }
    }

    /// M-Pesa is paid through an STK push, so it needs a phone number.
    pub fn requires_phone(self) -> bool {
        matches!(self, PaymentMethod::Mpesa)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mpesa" => Ok(PaymentMethod::Mpesa),
            "flutterwave" => Ok(PaymentMethod::Flutterwave),
            other => Err(CheckoutError::Validation(format!(
                "Invalid payment method selected: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldGroup {
    MpesaPhone,
    CardRedirect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method() {
        assert_eq!("mpesa".parse::<PaymentMethod>().unwrap(), PaymentMethod::Mpesa);
        assert_eq!(
            " Flutterwave ".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::Flutterwave
        );
        assert!(matches!(
            "paypal".parse::<PaymentMethod>(),
            Err(CheckoutError::Validation(_))
        ));
    }

    #[test]
    fn test_method_serialization() {
        let json = serde_json::to_string(&PaymentMethod::Mpesa).unwrap();
        assert_eq!(json, "\"mpesa\"");
    }

    #[test]
    fn test_only_mpesa_requires_phone() {
        assert!(PaymentMethod::Mpesa.requires_phone());
        assert!(!PaymentMethod::Flutterwave.requires_phone());
    }
}
