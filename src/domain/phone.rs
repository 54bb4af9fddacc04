//! Kenyan mobile number handling for the M-Pesa flow.
//!
//! Keystrokes are normalized into two canonical digit strings: the local form
//! (`0XXXXXXXXX`, 10 digits) shown to the user and the international form
//! (`254XXXXXXXXX`, 12 digits) sent to the server.

use std::fmt;

const COUNTRY_CODE: &str = "254";
const LOCAL_LEN: usize = 10;
const INTERNATIONAL_LEN: usize = 12;

pub const INVALID_PHONE_MESSAGE: &str =
    "Please enter a valid Kenyan phone number (e.g., 0712 345 678)";

/// The canonical forms derived from one raw input value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhoneNumberInput {
    local: String,
    international: String,
}

impl PhoneNumberInput {
    /// Normalizes arbitrary text. Never fails: partial input yields a partial,
    /// non-validating form.
    pub fn normalize(raw: &str) -> Self {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

        // Classify on the prefix alone and cap afterwards, so both forms always
        // carry the same subscriber digits.
        let (local, international) = if let Some(rest) = digits.strip_prefix('0') {
            (digits.clone(), format!("{COUNTRY_CODE}{rest}"))
        } else if digits.starts_with('7') || digits.starts_with('1') {
            (format!("0{digits}"), format!("{COUNTRY_CODE}{digits}"))
        } else if let Some(rest) = digits.strip_prefix(COUNTRY_CODE) {
            (format!("0{rest}"), digits.clone())
        } else {
            (digits.clone(), digits)
        };

        Self {
            local: truncate(local, LOCAL_LEN),
            international: truncate(international, INTERNATIONAL_LEN),
        }
    }

    pub fn local(&self) -> &str {
        &self.local
    }

    pub fn international(&self) -> &str {
        &self.international
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }

    /// Local form grouped 4-3-3, e.g. `0712 345 678`.
    pub fn display(&self) -> String {
        let mut out = String::with_capacity(self.local.len() + 2);
        for (i, c) in self.local.chars().enumerate() {
            if i == 4 || i == 7 {
                out.push(' ');
            }
            out.push(c);
        }
        out
    }

    pub fn validate(&self) -> PhoneValidation {
        if self.is_empty() {
            PhoneValidation::Empty
        } else if is_mobile_subscriber(&self.local, "0")
            || is_mobile_subscriber(&self.international, COUNTRY_CODE)
        {
            PhoneValidation::Valid
        } else {
            PhoneValidation::Invalid
        }
    }
}

impl fmt::Display for PhoneNumberInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneValidation {
    Empty,
    Valid,
    Invalid,
}

impl PhoneValidation {
    /// Whether an inline error belongs under the field.
    pub fn shows_error(self) -> bool {
        self == PhoneValidation::Invalid
    }
}

/// `prefix` followed by `1` or `7` and exactly eight more digits.
fn is_mobile_subscriber(value: &str, prefix: &str) -> bool {
    let Some(rest) = value.strip_prefix(prefix) else {
        return false;
    };
    let bytes = rest.as_bytes();
    bytes.len() == 9
        && matches!(bytes[0], b'1' | b'7')
        && bytes.iter().all(u8::is_ascii_digit)
}

fn truncate(mut value: String, max: usize) -> String {
    // ASCII digits only, so byte and char boundaries coincide.
    value.truncate(max);
    value
}

/// The phone input field: its current canonical value plus inline error state.
#[derive(Debug, Clone, Default)]
pub struct PhoneField {
    input: PhoneNumberInput,
    error: Option<String>,
}

impl PhoneField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the canonical forms on every keystroke and returns the text
    /// the field should now display.
    pub fn on_input(&mut self, raw: &str) -> String {
        self.input = PhoneNumberInput::normalize(raw);
        self.input.display()
    }

    /// Finalizes the value on focus loss, toggling the inline error.
    pub fn on_blur(&mut self) -> PhoneValidation {
        let validation = self.input.validate();
        if validation.shows_error() {
            self.set_error(INVALID_PHONE_MESSAGE);
        } else {
            self.clear_error();
        }
        validation
    }

    pub fn input(&self) -> &PhoneNumberInput {
        &self.input
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
