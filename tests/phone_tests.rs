mod common;

use bematore_checkout::domain::phone::{INVALID_PHONE_MESSAGE, PhoneNumberInput, PhoneValidation};

#[test]
fn test_leading_zero_maps_to_country_code() {
    for len in 1..=10 {
        for _ in 0..20 {
            let raw = format!("0{}", common::random_digits(len - 1));
            let input = PhoneNumberInput::normalize(&raw);
            assert_eq!(input.international(), format!("254{}", &raw[1..]), "raw {raw}");
            assert_eq!(input.local(), raw);
        }
    }
}

#[test]
fn test_country_code_maps_to_leading_zero() {
    for len in 0..=9 {
        for _ in 0..20 {
            let raw = format!("254{}", common::random_digits(len));
            let input = PhoneNumberInput::normalize(&raw);
            assert_eq!(input.local(), format!("0{}", &raw[3..]), "raw {raw}");
            assert_eq!(input.international(), raw);
        }
    }
}

#[test]
fn test_validator_accepts_exactly_mobile_numbers() {
    for _ in 0..200 {
        let subscriber = common::random_digits(8);
        for operator in ['1', '7'] {
            let local = format!("0{operator}{subscriber}");
            assert_eq!(
                PhoneNumberInput::normalize(&local).validate(),
                PhoneValidation::Valid
            );
            let international = format!("254{operator}{subscriber}");
            assert_eq!(
                PhoneNumberInput::normalize(&international).validate(),
                PhoneValidation::Valid
            );
        }
        for operator in ['0', '2', '3', '4', '5', '6', '8', '9'] {
            let local = format!("0{operator}{subscriber}");
            assert_eq!(
                PhoneNumberInput::normalize(&local).validate(),
                PhoneValidation::Invalid,
                "{local}"
            );
        }
    }
}

#[test]
fn test_validator_rejects_short_numbers() {
    for len in 1..=8 {
        let raw = format!("07{}", common::random_digits(len - 1));
        assert_eq!(
            PhoneNumberInput::normalize(&raw).validate(),
            PhoneValidation::Invalid,
            "{raw}"
        );
    }
}

#[test]
fn test_empty_field_shows_no_error() {
    let validation = PhoneNumberInput::normalize("").validate();
    assert_eq!(validation, PhoneValidation::Empty);
    assert!(!validation.shows_error());
}

#[test]
fn test_display_scenarios() {
    let input = PhoneNumberInput::normalize("0712345678");
    assert_eq!(input.display(), "0712 345 678");
    assert_eq!(input.international(), "254712345678");

    let input = PhoneNumberInput::normalize("712345678");
    assert_eq!(input.local(), "0712345678");
    assert_eq!(input.international(), "254712345678");
    assert_eq!(input.to_string(), "0712 345 678");
}

#[test]
fn test_blur_toggles_inline_error() {
    let h = common::Harness::new();

    h.checkout.on_phone_input("07123");
    assert_eq!(h.checkout.on_phone_blur(), PhoneValidation::Invalid);
    assert_eq!(h.checkout.phone_error().as_deref(), Some(INVALID_PHONE_MESSAGE));

    h.checkout.on_phone_input("0712345678");
    assert_eq!(h.checkout.on_phone_blur(), PhoneValidation::Valid);
    assert_eq!(h.checkout.phone_error(), None);

    h.checkout.on_phone_input("");
    assert_eq!(h.checkout.on_phone_blur(), PhoneValidation::Empty);
    assert_eq!(h.checkout.phone_error(), None);
}
