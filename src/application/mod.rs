//! Application layer orchestrating the checkout page.
//!
//! `CheckoutController` is the entry point. It wires the method selector, the
//! phone field, the single-flight `SubmissionController`, the `StatusPoller`
//! task and the completion bridge around one shared page context.

pub mod checkout;
pub mod completion;
pub mod contact;
pub mod notifier;
pub mod poller;
pub mod selector;
pub mod submission;
