//! Domain layer: value types of the checkout page and the ports through which
//! the application reaches the server and the host surfaces.

pub mod completion;
pub mod form;
pub mod method;
pub mod notification;
pub mod phone;
pub mod ports;
pub mod status;
