//! WITSML store access over SOAP
//!
//! [`StoreClient`] wraps query objects in their plural envelope, sends
//! them through a [`Transport`] and parses the `XMLout` of the reply into
//! the object model. Non-positive result codes become [`Error::Store`]
//! carrying the message the store reports for that code.
//!
//! [`Error::Store`]: crate::error::Error::Store

pub mod client;
pub mod options;
pub mod soap;
pub mod transport;

pub use client::{Selector, StoreClient};
pub use options::ReturnElements;
pub use soap::{Operation, StoreReply};
pub use transport::{HttpTransport, Transport};
