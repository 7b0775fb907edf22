//! `bridge-http` is a small async HTTP client where every failure is a
//! structured record: a [`Reason`] code plus the request or response the
//! failure relates to.
//!
//! The main entry points:
//! - [`BridgeClient::send`]
//! - [`BridgeClient::send_cancellable`]
//! - [`Response::json`]

mod cancel;
mod client;
mod error;
mod options;
mod request;
mod response;

pub use cancel::CancelHandle;
pub use client::{resolve_url, BridgeClient};
pub use error::{BridgeError, Reason};
pub use options::ClientOptions;
pub use request::{Method, Request};
pub use response::Response;

pub type Result<T> = std::result::Result<T, BridgeError>;
