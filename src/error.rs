use std::error::Error as StdError;
use std::fmt;

use crate::{Request, Response};

/// Boxed underlying cause stored inside a [`BridgeError`].
type Cause = Box<dyn StdError + Send + Sync>;

/// Classifies a failed network operation.
///
/// Request reasons are attached before a response exists; response reasons
/// carry the response (when one was received) alongside.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reason {
    /// The request was cancelled before completion.
    RequestCancelled,
    /// The request could not be executed (transport-level failure).
    RequestFailed,
    /// A response arrived with a non-success status code.
    ResponseUnsuccessful,
    /// The response body could not be parsed into the requested shape.
    ResponseUnparseable,
    /// Reading the response body failed mid-stream.
    ResponseIo,
}

impl Reason {
    /// True for reasons raised before any response was received.
    pub fn is_request_reason(self) -> bool {
        matches!(self, Self::RequestCancelled | Self::RequestFailed)
    }

    /// True for reasons raised after a response (or part of one) arrived.
    pub fn is_response_reason(self) -> bool {
        !self.is_request_reason()
    }

    /// Human-readable prefix used when rendering a failure.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::RequestCancelled => "Request cancelled",
            Self::RequestFailed => "Request failed",
            Self::ResponseUnsuccessful => "Response unsuccessful",
            Self::ResponseUnparseable => "Response Unparseable",
            Self::ResponseIo => "Response I/O Error",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Error type returned by this crate.
///
/// A failure record: an immutable reason code plus the request or response
/// the failure relates to. The message is derived once, at construction.
#[derive(Debug, thiserror::Error)]
#[error("{}", render(.reason, .message))]
pub struct BridgeError {
    reason: Reason,
    message: String,
    request: Option<Request>,
    response: Option<Response>,
    source: Option<Cause>,
}

// Cancelled requests render the bare prefix; everything else appends the
// stored message after the prefix.
fn render(reason: &Reason, message: &str) -> String {
    match reason {
        Reason::RequestCancelled => reason.prefix().to_owned(),
        _ => format!("{}: {}", reason.prefix(), message),
    }
}

impl BridgeError {
    /// Builds a record for a request that could not be executed.
    pub fn request_failed(request: Request, cause: impl Into<Cause>) -> Self {
        let cause = cause.into();
        Self {
            message: format!("{} {} error: {}", request.method(), request.url(), cause),
            reason: Reason::RequestFailed,
            request: Some(request),
            response: None,
            source: Some(cause),
        }
    }

    /// Builds a record for a cancelled request.
    pub fn cancelled(request: Request) -> Self {
        Self {
            message: format!(
                "{} request to {} was cancelled.",
                request.method(),
                request.url()
            ),
            reason: Reason::RequestCancelled,
            request: Some(request),
            response: None,
            source: None,
        }
    }

    /// Builds a response-side record from an explicit message.
    ///
    /// `reason` must be a response reason; the response may be absent when
    /// the failure happened before one could be assembled.
    pub fn response_invalid(
        response: Option<Response>,
        message: impl Into<String>,
        reason: Reason,
    ) -> Self {
        debug_assert!(reason.is_response_reason());
        Self {
            reason,
            message: message.into(),
            request: None,
            response,
            source: None,
        }
    }

    /// Builds a response-side record wrapping an underlying cause.
    ///
    /// `reason` must be a response reason.
    pub fn response_wrapped(response: Response, cause: impl Into<Cause>, reason: Reason) -> Self {
        debug_assert!(reason.is_response_reason());
        let cause = cause.into();
        Self {
            reason,
            message: format!("{response}: {cause}"),
            request: None,
            response: Some(response),
            source: Some(cause),
        }
    }

    /// The request this failure relates to, if it is a request-side failure.
    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    /// The response this failure relates to, if one was received.
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// The reason code attached at construction.
    pub fn reason(&self) -> Reason {
        self.reason
    }

    /// The message derived at construction.
    pub fn message(&self) -> &str {
        &self.message
    }
}
