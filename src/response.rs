use std::fmt;

use serde::de::DeserializeOwned;

use crate::{BridgeError, Reason, Result};

/// Describes one received network response: status, headers, and the body
/// already read into memory.
///
/// The body is stored as text; [`Response::json`] decodes it on demand and
/// reports decode failures as unparseable-response records.
#[derive(Clone, Debug)]
pub struct Response {
    url: String,
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl Response {
    /// Assembles a response descriptor from already-read parts.
    pub fn new(
        url: impl Into<String>,
        status: u16,
        headers: Vec<(String, String)>,
        body: String,
    ) -> Self {
        Self {
            url: url.into(),
            status,
            headers,
            body,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// True for 2xx status codes.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body_str(&self) -> &str {
        &self.body
    }

    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_bytes()
    }

    /// Decodes the body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|err| {
            BridgeError::response_wrapped(self.clone(), err, Reason::ResponseUnparseable)
        })
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.url)
    }
}
