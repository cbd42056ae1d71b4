//! Response value delivered to callbacks, and the builder that turns a
//! finished transfer's raw header lines and body into one.

pub mod parse;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Failure to materialize a [`Response`] from a finished transfer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseError {
    #[error("no HTTP status line received")]
    MissingStatusLine,
    #[error("malformed status line {0:?}")]
    MalformedStatusLine(String),
}

/// Final response of a transfer (the last one when redirects were followed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub(crate) version: String,
    pub(crate) status: u16,
    pub(crate) reason: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
}

impl Response {
    /// Protocol version from the status line, e.g. `HTTP/1.1` or `HTTP/2`.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Header fields in the order received.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of the header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body deserialized from JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}
