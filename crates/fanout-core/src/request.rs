//! Outgoing request value: method, target URL, headers and optional body.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            _ => Err(RequestError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// Error building a [`Request`].
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported URL scheme {0:?} (expected http or https)")]
    UnsupportedScheme(String),
    #[error("unsupported HTTP method {0:?}")]
    UnsupportedMethod(String),
    #[error("invalid header line {0:?} (expected \"Name: value\")")]
    InvalidHeader(String),
    #[error("invalid header {name:?}: names must be tokens, values must not contain CR, LF or NUL")]
    InvalidHeaderField { name: String },
}

/// Header names are RFC 9110 tokens; values may not break the line or embed NUL.
fn check_header(name: &str, value: &str) -> Result<(), RequestError> {
    let name_ok = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
    if name_ok && !value.contains(['\r', '\n', '\0']) {
        Ok(())
    } else {
        Err(RequestError::InvalidHeaderField {
            name: name.to_string(),
        })
    }
}

/// One request to send. The queue owns it until the transfer completes and
/// the callback has seen it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl Request {
    /// Creates a request after checking that `url` parses and uses http(s).
    pub fn new(method: Method, url: &str) -> Result<Self, RequestError> {
        let parsed = url::Url::parse(url).map_err(|source| RequestError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(RequestError::UnsupportedScheme(other.to_string())),
        }
        Ok(Self {
            method,
            url: parsed.into(),
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn get(url: &str) -> Result<Self, RequestError> {
        Self::new(Method::Get, url)
    }

    pub fn post(url: &str, body: impl Into<Vec<u8>>) -> Result<Self, RequestError> {
        Ok(Self::new(Method::Post, url)?.with_body(body))
    }

    /// Adds a header. Names must be tokens; values must not contain CR, LF or NUL.
    pub fn with_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, RequestError> {
        let (name, value) = (name.into(), value.into());
        check_header(&name, &value)?;
        self.headers.push((name, value));
        Ok(self)
    }

    /// Adds a header given as a raw `Name: value` line.
    pub fn with_header_line(self, line: &str) -> Result<Self, RequestError> {
        match line.split_once(':') {
            Some((name, value)) if !name.trim().is_empty() => {
                self.with_header(name.trim(), value.trim())
            }
            _ => Err(RequestError::InvalidHeader(line.to_string())),
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}
