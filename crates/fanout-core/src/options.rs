//! Per-request options: what the caller passes in (`RequestOptions`), the
//! defaults they fall back to (`TransferDefaults`), and the validated result
//! the engine consumes (`TransferOptions`).

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::error::TransferError;
use crate::request::Request;
use crate::response::Response;

/// Upper bound accepted for `max_redirects`.
pub const MAX_REDIRECTS_LIMIT: u32 = 50;

/// Completion callback. Invoked exactly once per transfer with either the
/// response or the error.
pub type Callback = Box<dyn FnOnce(&Request, Result<&Response, &TransferError>)>;

fn ignore_outcome(_: &Request, _: Result<&Response, &TransferError>) {}

/// Option validation failure; nothing is queued when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
    #[error("max_redirects {0} exceeds limit {MAX_REDIRECTS_LIMIT}")]
    TooManyRedirects(u32),
    #[error("user agent must not contain CR, LF or NUL")]
    InvalidUserAgent,
}

/// Transport defaults applied when a request leaves an option unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDefaults {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub follow_redirects: bool,
    pub max_redirects: u32,
    pub user_agent: Option<String>,
    pub verify_tls: bool,
}

impl Default for TransferDefaults {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(300),
            follow_redirects: true,
            max_redirects: 10,
            user_agent: None,
            verify_tls: true,
        }
    }
}

/// Caller-supplied options. Every field is optional.
#[derive(Default)]
pub struct RequestOptions {
    pub connect_timeout: Option<Duration>,
    pub timeout: Option<Duration>,
    pub follow_redirects: Option<bool>,
    pub max_redirects: Option<u32>,
    pub user_agent: Option<String>,
    pub verify_tls: Option<bool>,
    pub callback: Option<Callback>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn callback<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Request, Result<&Response, &TransferError>) + 'static,
    {
        self.callback = Some(Box::new(f));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = Some(follow);
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }
}

impl fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestOptions")
            .field("connect_timeout", &self.connect_timeout)
            .field("timeout", &self.timeout)
            .field("follow_redirects", &self.follow_redirects)
            .field("max_redirects", &self.max_redirects)
            .field("user_agent", &self.user_agent)
            .field("verify_tls", &self.verify_tls)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Resolved, validated options for one transfer.
pub struct TransferOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub follow_redirects: bool,
    pub max_redirects: u32,
    pub user_agent: Option<String>,
    pub verify_tls: bool,
    callback: Callback,
}

impl TransferOptions {
    /// Fills unset fields from `defaults` and validates the result.
    pub fn resolve(
        options: RequestOptions,
        defaults: &TransferDefaults,
    ) -> Result<Self, OptionsError> {
        let resolved = Self {
            connect_timeout: options.connect_timeout.unwrap_or(defaults.connect_timeout),
            timeout: options.timeout.unwrap_or(defaults.timeout),
            follow_redirects: options.follow_redirects.unwrap_or(defaults.follow_redirects),
            max_redirects: options.max_redirects.unwrap_or(defaults.max_redirects),
            user_agent: options.user_agent.or_else(|| defaults.user_agent.clone()),
            verify_tls: options.verify_tls.unwrap_or(defaults.verify_tls),
            callback: options.callback.unwrap_or_else(|| Box::new(ignore_outcome)),
        };
        resolved.validate()?;
        Ok(resolved)
    }

    fn validate(&self) -> Result<(), OptionsError> {
        if self.connect_timeout.is_zero() {
            return Err(OptionsError::ZeroTimeout("connect_timeout"));
        }
        if self.timeout.is_zero() {
            return Err(OptionsError::ZeroTimeout("timeout"));
        }
        if self.max_redirects > MAX_REDIRECTS_LIMIT {
            return Err(OptionsError::TooManyRedirects(self.max_redirects));
        }
        if let Some(ua) = &self.user_agent {
            if ua.contains(['\r', '\n', '\0']) {
                return Err(OptionsError::InvalidUserAgent);
            }
        }
        Ok(())
    }

    /// Removes the callback, leaving a no-op in its place.
    pub(crate) fn take_callback(&mut self) -> Callback {
        std::mem::replace(&mut self.callback, Box::new(ignore_outcome))
    }

    pub(crate) fn set_callback<F>(&mut self, f: F)
    where
        F: FnOnce(&Request, Result<&Response, &TransferError>) + 'static,
    {
        self.callback = Box::new(f);
    }

    pub(crate) fn into_callback(self) -> Callback {
        self.callback
    }
}

impl fmt::Debug for TransferOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferOptions")
            .field("connect_timeout", &self.connect_timeout)
            .field("timeout", &self.timeout)
            .field("follow_redirects", &self.follow_redirects)
            .field("max_redirects", &self.max_redirects)
            .field("user_agent", &self.user_agent)
            .field("verify_tls", &self.verify_tls)
            .finish_non_exhaustive()
    }
}
