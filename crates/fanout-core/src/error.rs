//! Error types: engine failures (fatal to a pass), per-transfer failures
//! (deferred until the batch drains) and option validation.

use std::fmt;

use thiserror::Error;

use crate::options::OptionsError;
use crate::request::Request;
use crate::response::ResponseError;

/// Failure of the transfer engine itself. Raised immediately from `proceed`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unable to create batch handle: {0}")]
    CreateBatch(String),
    #[error("unable to create transfer handle: {0}")]
    CreateHandle(String),
    #[error("unable to attach transfer to batch: {0}")]
    Attach(String),
    #[error("unable to detach transfer from batch: {0}")]
    Detach(String),
    #[error("batch step failed: {0}")]
    Step(String),
    #[error("waiting for batch readiness failed: {0}")]
    Wait(String),
}

/// Coarse class of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connect or total timeout elapsed.
    Timeout,
    /// DNS, connect, send or receive failure.
    Connection,
    /// TLS handshake or certificate problem.
    Tls,
    Other,
}

/// Native failure reported by the engine for one finished transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    /// Engine-native result code (a `CURLcode` for the curl engine).
    pub code: i32,
    pub message: String,
    pub kind: FailureKind,
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

/// Why a transfer did not produce a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("transport failure: {0}")]
    Transport(TransportFailure),
    #[error("invalid response: {0}")]
    Response(#[from] ResponseError),
}

/// One transfer finished without a usable response.
#[derive(Debug, Clone, Error)]
#[error("{} {}: {reason}", .request.method(), .request.url())]
pub struct TransferError {
    request: Request,
    #[source]
    reason: FailureReason,
}

impl TransferError {
    pub fn new(request: Request, reason: FailureReason) -> Self {
        Self { request, reason }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn reason(&self) -> &FailureReason {
        &self.reason
    }

    /// Transport failure details, when the failure happened below HTTP.
    pub fn transport(&self) -> Option<&TransportFailure> {
        match &self.reason {
            FailureReason::Transport(t) => Some(t),
            FailureReason::Response(_) => None,
        }
    }
}

/// Error returned by `proceed`, `flush` and the send operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error(transparent)]
    Options(#[from] OptionsError),
    #[error("transfer finished without delivering a response")]
    MissingResponse,
}

pub type Result<T> = std::result::Result<T, Error>;
