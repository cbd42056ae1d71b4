pub mod config;
pub mod logging;

pub mod client;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod options;
pub mod request;
pub mod response;

mod queue;

pub use client::Client;
pub use coordinator::Coordinator;
pub use engine::multi::CurlEngine;
pub use engine::{PushHandler, TransferEngine, TransferId};
pub use error::{EngineError, Error, FailureKind, FailureReason, TransferError, TransportFailure};
pub use options::{Callback, RequestOptions, TransferDefaults, TransferOptions};
pub use request::{Method, Request};
pub use response::Response;
