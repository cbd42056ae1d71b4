//! Transfer engine seam.
//!
//! The coordinator never touches sockets. It drives an engine that can create
//! transfer handles, attach them to one batch handle, advance the batch, block
//! until the batch is network-ready, and report which transfers finished.
//! `multi` provides the libcurl multi implementation.

pub mod multi;
#[cfg(test)]
pub(crate) mod scripted;

use std::fmt;

use crate::error::{EngineError, TransportFailure};
use crate::options::TransferOptions;
use crate::request::Request;
use crate::response::{Response, ResponseError};

/// Identity of one queued transfer. Attached to the engine handle so that
/// completion notifications can be matched back to their queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferId(usize);

impl TransferId {
    pub fn new(raw: usize) -> Self {
        Self(raw)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of one non-blocking step over the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepStatus {
    /// At least one attached transfer has not finished.
    pub still_active: bool,
    /// Stepping again right away may make more progress without blocking.
    pub may_have_more: bool,
}

/// A "transfer finished" notification drained from the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finished {
    pub id: TransferId,
    pub result: Result<(), TransportFailure>,
}

/// Capability the coordinator drives. One engine value serves one coordinator.
///
/// `Handle` is a configured transfer that is not attached to any batch;
/// `Attached` is the same transfer while it lives inside the batch. Owning an
/// `Attached` value is what makes a queue entry Prepared.
pub trait TransferEngine {
    type Batch;
    type Handle;
    type Attached;

    fn create_batch(&mut self) -> Result<Self::Batch, EngineError>;

    /// Creates a transfer handle for `request`, configured from `options` and
    /// tagged with `id`.
    fn create_handle(
        &mut self,
        id: TransferId,
        request: &Request,
        options: &TransferOptions,
    ) -> Result<Self::Handle, EngineError>;

    fn attach(
        &mut self,
        batch: &mut Self::Batch,
        handle: Self::Handle,
    ) -> Result<Self::Attached, EngineError>;

    fn detach(
        &mut self,
        batch: &mut Self::Batch,
        attached: Self::Attached,
    ) -> Result<Self::Handle, EngineError>;

    /// Advances every attached transfer without blocking.
    fn step(&mut self, batch: &mut Self::Batch) -> Result<StepStatus, EngineError>;

    /// Blocks until at least one transfer is network-ready (or the engine's
    /// own wait timeout elapses).
    fn wait_ready(&mut self, batch: &mut Self::Batch) -> Result<(), EngineError>;

    /// Drains all pending "transfer finished" notifications.
    fn poll_finished(&mut self, batch: &mut Self::Batch) -> Vec<Finished>;

    /// Materializes the response of a transfer that finished successfully.
    fn build_response(&mut self, attached: &mut Self::Attached) -> Result<Response, ResponseError>;

    fn release(&mut self, handle: Self::Handle) {
        drop(handle);
    }

    fn destroy_batch(&mut self, batch: Self::Batch) {
        drop(batch);
    }
}

/// Sink for finished notifications that match no queued transfer, such as
/// server-pushed streams. Best effort.
pub trait PushHandler {
    fn handle(&mut self, id: TransferId);
}

/// Default push handler: records the notification in the log and moves on.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPushes;

impl PushHandler for LogPushes {
    fn handle(&mut self, id: TransferId) {
        tracing::debug!(transfer = %id, "ignoring finished notification for untracked transfer");
    }
}
