//! Curl multi engine: one `Multi` handle per batch, one `Easy2` handle per
//! transfer.
//!
//! Each easy handle carries a `ResponseCollector` that records the final
//! response's header lines and body, and is tagged with the transfer id as its
//! multi token so that finished messages can be matched back to the queue.

mod classify;
mod collector;
mod configure;

use std::time::Duration;

use curl::easy::Easy2;
use curl::multi::{Easy2Handle, Multi};

use super::{Finished, StepStatus, TransferEngine, TransferId};
use crate::error::EngineError;
use crate::options::TransferOptions;
use crate::request::Request;
use crate::response::{Response, ResponseError};

pub use classify::classify_curl_error;
pub use collector::ResponseCollector;

/// Upper bound on one blocking wait; the loop re-checks transfers after it.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(1000);

/// libcurl-backed transfer engine.
#[derive(Debug, Clone)]
pub struct CurlEngine {
    wait_timeout: Duration,
}

impl Default for CurlEngine {
    fn default() -> Self {
        Self {
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

impl CurlEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the longest single `wait_ready` block.
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }
}

impl TransferEngine for CurlEngine {
    type Batch = Multi;
    type Handle = Easy2<ResponseCollector>;
    type Attached = Easy2Handle<ResponseCollector>;

    fn create_batch(&mut self) -> Result<Multi, EngineError> {
        Ok(Multi::new())
    }

    fn create_handle(
        &mut self,
        id: TransferId,
        request: &Request,
        options: &TransferOptions,
    ) -> Result<Easy2<ResponseCollector>, EngineError> {
        configure::build_easy(id, request, options)
            .map_err(|e| EngineError::CreateHandle(format!("{} {}: {}", request.method(), request.url(), e)))
    }

    fn attach(
        &mut self,
        batch: &mut Multi,
        handle: Easy2<ResponseCollector>,
    ) -> Result<Easy2Handle<ResponseCollector>, EngineError> {
        let id = handle.get_ref().id();
        let mut attached = batch
            .add2(handle)
            .map_err(|e| EngineError::Attach(e.to_string()))?;
        attached
            .set_token(id.get())
            .map_err(|e| EngineError::Attach(e.to_string()))?;
        Ok(attached)
    }

    fn detach(
        &mut self,
        batch: &mut Multi,
        attached: Easy2Handle<ResponseCollector>,
    ) -> Result<Easy2<ResponseCollector>, EngineError> {
        batch
            .remove2(attached)
            .map_err(|e| EngineError::Detach(e.to_string()))
    }

    fn step(&mut self, batch: &mut Multi) -> Result<StepStatus, EngineError> {
        let running = batch
            .perform()
            .map_err(|e| EngineError::Step(e.to_string()))?;
        // Modern libcurl never asks to be called again immediately.
        Ok(StepStatus {
            still_active: running > 0,
            may_have_more: false,
        })
    }

    fn wait_ready(&mut self, batch: &mut Multi) -> Result<(), EngineError> {
        batch
            .wait(&mut [], self.wait_timeout)
            .map(|_| ())
            .map_err(|e| EngineError::Wait(e.to_string()))
    }

    fn poll_finished(&mut self, batch: &mut Multi) -> Vec<Finished> {
        let mut finished = Vec::new();
        batch.messages(|msg| {
            let Some(result) = msg.result() else {
                return;
            };
            match msg.token() {
                Ok(token) => finished.push(Finished {
                    id: TransferId::new(token),
                    result: result.map_err(|e| classify::failure(&e)),
                }),
                Err(e) => tracing::warn!(error = %e, "finished message without token"),
            }
        });
        finished
    }

    fn build_response(
        &mut self,
        attached: &mut Easy2Handle<ResponseCollector>,
    ) -> Result<Response, ResponseError> {
        attached.get_mut().take_response()
    }
}
