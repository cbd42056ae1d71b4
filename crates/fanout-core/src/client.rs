//! Client front end: option resolution, asynchronous send, and the
//! synchronous adapter that sends one request and drains the batch.
//!
//! All sends share one coordinator, so `send_request` drains every queued
//! transfer, and a failure anywhere in that drain is returned to it. Use one
//! `Client` per caller that needs isolated error reporting.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::FanoutConfig;
use crate::coordinator::Coordinator;
use crate::engine::multi::CurlEngine;
use crate::engine::{TransferEngine, TransferId};
use crate::error::{Error, Result, TransferError};
use crate::options::{OptionsError, RequestOptions, TransferDefaults, TransferOptions};
use crate::request::Request;
use crate::response::Response;

pub struct Client<E: TransferEngine = CurlEngine> {
    coordinator: Coordinator<E>,
    defaults: TransferDefaults,
}

impl Client<CurlEngine> {
    /// Client over libcurl with built-in defaults.
    pub fn new() -> Self {
        Self::with_engine(CurlEngine::new(), TransferDefaults::default())
    }

    /// Client over libcurl using the transfer defaults and wait timeout from
    /// `cfg`.
    pub fn from_config(cfg: &FanoutConfig) -> Self {
        let engine = CurlEngine::new().with_wait_timeout(cfg.wait_timeout());
        Self::with_engine(engine, cfg.transfer_defaults())
    }
}

impl Default for Client<CurlEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: TransferEngine> Client<E> {
    pub fn with_engine(engine: E, defaults: TransferDefaults) -> Self {
        Self {
            coordinator: Coordinator::new(engine),
            defaults,
        }
    }

    pub fn defaults(&self) -> &TransferDefaults {
        &self.defaults
    }

    pub fn coordinator(&self) -> &Coordinator<E> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut Coordinator<E> {
        &mut self.coordinator
    }

    /// Queues `request`. The outcome reaches the options' callback during a
    /// later `proceed` or `flush`; nothing happens until then.
    pub fn send_async_request(
        &mut self,
        request: Request,
        options: RequestOptions,
    ) -> std::result::Result<TransferId, OptionsError> {
        let resolved = TransferOptions::resolve(options, &self.defaults)?;
        Ok(self.coordinator.enqueue(request, resolved))
    }

    /// Sends `request` and drains the queue, returning its response.
    ///
    /// The caller's callback, if any, still fires. An error raised by the
    /// drain is returned even when it belongs to another queued transfer.
    pub fn send_request(&mut self, request: Request, options: RequestOptions) -> Result<Response> {
        let mut resolved = TransferOptions::resolve(options, &self.defaults)?;
        let slot: Rc<RefCell<Option<std::result::Result<Response, TransferError>>>> =
            Rc::default();
        let capture = Rc::clone(&slot);
        let original = resolved.take_callback();
        resolved.set_callback(move |req, outcome| {
            *capture.borrow_mut() = Some(outcome.map(Response::clone).map_err(TransferError::clone));
            original(req, outcome);
        });

        self.coordinator.enqueue(request, resolved);
        self.coordinator.flush()?;

        let outcome = slot.borrow_mut().take();
        match outcome {
            Some(Ok(response)) => Ok(response),
            Some(Err(err)) => Err(err.into()),
            None => Err(Error::MissingResponse),
        }
    }

    pub fn proceed(&mut self) -> Result<()> {
        self.coordinator.proceed()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.coordinator.flush()
    }

    pub fn count(&self) -> usize {
        self.coordinator.count()
    }
}
