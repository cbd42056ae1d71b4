//! Multi-transfer coordinator.
//!
//! Owns the queue, one lazily created batch handle and every attached
//! transfer. Nothing runs in the background: each `proceed` call is one pass
//! of the event loop on the calling thread (prepare queued entries, drive the
//! batch until nothing is active, harvest finished transfers and fire their
//! callbacks). `flush` repeats passes until the queue is empty.

mod run;

use crate::engine::{LogPushes, PushHandler, TransferEngine, TransferId};
use crate::error::Result;
use crate::options::TransferOptions;
use crate::queue::{EntryState, TransferQueue};
use crate::request::Request;

pub struct Coordinator<E: TransferEngine> {
    engine: E,
    queue: TransferQueue<E::Attached>,
    /// Present exactly while the queue is non-empty after a pass.
    batch: Option<E::Batch>,
    pushes: Box<dyn PushHandler>,
}

impl<E: TransferEngine> Coordinator<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            queue: TransferQueue::default(),
            batch: None,
            pushes: Box::new(LogPushes),
        }
    }

    /// Replaces the sink for notifications that match no queued transfer.
    pub fn with_push_handler(mut self, handler: impl PushHandler + 'static) -> Self {
        self.pushes = Box::new(handler);
        self
    }

    /// Queues a transfer. No engine handle is created until the next pass.
    pub fn enqueue(&mut self, request: Request, options: TransferOptions) -> TransferId {
        tracing::debug!(method = %request.method(), url = request.url(), "queueing transfer");
        self.queue.enqueue(request, options)
    }

    /// Transfers not yet completed (queued or in flight).
    pub fn count(&self) -> usize {
        self.queue.len()
    }

    /// True while a batch handle exists.
    pub fn has_batch(&self) -> bool {
        self.batch.is_some()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Runs one pass of the event loop.
    ///
    /// Engine failures are returned immediately. Transfer failures are
    /// delivered to their callbacks; the first one of the pass is returned
    /// only if the pass leaves the queue empty.
    pub fn proceed(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            return Ok(());
        }
        if self.batch.is_none() {
            let batch = self.engine.create_batch()?;
            tracing::debug!("batch handle created");
            self.batch = Some(batch);
        }
        let Some(batch) = self.batch.as_mut() else {
            return Ok(());
        };

        run::prepare_queued(&mut self.engine, batch, &mut self.queue)?;
        let stalled = run::drive_until_idle(&mut self.engine, batch);
        let harvest = run::harvest(&mut self.engine, batch, &mut self.queue, self.pushes.as_mut());

        if let Some(err) = stalled {
            if harvest.completed == 0 {
                return Err(err.into());
            }
        }
        if !self.queue.is_empty() {
            return Ok(());
        }
        if let Some(batch) = self.batch.take() {
            self.engine.destroy_batch(batch);
            tracing::debug!("queue drained, batch handle destroyed");
        }
        match harvest.first_error {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    /// Runs passes until the queue is empty. Stops at the first error; any
    /// transfers still pending stay queued for a later call.
    pub fn flush(&mut self) -> Result<()> {
        while !self.queue.is_empty() {
            self.proceed()?;
        }
        Ok(())
    }
}

impl<E: TransferEngine> Drop for Coordinator<E> {
    fn drop(&mut self) {
        let Some(mut batch) = self.batch.take() else {
            return;
        };
        for entry in self.queue.drain() {
            if let EntryState::Prepared(attached) = entry.state {
                match self.engine.detach(&mut batch, attached) {
                    Ok(handle) => self.engine.release(handle),
                    Err(e) => tracing::warn!(transfer = %entry.id, error = %e, "detach on drop failed"),
                }
            }
        }
        self.engine.destroy_batch(batch);
    }
}
