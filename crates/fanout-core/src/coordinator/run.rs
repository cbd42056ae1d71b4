//! One event-loop pass: prepare, drive, wait, harvest.

use crate::engine::{PushHandler, StepStatus, TransferEngine};
use crate::error::{EngineError, FailureReason, TransferError};
use crate::queue::{EntryState, QueueEntry, TransferQueue};

/// Outcome of draining finished notifications.
#[derive(Debug, Default)]
pub(super) struct Harvest {
    pub(super) completed: usize,
    pub(super) first_error: Option<TransferError>,
}

/// Create, configure and attach a handle for every Queued entry, in insertion
/// order.
pub(super) fn prepare_queued<E: TransferEngine>(
    engine: &mut E,
    batch: &mut E::Batch,
    queue: &mut TransferQueue<E::Attached>,
) -> Result<(), EngineError> {
    for entry in queue.queued_mut() {
        let handle = engine.create_handle(entry.id, &entry.request, &entry.options)?;
        let attached = engine.attach(batch, handle)?;
        entry.state = EntryState::Prepared(attached);
        tracing::debug!(transfer = %entry.id, url = entry.request.url(), "transfer attached");
    }
    Ok(())
}

/// Steps until the engine reports no immediate work left.
fn drive<E: TransferEngine>(engine: &mut E, batch: &mut E::Batch) -> Result<StepStatus, EngineError> {
    loop {
        let status = engine.step(batch)?;
        if !status.may_have_more {
            return Ok(status);
        }
    }
}

/// Drives the batch, blocking on readiness, until no transfer is active.
/// A failed step or wait ends the loop early and is handed back so the
/// caller can decide whether the pass made progress.
pub(super) fn drive_until_idle<E: TransferEngine>(
    engine: &mut E,
    batch: &mut E::Batch,
) -> Option<EngineError> {
    let mut status = match drive(engine, batch) {
        Ok(s) => s,
        Err(e) => return Some(stalled(e)),
    };
    while status.still_active {
        if let Err(e) = engine.wait_ready(batch) {
            return Some(stalled(e));
        }
        status = match drive(engine, batch) {
            Ok(s) => s,
            Err(e) => return Some(stalled(e)),
        };
    }
    None
}

fn stalled(e: EngineError) -> EngineError {
    tracing::warn!(error = %e, "batch stopped before all transfers finished");
    e
}

/// Drains finished notifications: build each outcome, release the handle,
/// remove the entry and fire its callback. Every completion is processed even
/// after a failure; only the first failure is kept for the caller.
pub(super) fn harvest<E: TransferEngine>(
    engine: &mut E,
    batch: &mut E::Batch,
    queue: &mut TransferQueue<E::Attached>,
    pushes: &mut dyn PushHandler,
) -> Harvest {
    let mut out = Harvest::default();
    for finished in engine.poll_finished(batch) {
        let Some(QueueEntry {
            id,
            request,
            options,
            state: EntryState::Prepared(mut attached),
        }) = queue.take_prepared(finished.id)
        else {
            pushes.handle(finished.id);
            continue;
        };

        let outcome = match finished.result {
            Ok(()) => engine
                .build_response(&mut attached)
                .map_err(|e| TransferError::new(request.clone(), FailureReason::Response(e))),
            Err(failure) => Err(TransferError::new(
                request.clone(),
                FailureReason::Transport(failure),
            )),
        };

        match engine.detach(batch, attached) {
            Ok(handle) => engine.release(handle),
            Err(e) => tracing::warn!(transfer = %id, error = %e, "detach failed"),
        }

        match &outcome {
            Ok(resp) => tracing::debug!(transfer = %id, status = resp.status(), "transfer completed"),
            Err(err) => tracing::debug!(transfer = %id, error = %err, "transfer failed"),
        }
        let callback = options.into_callback();
        callback(&request, outcome.as_ref());
        out.completed += 1;

        if let Err(err) = outcome {
            if out.first_error.is_none() {
                out.first_error = Some(err);
            } else {
                tracing::warn!(transfer = %id, error = %err, "additional transfer failure in batch");
            }
        }
    }
    out
}
