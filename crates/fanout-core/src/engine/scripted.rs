//! In-memory engine for coordinator and client tests. Each URL can be
//! scripted to succeed, fail in transport, return an unparsable response, or
//! take several steps to finish; the engine counts every handle and batch it
//! creates and releases.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{Finished, StepStatus, TransferEngine, TransferId};
use crate::error::{EngineError, FailureKind, TransportFailure};
use crate::options::TransferOptions;
use crate::request::Request;
use crate::response::{parse, Response, ResponseError};

#[derive(Debug, Clone)]
pub(crate) enum Script {
    /// 200 OK, body is the URL.
    Ok,
    /// Transport failure with the given native code.
    Fail(i32),
    /// Finishes cleanly but produces no status line.
    Garbage,
}

#[derive(Debug, Clone)]
struct Plan {
    script: Script,
    steps: u32,
}

#[derive(Debug)]
pub(crate) struct ScriptedTransfer {
    id: TransferId,
    url: String,
    plan: Plan,
}

#[derive(Debug, Default)]
pub(crate) struct ScriptedBatch {
    in_flight: Vec<(TransferId, u32, Script)>,
    finished: Vec<Finished>,
}

#[derive(Debug, Default)]
pub(crate) struct ScriptedEngine {
    plans: HashMap<String, Plan>,
    pub(crate) handles_created: usize,
    pub(crate) handles_released: usize,
    pub(crate) batches_created: usize,
    pub(crate) batches_destroyed: usize,
    pub(crate) attached: usize,
    pub(crate) waits: usize,
    /// URLs in the order their handles were created.
    pub(crate) prepared_urls: Vec<String>,
    pub(crate) fail_create_batch: bool,
    /// Number of successful steps before every further step fails.
    pub(crate) fail_step_after: Option<u32>,
    pub(crate) steps_taken: u32,
    /// Extra notifications for ids nobody queued.
    pub(crate) unmatched: Vec<TransferId>,
    /// Steps that report `may_have_more` before settling.
    pub(crate) busy_steps: u32,
    /// URL whose handle cannot be created.
    pub(crate) fail_create_handle: Option<String>,
    /// URL whose handle cannot be attached.
    pub(crate) fail_attach: Option<String>,
    /// Detach, release and batch teardown, in call order. Shared so it can be
    /// read after the coordinator owning the engine is gone.
    pub(crate) events: Rc<RefCell<Vec<String>>>,
}

impl ScriptedEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Scripts `url` to end with `script` after `steps` steps (minimum 1).
    pub(crate) fn script(mut self, url: &str, script: Script, steps: u32) -> Self {
        self.plans.insert(
            url.to_string(),
            Plan {
                script,
                steps: steps.max(1),
            },
        );
        self
    }
}

impl TransferEngine for ScriptedEngine {
    type Batch = ScriptedBatch;
    type Handle = ScriptedTransfer;
    type Attached = ScriptedTransfer;

    fn create_batch(&mut self) -> Result<ScriptedBatch, EngineError> {
        if self.fail_create_batch {
            return Err(EngineError::CreateBatch("scripted".to_string()));
        }
        self.batches_created += 1;
        Ok(ScriptedBatch::default())
    }

    fn create_handle(
        &mut self,
        id: TransferId,
        request: &Request,
        _options: &TransferOptions,
    ) -> Result<ScriptedTransfer, EngineError> {
        if self.fail_create_handle.as_deref() == Some(request.url()) {
            return Err(EngineError::CreateHandle("scripted".to_string()));
        }
        self.handles_created += 1;
        self.prepared_urls.push(request.url().to_string());
        let plan = self.plans.get(request.url()).cloned().unwrap_or(Plan {
            script: Script::Ok,
            steps: 1,
        });
        Ok(ScriptedTransfer {
            id,
            url: request.url().to_string(),
            plan,
        })
    }

    fn attach(
        &mut self,
        batch: &mut ScriptedBatch,
        handle: ScriptedTransfer,
    ) -> Result<ScriptedTransfer, EngineError> {
        if self.fail_attach.as_deref() == Some(handle.url.as_str()) {
            self.release(handle);
            return Err(EngineError::Attach("scripted".to_string()));
        }
        self.attached += 1;
        batch
            .in_flight
            .push((handle.id, handle.plan.steps, handle.plan.script.clone()));
        Ok(handle)
    }

    fn detach(
        &mut self,
        batch: &mut ScriptedBatch,
        attached: ScriptedTransfer,
    ) -> Result<ScriptedTransfer, EngineError> {
        self.attached -= 1;
        self.events.borrow_mut().push(format!("detach {}", attached.id));
        batch.in_flight.retain(|(id, ..)| *id != attached.id);
        Ok(attached)
    }

    fn step(&mut self, batch: &mut ScriptedBatch) -> Result<StepStatus, EngineError> {
        if self.fail_step_after.is_some_and(|n| self.steps_taken >= n) {
            return Err(EngineError::Step("scripted".to_string()));
        }
        self.steps_taken += 1;
        if self.busy_steps > 0 {
            self.busy_steps -= 1;
            return Ok(StepStatus {
                still_active: !batch.in_flight.is_empty(),
                may_have_more: true,
            });
        }
        let mut still = Vec::new();
        for (id, left, script) in batch.in_flight.drain(..) {
            if left <= 1 {
                let result = match script {
                    Script::Fail(code) => Err(TransportFailure {
                        code,
                        message: "scripted failure".to_string(),
                        kind: FailureKind::Connection,
                    }),
                    Script::Ok | Script::Garbage => Ok(()),
                };
                batch.finished.push(Finished { id, result });
            } else {
                still.push((id, left - 1, script));
            }
        }
        batch.in_flight = still;
        Ok(StepStatus {
            still_active: !batch.in_flight.is_empty(),
            may_have_more: false,
        })
    }

    fn wait_ready(&mut self, _batch: &mut ScriptedBatch) -> Result<(), EngineError> {
        self.waits += 1;
        Ok(())
    }

    fn poll_finished(&mut self, batch: &mut ScriptedBatch) -> Vec<Finished> {
        let mut out: Vec<Finished> = self
            .unmatched
            .drain(..)
            .map(|id| Finished { id, result: Ok(()) })
            .collect();
        out.append(&mut batch.finished);
        out
    }

    fn build_response(&mut self, attached: &mut ScriptedTransfer) -> Result<Response, ResponseError> {
        match attached.plan.script {
            Script::Garbage => parse::build(&[], Vec::new()),
            _ => parse::build(
                &["HTTP/1.1 200 OK".to_string()],
                attached.url.clone().into_bytes(),
            ),
        }
    }

    fn release(&mut self, handle: ScriptedTransfer) {
        self.handles_released += 1;
        self.events.borrow_mut().push(format!("release {}", handle.id));
        drop(handle);
    }

    fn destroy_batch(&mut self, batch: ScriptedBatch) {
        self.batches_destroyed += 1;
        self.events.borrow_mut().push("destroy batch".to_string());
        drop(batch);
    }
}
