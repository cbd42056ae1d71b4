//! Transfer queue: entries in insertion order, each Queued (request and
//! options only) or Prepared (additionally owns its attached engine handle).

use crate::engine::TransferId;
use crate::options::TransferOptions;
use crate::request::Request;

/// Lifecycle state of a queue entry. Completion removes the entry.
pub(crate) enum EntryState<A> {
    Queued,
    Prepared(A),
}

pub(crate) struct QueueEntry<A> {
    pub(crate) id: TransferId,
    pub(crate) request: Request,
    pub(crate) options: TransferOptions,
    pub(crate) state: EntryState<A>,
}

impl<A> QueueEntry<A> {
    pub(crate) fn is_queued(&self) -> bool {
        matches!(self.state, EntryState::Queued)
    }
}

/// Ordered collection of pending transfers. Ids are handed out from 1 and
/// never reused by one queue.
pub(crate) struct TransferQueue<A> {
    entries: Vec<QueueEntry<A>>,
    next_id: usize,
}

impl<A> Default for TransferQueue<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl<A> TransferQueue<A> {
    pub(crate) fn enqueue(&mut self, request: Request, options: TransferOptions) -> TransferId {
        let id = TransferId::new(self.next_id);
        self.next_id += 1;
        self.entries.push(QueueEntry {
            id,
            request,
            options,
            state: EntryState::Queued,
        });
        id
    }

    /// Queued + Prepared entries.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries still waiting for a transfer handle, in insertion order.
    pub(crate) fn queued_mut(&mut self) -> impl Iterator<Item = &mut QueueEntry<A>> {
        self.entries.iter_mut().filter(|e| e.is_queued())
    }

    #[cfg(test)]
    pub(crate) fn prepared_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_queued()).count()
    }

    /// Removes the Prepared entry carrying `id`. Queued entries never match:
    /// they have no handle the engine could report on.
    pub(crate) fn take_prepared(&mut self, id: TransferId) -> Option<QueueEntry<A>> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.id == id && !e.is_queued())?;
        Some(self.entries.remove(pos))
    }

    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, QueueEntry<A>> {
        self.entries.drain(..)
    }
}
