//! Easy2 handler that collects one transfer's final response.

use std::mem;

use crate::engine::TransferId;
use crate::response::{parse, Response, ResponseError};

/// Handler state for one transfer. Implements curl's Handler for Easy2.
#[derive(Debug)]
pub struct ResponseCollector {
    id: TransferId,
    /// Header lines of the latest response only (status line first).
    lines: Vec<String>,
    body: Vec<u8>,
}

impl ResponseCollector {
    pub(super) fn new(id: TransferId) -> Self {
        Self {
            id,
            lines: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn id(&self) -> TransferId {
        self.id
    }

    /// Builds the response from what was collected, leaving the collector empty.
    pub(super) fn take_response(&mut self) -> Result<Response, ResponseError> {
        let lines = mem::take(&mut self.lines);
        parse::build(&lines, mem::take(&mut self.body))
    }
}

impl curl::easy::Handler for ResponseCollector {
    fn header(&mut self, data: &[u8]) -> bool {
        let raw = String::from_utf8_lossy(data);
        let line = raw.trim_end();
        // Interim (1xx) and redirect responses each start a new block;
        // only the last block describes the response we return.
        if line.starts_with("HTTP/") {
            self.lines.clear();
            self.body.clear();
        }
        if !line.is_empty() {
            self.lines.push(line.to_string());
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, curl::easy::WriteError> {
        self.body.extend_from_slice(data);
        Ok(data.len())
    }
}
