use serde::Serialize;
use tracing::debug;

use crate::buffer::GrowableBuffer;
use crate::memory::ReadMemory;
use crate::memory::layout::scan::MAX_RESULTS;
use crate::value::{UNKNOWN_VALUE, ValueType, format_value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultEntry {
    pub address: u64,
    pub value: String,
    pub previous_value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsTable {
    entries: Vec<ResultEntry>,
    capacity: usize,
}

impl ResultsTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&ResultEntry> {
        self.entries.get(index)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Rebuild the table from the first `capacity` candidates.
    ///
    /// Returns the number of rows now in the table; candidates past the cap are
    /// left out without error.
    pub fn materialize(
        &mut self,
        candidates: &GrowableBuffer<u64>,
        current: &str,
        previous: &str,
    ) -> usize {
        self.entries.clear();
        let shown = self.capacity.min(candidates.len());

        self.entries.extend(candidates.iter().take(shown).map(|&address| ResultEntry {
            address,
            value: current.to_owned(),
            previous_value: previous.to_owned(),
        }));

        if candidates.len() > shown {
            debug!(
                "Showing {} of {} candidates",
                shown,
                candidates.len()
            );
        }
        shown
    }

    /// Replace each row's value with what the target currently holds.
    ///
    /// Rows whose address can no longer be read show `???`.
    pub fn refresh_values<R: ReadMemory>(&mut self, reader: &R, value_type: ValueType) {
        let width = value_type.width();
        let mut raw = [0u8; 8];
        for entry in &mut self.entries {
            entry.value = match reader.read_into(entry.address, &mut raw[..width]) {
                Ok(read) if read == width => format_value(&raw[..width]),
                _ => UNKNOWN_VALUE.to_string(),
            };
        }
    }
}

impl Default for ResultsTable {
    fn default() -> Self {
        Self::new(MAX_RESULTS)
    }
}
