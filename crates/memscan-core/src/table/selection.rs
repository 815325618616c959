use serde::Serialize;

use crate::error::{Error, Result};
use crate::memory::layout::scan::{MAX_SELECTION, MAX_VALUE_LEN};

use super::ResultsTable;

/// Row the user picked out of the results.
///
/// `frozen` is only recorded; nothing writes the value back to the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionEntry {
    pub address: u64,
    value: String,
    pub frozen: bool,
}

impl SelectionEntry {
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value text, cut to at most 255 bytes
    pub fn edit_value(&mut self, text: &str) {
        let mut end = text.len().min(MAX_VALUE_LEN);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        self.value.clear();
        self.value.push_str(&text[..end]);
    }

    pub fn toggle_freeze(&mut self) -> bool {
        self.frozen = !self.frozen;
        self.frozen
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectionTable {
    entries: Vec<SelectionEntry>,
    capacity: usize,
}

impl SelectionTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
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

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SelectionEntry> {
        self.entries.get_mut(index)
    }

    /// Copy row `index` of `results` into the selection.
    ///
    /// Returns `IndexOutOfBounds` when the row does not exist and
    /// `SelectionFull` when the table is at capacity; the table is left
    /// untouched in both cases.
    pub fn add(&mut self, results: &ResultsTable, index: usize) -> Result<&SelectionEntry> {
        let row = results.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: results.len(),
        })?;
        if self.entries.len() >= self.capacity {
            return Err(Error::SelectionFull {
                capacity: self.capacity,
            });
        }

        let mut entry = SelectionEntry {
            address: row.address,
            value: String::new(),
            frozen: false,
        };
        entry.edit_value(&row.value);
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn remove(&mut self, index: usize) -> Result<SelectionEntry> {
        if index >= self.entries.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for SelectionTable {
    fn default() -> Self {
        Self::new(MAX_SELECTION)
    }
}
