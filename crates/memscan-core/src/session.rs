//! Scanning session state.
//!
//! A `ScanSession` owns the one live candidate set together with the results
//! and selection tables derived from it. The shell drives it with two calls:
//!
//! ```ignore
//! use memscan_core::{ProcessHandle, ScanSession, ValueType};
//!
//! let process = ProcessHandle::open(pid)?;
//! let mut session = ScanSession::new();
//! session.set_value_type(ValueType::FourBytes);
//!
//! session.first_scan(&process, "100")?; // whole address space
//! session.next_scan(&process, "99")?;   // only the survivors
//!
//! for row in session.results().entries() {
//!     println!("0x{:X} {} {}", row.address, row.value, row.previous_value);
//! }
//! session.add_to_selection(0)?;
//! ```
//!
//! Calls are synchronous and take `&mut self`, so one session never sees two
//! passes at once. A session is `Send` and can be moved to a worker thread.

use tracing::{debug, info};

use crate::buffer::GrowableBuffer;
use crate::config::ScanConfig;
use crate::error::Result;
use crate::memory::{QueryMemory, ReadMemory};
use crate::scan::{MemoryScanner, RefineStats, ScanStats};
use crate::table::{ResultsTable, SelectionEntry, SelectionTable};
use crate::value::{ValueType, parse_value};

/// Previous-value text shown before any pass has succeeded
pub const NO_PREVIOUS_VALUE: &str = "N/A";

#[derive(Debug)]
pub struct ScanSession {
    config: ScanConfig,
    value_type: ValueType,
    candidates: GrowableBuffer<u64>,
    results: ResultsTable,
    selection: SelectionTable,
    previous_value: String,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::with_config(ScanConfig::default())
    }

    pub fn with_config(config: ScanConfig) -> Self {
        Self {
            candidates: GrowableBuffer::with_capacity(config.initial_capacity),
            results: ResultsTable::new(config.max_results),
            selection: SelectionTable::new(config.max_selection),
            value_type: ValueType::default(),
            previous_value: NO_PREVIOUS_VALUE.to_string(),
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn set_value_type(&mut self, value_type: ValueType) {
        if value_type != self.value_type {
            debug!("Value type changed: {} -> {}", self.value_type, value_type);
        }
        self.value_type = value_type;
    }

    pub fn candidates(&self) -> &GrowableBuffer<u64> {
        &self.candidates
    }

    pub fn results(&self) -> &ResultsTable {
        &self.results
    }

    pub fn selection(&self) -> &SelectionTable {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionTable {
        &mut self.selection
    }

    /// Value text of the last successful pass
    pub fn previous_value(&self) -> &str {
        &self.previous_value
    }

    /// Scan the whole address space for `text`, discarding earlier candidates.
    ///
    /// On a failed region walk the matches found so far are kept and shown,
    /// and the error is still returned.
    pub fn first_scan<M: ReadMemory + QueryMemory>(
        &mut self,
        memory: &M,
        text: &str,
    ) -> Result<ScanStats> {
        let pattern = parse_value(text, self.value_type)?;

        self.results.clear();
        self.candidates.reset(self.config.initial_capacity);
        self.previous_value = NO_PREVIOUS_VALUE.to_string();

        let outcome = MemoryScanner::with_chunk_size(memory, self.config.chunk_size)
            .scan(&pattern, &mut self.candidates);

        if !self.candidates.is_empty() {
            self.results
                .materialize(&self.candidates, text.trim(), &self.previous_value);
        }
        let stats = outcome?;

        info!(
            "First scan for {} ({}): {} candidates",
            text.trim(),
            self.value_type,
            self.candidates.len()
        );
        self.previous_value = text.trim().to_string();
        Ok(stats)
    }

    /// Narrow the current candidates to those now holding `text`
    pub fn next_scan<M: ReadMemory + QueryMemory>(
        &mut self,
        memory: &M,
        text: &str,
    ) -> Result<RefineStats> {
        let pattern = parse_value(text, self.value_type)?;

        let outcome = MemoryScanner::with_chunk_size(memory, self.config.chunk_size)
            .refine(&pattern, &mut self.candidates);

        self.results
            .materialize(&self.candidates, text.trim(), &self.previous_value);
        let stats = outcome?;

        info!(
            "Next scan for {} ({}): {} candidates remain",
            text.trim(),
            self.value_type,
            self.candidates.len()
        );
        self.previous_value = text.trim().to_string();
        Ok(stats)
    }

    /// Re-read the values shown in the results table
    pub fn refresh_results<R: ReadMemory>(&mut self, reader: &R) {
        self.results.refresh_values(reader, self.value_type);
    }

    pub fn add_to_selection(&mut self, index: usize) -> Result<&SelectionEntry> {
        self.selection.add(&self.results, index)
    }

    /// Drop candidates, results and selection, as when switching processes
    pub fn reset(&mut self) {
        self.candidates.reset(self.config.initial_capacity);
        self.results.clear();
        self.selection.clear();
        self.previous_value = NO_PREVIOUS_VALUE.to_string();
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};
    use crate::memory::MockMemoryBuilder;

    fn small_config() -> ScanConfig {
        ScanConfig::builder()
            .chunk_size(0x40)
            .initial_capacity(2)
            .max_results(4)
            .build()
    }

    #[test]
    fn test_session_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ScanSession>();
    }

    #[test]
    fn test_first_scan_materializes_results() {
        let mut data = vec![0u8; 0x100];
        data[0x20] = 42;
        data[0x90] = 42;
        let memory = MockMemoryBuilder::new().region(0x1000, data).build();

        let mut session = ScanSession::with_config(small_config());
        session.set_value_type(ValueType::Byte);
        let stats = session.first_scan(&memory, "0x2A").unwrap();

        assert_eq!(stats.matches_found, 2);
        assert_eq!(session.candidates().as_slice(), &[0x1020, 0x1090]);
        assert_eq!(session.results().len(), 2);
        assert_eq!(session.results().entries()[0].value, "0x2A");
        assert_eq!(session.results().entries()[0].previous_value, NO_PREVIOUS_VALUE);
        assert_eq!(session.previous_value(), "0x2A");
    }

    #[test]
    fn test_first_scan_invalid_input_keeps_state() {
        let memory = MockMemoryBuilder::new().region(0x1000, vec![1; 0x10]).build();
        let mut session = ScanSession::with_config(small_config());
        session.set_value_type(ValueType::Byte);
        session.first_scan(&memory, "1").unwrap();

        let err = session.first_scan(&memory, "300").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(session.candidates().len(), 0x10);
        assert_eq!(session.previous_value(), "1");
    }

    #[test]
    fn test_first_scan_no_matches() {
        let memory = MockMemoryBuilder::new().region(0x1000, vec![0; 0x10]).build();
        let mut session = ScanSession::with_config(small_config());
        let err = session.first_scan(&memory, "5").unwrap_err();

        assert!(err.is_no_match());
        assert!(session.candidates().is_empty());
        assert!(session.results().is_empty());
        assert_eq!(session.previous_value(), NO_PREVIOUS_VALUE);
    }

    #[test]
    fn test_first_scan_with_oversized_chunk_config() {
        let mut data = vec![0u8; 0x20];
        data[0x04] = 7;
        let memory = MockMemoryBuilder::new().region(0x1000, data).build();

        let config = ScanConfig::builder().chunk_size(usize::MAX).build();
        let mut session = ScanSession::with_config(config);
        session.set_value_type(ValueType::Byte);
        session.first_scan(&memory, "7").unwrap();
        assert_eq!(session.candidates().as_slice(), &[0x1004]);
    }

    #[test]
    fn test_next_scan_narrows_and_tracks_previous() {
        let mut data = vec![0u8; 0x40];
        for offset in [0x00usize, 0x10, 0x20, 0x30] {
            data[offset..offset + 2].copy_from_slice(&500u16.to_ne_bytes());
        }
        let mut memory = MockMemoryBuilder::new().region(0x2000, data).build();

        let mut session = ScanSession::with_config(small_config());
        session.set_value_type(ValueType::TwoBytes);
        session.first_scan(&memory, "500").unwrap();
        assert_eq!(session.candidates().len(), 4);

        memory.write(0x2010, &499u16.to_ne_bytes());
        memory.write(0x2030, &499u16.to_ne_bytes());
        let stats = session.next_scan(&memory, "499").unwrap();

        assert_eq!(stats.addresses_checked, 4);
        assert_eq!(session.candidates().as_slice(), &[0x2010, 0x2030]);
        let rows = session.results().entries();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].value, "499");
        assert_eq!(rows[1].previous_value, "500");
        assert_eq!(session.previous_value(), "499");
    }

    #[test]
    fn test_next_scan_to_empty_clears_results() {
        let memory = MockMemoryBuilder::new().region(0x1000, vec![3; 8]).build();
        let mut session = ScanSession::with_config(small_config());
        session.set_value_type(ValueType::Byte);
        session.first_scan(&memory, "3").unwrap();

        let err = session.next_scan(&memory, "4").unwrap_err();
        assert!(matches!(err, Error::NoMatches));
        assert!(session.candidates().is_empty());
        assert!(session.results().is_empty());
        assert_eq!(session.previous_value(), "3");
    }

    #[test]
    fn test_selection_survives_rescans() {
        let memory = MockMemoryBuilder::new().region(0x1000, vec![9; 8]).build();
        let mut session = ScanSession::with_config(small_config());
        session.set_value_type(ValueType::Byte);
        session.first_scan(&memory, "9").unwrap();

        // Results are capped even though all eight bytes match
        assert_eq!(session.candidates().len(), 8);
        assert_eq!(session.results().len(), 4);
        assert!(session.add_to_selection(4).is_err());

        let entry = session.add_to_selection(3).unwrap();
        assert_eq!(entry.address, 0x1003);

        session.first_scan(&memory, "10").unwrap_err();
        assert_eq!(session.selection().len(), 1);
        session.selection_mut().get_mut(0).unwrap().toggle_freeze();
        assert!(session.selection().entries()[0].frozen);

        session.reset();
        assert!(session.selection().is_empty());
        assert_eq!(session.candidates().capacity(), 2);
    }
}
