//! Session sizing configuration.

use crate::memory::layout::scan::{
    CHUNK_SIZE, INITIAL_CANDIDATE_CAPACITY, MAX_CHUNK_SIZE, MAX_RESULTS, MAX_SELECTION,
};

/// Configuration for a [`ScanSession`](crate::session::ScanSession)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Bytes per bulk read during a first scan
    pub chunk_size: usize,
    /// Capacity the candidate set is reset to before a first scan
    pub initial_capacity: usize,
    /// Maximum rows in the results table
    pub max_results: usize,
    /// Maximum rows in the selection table
    pub max_selection: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            initial_capacity: INITIAL_CANDIDATE_CAPACITY,
            max_results: MAX_RESULTS,
            max_selection: MAX_SELECTION,
        }
    }
}

impl ScanConfig {
    /// Create a new configuration builder
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }
}

/// Builder for ScanConfig
#[derive(Debug, Clone, Default)]
pub struct ScanConfigBuilder {
    chunk_size: Option<usize>,
    initial_capacity: Option<usize>,
    max_results: Option<usize>,
    max_selection: Option<usize>,
}

impl ScanConfigBuilder {
    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = Some(bytes);
        self
    }

    pub fn initial_capacity(mut self, addresses: usize) -> Self {
        self.initial_capacity = Some(addresses);
        self
    }

    pub fn max_results(mut self, rows: usize) -> Self {
        self.max_results = Some(rows);
        self
    }

    pub fn max_selection(mut self, rows: usize) -> Self {
        self.max_selection = Some(rows);
        self
    }

    /// Build the configuration; zero sizes are raised to 1 and the chunk size
    /// is capped at 64MB
    pub fn build(self) -> ScanConfig {
        let default = ScanConfig::default();
        ScanConfig {
            chunk_size: self
                .chunk_size
                .unwrap_or(default.chunk_size)
                .clamp(1, MAX_CHUNK_SIZE),
            initial_capacity: self
                .initial_capacity
                .unwrap_or(default.initial_capacity)
                .max(1),
            max_results: self.max_results.unwrap_or(default.max_results).max(1),
            max_selection: self.max_selection.unwrap_or(default.max_selection).max(1),
        }
    }
}
