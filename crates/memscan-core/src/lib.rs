//! # memscan-core
//!
//! Scanning engine for live process memory.
//!
//! This crate provides:
//! - A growable candidate buffer for millions of addresses
//! - Parsing and formatting of 1/2/4/8-byte unsigned values
//! - Region-walking first scans over a foreign address space
//! - Refine passes that re-test existing candidates
//! - Results and selection tables for display
//!
//! Process access goes through the [`ReadMemory`] and [`QueryMemory`] traits.
//! [`ProcessHandle`] implements both for live Windows processes;
//! [`MockMemoryReader`] implements both for tests.

pub mod buffer;
pub mod config;
pub mod error;
pub mod memory;
pub mod prelude;
pub mod scan;
pub mod session;
pub mod table;
pub mod value;

pub use buffer::GrowableBuffer;
pub use config::{ScanConfig, ScanConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use memory::{
    MemoryRegion, MockMemoryBuilder, MockMemoryReader, ProcessHandle, QueryMemory, ReadMemory,
    RegionState,
};
pub use scan::{MemoryScanner, RefineStats, ScanStats};
pub use session::{NO_PREVIOUS_VALUE, ScanSession};
pub use table::{ResultEntry, ResultsTable, SelectionEntry, SelectionTable};
pub use value::{TargetPattern, UNKNOWN_VALUE, ValueType, format_value, parse_value};
