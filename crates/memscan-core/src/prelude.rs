//! Prelude module for convenient imports
//!
//! ```ignore
//! use memscan_core::prelude::*;
//! ```
//!
//! This brings the following into scope:
//!
//! - Session types: `ScanSession`, `ScanConfig`
//! - Process access: `ProcessHandle`, `ReadMemory`, `QueryMemory`
//! - Values: `ValueType`, `TargetPattern`
//! - Tables: `ResultsTable`, `SelectionTable`
//! - Error handling: `Error`, `Result`

pub use crate::config::ScanConfig;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::memory::{ProcessHandle, QueryMemory, ReadMemory};
pub use crate::session::ScanSession;
pub use crate::table::{ResultEntry, ResultsTable, SelectionEntry, SelectionTable};
pub use crate::value::{TargetPattern, ValueType};
