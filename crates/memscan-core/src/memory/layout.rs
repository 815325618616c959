//! Memory layout constants for region walking and scanning
//!
//! Region state and protection values mirror the Windows
//! `MEMORY_BASIC_INFORMATION` encoding so the mock and the live process share
//! one vocabulary.

/// Region allocation states (`MEMORY_BASIC_INFORMATION::State`)
pub mod state {
    pub const COMMIT: u32 = 0x1000;
    pub const RESERVE: u32 = 0x2000;
    pub const FREE: u32 = 0x10000;
}

/// Page protection bits (`MEMORY_BASIC_INFORMATION::Protect`)
pub mod protect {
    pub const NOACCESS: u32 = 0x01;
    pub const READONLY: u32 = 0x02;
    pub const READWRITE: u32 = 0x04;
    pub const EXECUTE_READ: u32 = 0x20;
    pub const GUARD: u32 = 0x100;

    /// Pages that can never be read, regardless of the other bits
    pub const UNREADABLE: u32 = NOACCESS | GUARD;
}

/// Sizing defaults for scanning sessions
pub mod scan {
    /// Bytes read from the target in one bulk read (1MB)
    pub const CHUNK_SIZE: usize = 1024 * 1024;

    /// Largest accepted chunk size (64MB)
    pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

    /// Initial capacity of a fresh candidate set
    pub const INITIAL_CANDIDATE_CAPACITY: usize = 100_000;

    /// Maximum rows in the results table
    pub const MAX_RESULTS: usize = 1024;

    /// Maximum rows in the selection table
    pub const MAX_SELECTION: usize = 1024;

    /// Longest value text kept in a selection entry, in bytes
    pub const MAX_VALUE_LEN: usize = 255;
}
