use serde::Serialize;

use super::layout::{protect, state};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RegionState {
    Committed,
    Reserved,
    Free,
}

impl RegionState {
    pub fn from_raw(value: u32) -> Self {
        match value {
            state::COMMIT => Self::Committed,
            state::RESERVE => Self::Reserved,
            _ => Self::Free,
        }
    }
}

/// Contiguous range of a process's address space with uniform attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryRegion {
    pub base: u64,
    pub size: u64,
    pub state: RegionState,
    pub protect: u32,
}

impl MemoryRegion {
    pub fn end(&self) -> u64 {
        self.base.saturating_add(self.size)
    }

    /// Committed and not NOACCESS/GUARD
    pub fn is_scannable(&self) -> bool {
        self.state == RegionState::Committed && self.protect & protect::UNREADABLE == 0
    }

    pub fn contains(&self, address: u64) -> bool {
        address >= self.base && address < self.end()
    }
}
