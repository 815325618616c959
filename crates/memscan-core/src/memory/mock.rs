//! In-memory address space used in place of a live process in tests.
//!
//! ```ignore
//! let memory = MockMemoryBuilder::new()
//!     .region(0x1000, vec![0; 0x1000])
//!     .inaccessible(0x2000, 0x1000)
//!     .fail_reads(0x1800..0x1900)
//!     .build();
//! ```

use std::cell::Cell;
use std::ops::Range;

use crate::error::{Error, Result};

use super::layout::protect;
use super::{MemoryRegion, QueryMemory, ReadMemory, RegionState};

#[derive(Debug, Clone)]
struct MockRegion {
    region: MemoryRegion,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct MockMemoryBuilder {
    regions: Vec<MockRegion>,
    failing: Vec<Range<u64>>,
    short: Vec<u64>,
    query_error_at: Option<u64>,
}

impl MockMemoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed, read-write region holding `data`
    pub fn region(self, base: u64, data: Vec<u8>) -> Self {
        self.region_with(base, data, RegionState::Committed, protect::READWRITE)
    }

    /// Committed region that refuses all access
    pub fn inaccessible(self, base: u64, size: usize) -> Self {
        self.region_with(base, vec![0; size], RegionState::Committed, protect::NOACCESS)
    }

    /// Reserved region with no backing pages
    pub fn reserved(self, base: u64, size: usize) -> Self {
        self.region_with(base, vec![0; size], RegionState::Reserved, protect::NOACCESS)
    }

    pub fn region_with(mut self, base: u64, data: Vec<u8>, state: RegionState, protect: u32) -> Self {
        self.regions.push(MockRegion {
            region: MemoryRegion {
                base,
                size: data.len() as u64,
                state,
                protect,
            },
            data,
        });
        self
    }

    /// Any read touching `range` fails outright
    pub fn fail_reads(mut self, range: Range<u64>) -> Self {
        self.failing.push(range);
        self
    }

    /// Reads spanning `address` stop just before it
    pub fn short_read_at(mut self, address: u64) -> Self {
        self.short.push(address);
        self
    }

    /// Region queries at or past `address` fail with an OS error
    pub fn fail_query_at(mut self, address: u64) -> Self {
        self.query_error_at = Some(address);
        self
    }

    pub fn build(mut self) -> MockMemoryReader {
        self.regions.sort_by_key(|r| r.region.base);
        MockMemoryReader {
            regions: self.regions,
            failing: self.failing,
            short: self.short,
            query_error_at: self.query_error_at,
            reads: Cell::new(0),
        }
    }
}

#[derive(Debug)]
pub struct MockMemoryReader {
    regions: Vec<MockRegion>,
    failing: Vec<Range<u64>>,
    short: Vec<u64>,
    query_error_at: Option<u64>,
    reads: Cell<usize>,
}

impl MockMemoryReader {
    /// Number of `read_into` calls served so far
    pub fn read_count(&self) -> usize {
        self.reads.get()
    }

    /// Overwrite bytes in place, as the target process would
    pub fn write(&mut self, address: u64, bytes: &[u8]) {
        let entry = self
            .regions
            .iter_mut()
            .find(|r| r.region.contains(address))
            .expect("write outside mock regions");
        let offset = (address - entry.region.base) as usize;
        entry.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    fn find(&self, address: u64) -> Option<&MockRegion> {
        self.regions.iter().find(|r| r.region.contains(address))
    }
}

impl ReadMemory for MockMemoryReader {
    fn read_into(&self, address: u64, buffer: &mut [u8]) -> Result<usize> {
        self.reads.set(self.reads.get() + 1);
        let end = address.saturating_add(buffer.len() as u64);
        let fail = |message: &str| Error::MemoryReadFailed {
            address,
            message: message.to_string(),
        };

        if self.failing.iter().any(|r| r.start < end && address < r.end) {
            return Err(fail("injected read failure"));
        }

        let entry = self.find(address).ok_or_else(|| fail("unmapped"))?;
        if !entry.region.is_scannable() {
            return Err(fail("access denied"));
        }

        let mut stop = end.min(entry.region.end());
        if let Some(&cut) = self.short.iter().filter(|&&a| a > address && a < stop).min() {
            stop = cut;
        }
        if self.short.contains(&address) {
            return Err(fail("injected short read"));
        }

        let offset = (address - entry.region.base) as usize;
        let len = (stop - address) as usize;
        buffer[..len].copy_from_slice(&entry.data[offset..offset + len]);
        Ok(len)
    }
}

impl QueryMemory for MockMemoryReader {
    fn query_region(&self, address: u64) -> Result<Option<MemoryRegion>> {
        if self.query_error_at.is_some_and(|a| address >= a) {
            return Err(Error::RegionQueryFailed {
                address,
                message: "injected query failure".to_string(),
            });
        }

        if let Some(entry) = self.find(address) {
            return Ok(Some(entry.region));
        }

        // Gaps between regions are reported as free space, like the OS does
        Ok(self
            .regions
            .iter()
            .find(|r| r.region.base > address)
            .map(|next| MemoryRegion {
                base: address,
                size: next.region.base - address,
                state: RegionState::Free,
                protect: protect::NOACCESS,
            }))
    }
}
