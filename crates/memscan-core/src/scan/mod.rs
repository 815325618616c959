//! Exact-value scanning over a foreign address space
//!
//! # First scan
//!
//! The region walk starts at address 0 and asks for the region containing the
//! current address until the OS reports the end of the address space:
//!
//! ```text
//!  0x0                                                        end
//!  │ free │ committed RW          │ reserved │ committed RO │ ...
//!         ├── chunk ──┼── chunk ──┤          ├── chunk ─────┤
//!                   ╰ overlap ╯
//! ```
//!
//! Committed, readable regions are read in bounded chunks. Each read extends
//! `width - 1` bytes into the next chunk of the same region so that a value
//! straddling the boundary is seen once, by the chunk it starts in. If the
//! overlap runs into an unreadable page, the chunk is read again on its own.
//!
//! # Refine
//!
//! Every candidate gets a point read of exactly `width` bytes. Survivors are
//! collected into a new buffer that then replaces the old set wholesale.

mod refine;
mod types;
mod utils;

use tracing::{debug, info, trace, warn};

use crate::buffer::GrowableBuffer;
use crate::error::{Error, Result};
use crate::memory::layout::scan::{CHUNK_SIZE, MAX_CHUNK_SIZE};
use crate::memory::{MemoryRegion, QueryMemory, ReadMemory};
use crate::value::TargetPattern;

pub use types::*;
pub use utils::match_offsets;

/// Largest supported value width; sizes the chunk overlap
const MAX_VALUE_WIDTH: usize = 8;

pub struct MemoryScanner<'a, M: ReadMemory + QueryMemory> {
    memory: &'a M,
    chunk_size: usize,
    buffer: Vec<u8>,
}

impl<'a, M: ReadMemory + QueryMemory> MemoryScanner<'a, M> {
    pub fn new(memory: &'a M) -> Self {
        Self::with_chunk_size(memory, CHUNK_SIZE)
    }

    pub fn with_chunk_size(memory: &'a M, chunk_size: usize) -> Self {
        Self {
            memory,
            chunk_size: chunk_size.clamp(1, MAX_CHUNK_SIZE),
            buffer: Vec::new(),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Walk the whole address space and append every address holding `pattern`.
    ///
    /// `candidates` is appended to, not cleared; callers reset it first. Matches
    /// recorded before a failed region query stay in `candidates`.
    pub fn scan(
        &mut self,
        pattern: &TargetPattern,
        candidates: &mut GrowableBuffer<u64>,
    ) -> Result<ScanStats> {
        debug!(
            "Starting memory scan for {} ({} bytes)",
            pattern.value(),
            pattern.width()
        );

        if self.buffer.len() < self.chunk_size + MAX_VALUE_WIDTH - 1 {
            self.buffer = vec![0u8; self.chunk_size + MAX_VALUE_WIDTH - 1];
        }

        let mut stats = ScanStats::default();
        let mut address = 0u64;

        loop {
            let region = match self.memory.query_region(address) {
                Ok(Some(region)) => region,
                Ok(None) => {
                    debug!("Reached end of address space at 0x{:X}", address);
                    break;
                }
                Err(e) => {
                    warn!(
                        "Region walk aborted after {} regions ({} matches kept): {}",
                        stats.regions_visited, stats.matches_found, e
                    );
                    return Err(e);
                }
            };

            stats.regions_visited += 1;
            let start = region.base.max(address);

            if region.is_scannable() {
                debug!(
                    "Scanning region 0x{:X}-0x{:X} ({} bytes, protect 0x{:X})",
                    start,
                    region.end(),
                    region.end() - start,
                    region.protect
                );
                self.scan_region(start, &region, pattern, candidates, &mut stats);
            } else {
                stats.regions_skipped += 1;
            }

            let next = region.end();
            if next <= address {
                debug!("Region walk stopped advancing at 0x{:X}", address);
                break;
            }
            address = next;
        }

        info!(
            "Scan complete: {} regions ({} skipped), {} chunks, {} read errors, {} partial reads, {} matches",
            stats.regions_visited,
            stats.regions_skipped,
            stats.chunks_scanned,
            stats.read_errors,
            stats.partial_reads,
            stats.matches_found
        );

        if stats.matches_found == 0 {
            return Err(Error::NoMatches);
        }
        Ok(stats)
    }

    fn scan_region(
        &mut self,
        start: u64,
        region: &MemoryRegion,
        pattern: &TargetPattern,
        candidates: &mut GrowableBuffer<u64>,
        stats: &mut ScanStats,
    ) {
        let end = region.end();
        let overlap = (pattern.width() - 1) as u64;
        let mut chunk_base = start;

        while chunk_base < end {
            let remaining = end - chunk_base;
            let chunk_len = remaining.min(self.chunk_size as u64) as usize;
            let read_len = remaining.min(self.chunk_size as u64 + overlap) as usize;

            let read = match self
                .memory
                .read_into(chunk_base, &mut self.buffer[..read_len])
            {
                // The overlap may reach into an unreadable neighbour
                Err(e) if read_len > chunk_len => {
                    trace!(
                        "Overlapping read at 0x{:X} failed, retrying {} bytes: {}",
                        chunk_base, chunk_len, e
                    );
                    self.memory
                        .read_into(chunk_base, &mut self.buffer[..chunk_len])
                }
                other => other,
            };

            match read {
                Ok(bytes_read) => {
                    if bytes_read < read_len {
                        stats.partial_reads += 1;
                        debug!(
                            "Partial read at 0x{:X} ({}/{} bytes)",
                            chunk_base, bytes_read, read_len
                        );
                    }
                    stats.chunks_scanned += 1;

                    let haystack = &self.buffer[..bytes_read];
                    for offset in match_offsets(haystack, pattern.bytes(), chunk_len) {
                        candidates.append(chunk_base + offset as u64);
                        stats.matches_found += 1;
                    }
                }
                Err(e) => {
                    stats.read_errors += 1;
                    debug!("Skipping chunk at 0x{:X}: {}", chunk_base, e);
                }
            }

            chunk_base += chunk_len as u64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MockMemoryBuilder;
    use crate::value::{ValueType, parse_value};

    fn byte_pattern(value: u8) -> TargetPattern {
        TargetPattern::new(ValueType::Byte, value as u64).unwrap()
    }

    fn region_with<const N: usize>(size: usize, values: &[(usize, [u8; N])]) -> Vec<u8> {
        let mut data = vec![0u8; size];
        for (offset, bytes) in values {
            data[*offset..*offset + N].copy_from_slice(bytes);
        }
        data
    }

    fn three_region_memory() -> crate::memory::MockMemoryReader {
        let mut hidden = vec![0u8; 0x100];
        hidden[0x10] = 0x2A;
        MockMemoryBuilder::new()
            .region_with(
                0x1000,
                hidden,
                crate::memory::RegionState::Committed,
                crate::memory::layout::protect::NOACCESS,
            )
            .region(0x2000, region_with(0x100, &[(0x08, [0x2A]), (0x77, [0x2A])]))
            .region(0x3000, vec![0x11; 0x100])
            .build()
    }

    #[test]
    fn test_scan_three_regions() {
        let memory = three_region_memory();
        let mut candidates = GrowableBuffer::with_capacity(4);
        let stats = MemoryScanner::new(&memory)
            .scan(&byte_pattern(0x2A), &mut candidates)
            .unwrap();

        assert_eq!(candidates.as_slice(), &[0x2008, 0x2077]);
        assert_eq!(stats.matches_found, 2);
        assert_eq!(stats.read_errors, 0);
        // gap, inaccessible, gap, matching, gap, non-matching
        assert_eq!(stats.regions_visited, 6);
        assert_eq!(stats.regions_skipped, 4);
        assert_eq!(stats.chunks_scanned, 2);
    }

    #[test]
    fn test_scan_independent_of_chunk_size() {
        let memory = three_region_memory();
        for chunk_size in [1, 3, 8, 0x10, 0x77, 0x78, 0x100, 0x1000] {
            let mut candidates = GrowableBuffer::with_capacity(1);
            MemoryScanner::with_chunk_size(&memory, chunk_size)
                .scan(&byte_pattern(0x2A), &mut candidates)
                .unwrap();
            assert_eq!(
                candidates.as_slice(),
                &[0x2008, 0x2077],
                "chunk size {}",
                chunk_size
            );
        }
    }

    #[test]
    fn test_scan_value_straddling_chunk_boundary() {
        let value = 0xA1B2_C3D4u32.to_ne_bytes();
        let data = region_with(0x40, &[(0x0E, value), (0x20, value)]);
        let memory = MockMemoryBuilder::new().region(0x5000, data).build();
        let pattern = parse_value("0xA1B2C3D4", ValueType::FourBytes).unwrap();

        for chunk_size in [0x10, 0x0F, 0x11, 0x20, 4, 1] {
            let mut candidates = GrowableBuffer::with_capacity(2);
            let stats = MemoryScanner::with_chunk_size(&memory, chunk_size)
                .scan(&pattern, &mut candidates)
                .unwrap();
            assert_eq!(
                candidates.as_slice(),
                &[0x500E, 0x5020],
                "chunk size {}",
                chunk_size
            );
            assert_eq!(stats.matches_found, 2);
        }
    }

    #[test]
    fn test_scan_does_not_match_across_regions() {
        let value = 0x0102_0304u32.to_ne_bytes();
        let memory = MockMemoryBuilder::new()
            .region(0x1000, region_with(0x10, &[(0x0E, [value[0], value[1]])]))
            .region(0x1010, region_with(0x10, &[(0x00, [value[2], value[3]])]))
            .build();
        let pattern = TargetPattern::new(ValueType::FourBytes, 0x0102_0304).unwrap();
        let mut candidates = GrowableBuffer::with_capacity(2);
        let result = MemoryScanner::with_chunk_size(&memory, 8).scan(&pattern, &mut candidates);
        assert!(matches!(result, Err(Error::NoMatches)));
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_scan_skips_failed_chunk() {
        let data = region_with(0x300, &[(0x10, [0x2A]), (0x150, [0x2A]), (0x2F0, [0x2A])]);
        let memory = MockMemoryBuilder::new()
            .region(0x10000, data)
            .fail_reads(0x10100..0x10101)
            .build();
        let mut candidates = GrowableBuffer::with_capacity(4);
        let stats = MemoryScanner::with_chunk_size(&memory, 0x100)
            .scan(&byte_pattern(0x2A), &mut candidates)
            .unwrap();

        assert_eq!(candidates.as_slice(), &[0x10010, 0x102F0]);
        assert_eq!(stats.read_errors, 1);
        assert_eq!(stats.chunks_scanned, 2);
    }

    #[test]
    fn test_scan_keeps_chunk_before_unreadable_neighbour() {
        let cases = [
            (ValueType::TwoBytes, 0xA1B2u64),
            (ValueType::FourBytes, 0xA1B2_C3D4),
            (ValueType::EightBytes, 0xA1B2_C3D4_E5F6_0718),
        ];
        for (value_type, value) in cases {
            let pattern = TargetPattern::new(value_type, value).unwrap();
            let mut data = vec![0u8; 0x300];
            for offset in [0x10usize, 0x2F0] {
                data[offset..offset + pattern.width()].copy_from_slice(pattern.bytes());
            }
            // First byte of the second chunk is unreadable
            let memory = MockMemoryBuilder::new()
                .region(0x10000, data)
                .fail_reads(0x10100..0x10101)
                .build();
            let mut candidates = GrowableBuffer::with_capacity(4);
            let stats = MemoryScanner::with_chunk_size(&memory, 0x100)
                .scan(&pattern, &mut candidates)
                .unwrap();

            assert_eq!(
                candidates.as_slice(),
                &[0x10010, 0x102F0],
                "{}",
                value_type
            );
            assert_eq!(stats.read_errors, 1, "{}", value_type);
            assert_eq!(stats.chunks_scanned, 2, "{}", value_type);
            assert_eq!(stats.partial_reads, 1, "{}", value_type);
        }
    }

    #[test]
    fn test_scan_huge_chunk_size_is_capped() {
        let memory = three_region_memory();
        let mut scanner = MemoryScanner::with_chunk_size(&memory, usize::MAX);
        assert_eq!(scanner.chunk_size(), MAX_CHUNK_SIZE);

        let mut candidates = GrowableBuffer::with_capacity(2);
        scanner.scan(&byte_pattern(0x2A), &mut candidates).unwrap();
        assert_eq!(candidates.as_slice(), &[0x2008, 0x2077]);
    }

    #[test]
    fn test_scan_keeps_bytes_from_partial_read() {
        let data = region_with(0x100, &[(0x10, [0x2A]), (0x90, [0x2A])]);
        let memory = MockMemoryBuilder::new()
            .region(0x8000, data)
            .short_read_at(0x8080)
            .build();
        let mut candidates = GrowableBuffer::with_capacity(4);
        let stats = MemoryScanner::new(&memory)
            .scan(&byte_pattern(0x2A), &mut candidates)
            .unwrap();

        assert_eq!(candidates.as_slice(), &[0x8010]);
        assert_eq!(stats.partial_reads, 1);
    }

    #[test]
    fn test_scan_partial_read_shorter_than_value() {
        let memory = MockMemoryBuilder::new()
            .region(0x8000, vec![0xFF; 0x20])
            .short_read_at(0x8002)
            .build();
        let pattern = TargetPattern::new(ValueType::EightBytes, u64::MAX).unwrap();
        let mut candidates = GrowableBuffer::with_capacity(4);
        let result = MemoryScanner::with_chunk_size(&memory, 0x20).scan(&pattern, &mut candidates);
        assert!(matches!(result, Err(Error::NoMatches)));
    }

    #[test]
    fn test_scan_no_matches() {
        let memory = MockMemoryBuilder::new().region(0x1000, vec![0; 0x40]).build();
        let mut candidates = GrowableBuffer::with_capacity(4);
        let result = MemoryScanner::new(&memory).scan(&byte_pattern(1), &mut candidates);
        assert!(matches!(result, Err(Error::NoMatches)));
    }

    #[test]
    fn test_scan_query_failure_keeps_earlier_matches() {
        let memory = MockMemoryBuilder::new()
            .region(0x1000, region_with(0x10, &[(0x4, [0x2A])]))
            .region(0x3000, region_with(0x10, &[(0x4, [0x2A])]))
            .fail_query_at(0x2000)
            .build();
        let mut candidates = GrowableBuffer::with_capacity(4);
        let result = MemoryScanner::new(&memory).scan(&byte_pattern(0x2A), &mut candidates);

        assert!(matches!(result, Err(Error::RegionQueryFailed { .. })));
        assert_eq!(candidates.as_slice(), &[0x1004]);
    }
}
