use tracing::{debug, info, trace};

use crate::buffer::GrowableBuffer;
use crate::error::{Error, Result};
use crate::memory::{QueryMemory, ReadMemory};
use crate::value::TargetPattern;

use super::{MemoryScanner, RefineStats};

impl<M: ReadMemory + QueryMemory> MemoryScanner<'_, M> {
    /// Re-test every candidate and keep only those still holding `pattern`.
    ///
    /// Survivors keep their relative order. The narrowed set replaces
    /// `candidates` in one transfer once every address has been checked.
    pub fn refine(
        &mut self,
        pattern: &TargetPattern,
        candidates: &mut GrowableBuffer<u64>,
    ) -> Result<RefineStats> {
        let width = pattern.width();
        debug!(
            "Refining {} candidates against {} ({} bytes)",
            candidates.len(),
            pattern.value(),
            width
        );

        let mut narrowed = GrowableBuffer::with_capacity(candidates.capacity());
        let mut stats = RefineStats {
            addresses_checked: candidates.len(),
            ..Default::default()
        };
        let mut value = [0u8; 8];

        for &address in candidates.iter() {
            match self.memory.read_into(address, &mut value[..width]) {
                Ok(read) if read == width => {
                    if pattern.matches(&value[..width]) {
                        narrowed.append(address);
                        stats.matches_found += 1;
                    }
                }
                Ok(read) => {
                    stats.partial_reads += 1;
                    trace!("Partial read at 0x{:X} ({}/{} bytes)", address, read, width);
                }
                Err(e) => {
                    stats.read_errors += 1;
                    trace!("Dropping 0x{:X}: {}", address, e);
                }
            }
        }

        candidates.transfer_from(&mut narrowed);

        info!(
            "Refine complete: {} checked, {} matches, {} read errors, {} partial reads",
            stats.addresses_checked, stats.matches_found, stats.read_errors, stats.partial_reads
        );

        if candidates.is_empty() {
            return Err(Error::NoMatches);
        }
        Ok(stats)
    }
}
