use crate::error::Result;

use super::MemoryRegion;

/// Read access to a foreign address space
pub trait ReadMemory {
    /// Copy bytes starting at `address` into `buffer`.
    ///
    /// Returns the number of bytes actually copied, which may be fewer than
    /// `buffer.len()` when the range runs into unreadable pages.
    fn read_into(&self, address: u64, buffer: &mut [u8]) -> Result<usize>;

    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; size];
        let read = self.read_into(address, &mut buffer)?;
        buffer.truncate(read);
        Ok(buffer)
    }
}

/// Region enumeration over a foreign address space
pub trait QueryMemory {
    /// Describe the region containing `address`.
    ///
    /// `Ok(None)` means the address lies past the last region.
    fn query_region(&self, address: u64) -> Result<Option<MemoryRegion>>;
}

impl<T: ReadMemory + ?Sized> ReadMemory for &T {
    fn read_into(&self, address: u64, buffer: &mut [u8]) -> Result<usize> {
        (**self).read_into(address, buffer)
    }
}

impl<T: QueryMemory + ?Sized> QueryMemory for &T {
    fn query_region(&self, address: u64) -> Result<Option<MemoryRegion>> {
        (**self).query_region(address)
    }
}
