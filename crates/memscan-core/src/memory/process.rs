use tracing::debug;

use crate::error::{Error, Result};

use super::{MemoryRegion, QueryMemory, ReadMemory};

#[cfg(target_os = "windows")]
use windows::Win32::{
    Foundation::{CloseHandle, ERROR_INVALID_PARAMETER, GetLastError, HANDLE},
    System::{
        Diagnostics::Debug::ReadProcessMemory,
        Memory::{MEMORY_BASIC_INFORMATION, VirtualQueryEx},
        Threading::{OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ},
    },
};

#[cfg(target_os = "windows")]
use super::RegionState;

/// Open handle to a target process.
///
/// Owned by the caller; the scanner only borrows it for reads. The handle is
/// closed on drop.
pub struct ProcessHandle {
    pub pid: u32,
    #[cfg(target_os = "windows")]
    handle: HANDLE,
}

#[cfg(target_os = "windows")]
impl ProcessHandle {
    pub fn open(pid: u32) -> Result<Self> {
        let handle = unsafe { OpenProcess(PROCESS_VM_READ | PROCESS_QUERY_INFORMATION, false, pid) }
            .map_err(|e| Error::ProcessOpenFailed(format!("PID {}: {}", pid, e)))?;
        debug!("Opened process {} ({:?})", pid, handle);
        Ok(Self { pid, handle })
    }
}

#[cfg(target_os = "windows")]
impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if let Err(e) = unsafe { CloseHandle(self.handle) } {
            debug!("Failed to close handle for PID {}: {}", self.pid, e);
        }
    }
}

#[cfg(target_os = "windows")]
impl ReadMemory for ProcessHandle {
    fn read_into(&self, address: u64, buffer: &mut [u8]) -> Result<usize> {
        let mut bytes_read = 0usize;
        let result = unsafe {
            ReadProcessMemory(
                self.handle,
                address as usize as *const _,
                buffer.as_mut_ptr().cast(),
                buffer.len(),
                Some(&mut bytes_read),
            )
        };

        match result {
            Ok(()) => Ok(bytes_read),
            // ERROR_PARTIAL_COPY still reports what made it across
            Err(_) if bytes_read > 0 => Ok(bytes_read),
            Err(e) => Err(Error::MemoryReadFailed {
                address,
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(target_os = "windows")]
impl QueryMemory for ProcessHandle {
    fn query_region(&self, address: u64) -> Result<Option<MemoryRegion>> {
        let mut mbi = MEMORY_BASIC_INFORMATION::default();
        let written = unsafe {
            VirtualQueryEx(
                self.handle,
                Some(address as usize as *const _),
                &mut mbi,
                std::mem::size_of::<MEMORY_BASIC_INFORMATION>(),
            )
        };

        if written == 0 {
            let error = unsafe { GetLastError() };
            if error == ERROR_INVALID_PARAMETER {
                return Ok(None);
            }
            return Err(Error::RegionQueryFailed {
                address,
                message: windows::core::Error::from(error.to_hresult()).to_string(),
            });
        }

        Ok(Some(MemoryRegion {
            base: mbi.BaseAddress as usize as u64,
            size: mbi.RegionSize as u64,
            state: RegionState::from_raw(mbi.State.0),
            protect: mbi.Protect.0,
        }))
    }
}

#[cfg(not(target_os = "windows"))]
impl ProcessHandle {
    pub fn open(pid: u32) -> Result<Self> {
        debug!("Process access requested for PID {} on unsupported platform", pid);
        Err(Error::ProcessOpenFailed(format!(
            "PID {}: live process scanning is only supported on Windows",
            pid
        )))
    }
}

#[cfg(not(target_os = "windows"))]
impl ReadMemory for ProcessHandle {
    fn read_into(&self, address: u64, _buffer: &mut [u8]) -> Result<usize> {
        Err(Error::MemoryReadFailed {
            address,
            message: "unsupported platform".to_string(),
        })
    }
}

#[cfg(not(target_os = "windows"))]
impl QueryMemory for ProcessHandle {
    fn query_region(&self, address: u64) -> Result<Option<MemoryRegion>> {
        Err(Error::RegionQueryFailed {
            address,
            message: "unsupported platform".to_string(),
        })
    }
}

#[cfg(all(test, not(target_os = "windows")))]
mod tests {
    use super::*;

    #[test]
    fn test_open_unsupported_platform() {
        assert!(matches!(
            ProcessHandle::open(4),
            Err(Error::ProcessOpenFailed(_))
        ));
    }
}
