pub mod layout;
mod process;
mod reader;
mod region;

// Mock address space for testing (also used by integration tests)
#[doc(hidden)]
pub mod mock;

pub use process::ProcessHandle;
pub use reader::{QueryMemory, ReadMemory};
pub use region::{MemoryRegion, RegionState};

#[doc(hidden)]
pub use mock::{MockMemoryBuilder, MockMemoryReader};
