//! Display-ready tables built from the candidate set.
//!
//! - **Results**: rebuilt wholesale after every scan or refine, capped
//! - **Selection**: rows the user copied out of the results; survives rescans

mod results;
mod selection;

pub use results::{ResultEntry, ResultsTable};
pub use selection::{SelectionEntry, SelectionTable};
