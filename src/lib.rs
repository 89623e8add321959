pub mod config;
pub mod error;
pub mod process;
pub mod rename;
pub mod table;

pub use config::{RenameInstructions, RunConfig};
pub use error::{RenameWarning, ScanError};
pub use process::collect_data;
pub use table::{PlateTable, WellId};
