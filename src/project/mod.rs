//! Project-wide knowledge gathered from the BitBake tooling.
//!
//! The scanner asks BitBake for layers, recipes, append files and
//! overrides, searches layers for classes and include files, and publishes
//! the result as one immutable [`ProjectSnapshot`].

mod driver;
mod error;
pub mod output;
mod scanner;
pub mod search;
mod settings;
mod snapshot;

pub use driver::{BitbakeDriver, CommandOutput, CommandRunner, sanitize_command};
pub use error::{ConfigError, ScanError};
pub use scanner::{ProjectScanner, ScanEvent};
pub use settings::{RawSettings, Settings};
pub use snapshot::{ElementInfo, LayerInfo, PathInfo, ProjectSnapshot};
