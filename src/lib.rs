pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::ImportOptions;
pub use core::engine::{parse_case_file, ImportEngine, ImportRun, ParseReport};
pub use domain::model::{ImportResult, ParsedCaseRecord, TeamMemberInfo};
pub use utils::error::{ImportError, Result};
