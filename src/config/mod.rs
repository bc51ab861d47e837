pub mod profile;

use crate::core::mapper::SynonymSet;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

/// Tuning for one import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Progress cadence: the first, the last, and every n-th row between.
    pub progress_every: usize,
    pub synonyms: SynonymSet,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            progress_every: 5,
            synonyms: SynonymSet::default(),
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "caseload-etl")]
#[command(about = "Tolerant importer for law firm case roster spreadsheets")]
pub struct CliConfig {
    /// Roster file to ingest (.csv or .txt)
    pub input: String,

    #[arg(long, default_value = "default")]
    pub firm_id: String,

    #[arg(long, help = "Firm profile TOML (synonyms, staff roster, tuning)")]
    pub profile: Option<String>,

    #[arg(long, help = "Import accepted rows instead of only reporting")]
    pub import: bool,

    #[arg(long, help = "Write the full run report as JSON to this path")]
    pub report: Option<String>,

    #[arg(long, help = "Write rejected rows as CSV to this path")]
    pub rejects: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_file_extensions(
            "input",
            std::slice::from_ref(&self.input),
            &["csv", "txt"],
        )?;
        validation::validate_non_empty_string("firm_id", &self.firm_id)?;
        if let Some(profile) = &self.profile {
            validation::validate_path("profile", profile)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ImportOptions::default();
        assert_eq!(options.progress_every, 5);
        assert!(options.synonyms.is_identifying("Client Name"));
    }
}

#[cfg(all(test, feature = "cli"))]
mod cli_tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let config = CliConfig::try_parse_from(["caseload-etl", "roster.csv"]).unwrap();

        assert_eq!(config.input, "roster.csv");
        assert_eq!(config.firm_id, "default");
        assert!(!config.import);
        assert!(config.report.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_rejects_unsupported_extension() {
        let config = CliConfig::try_parse_from(["caseload-etl", "roster.xlsx"]).unwrap();
        assert!(config.validate().is_err());
    }
}
