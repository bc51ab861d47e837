use crate::config::ImportOptions;
use crate::core::mapper::FieldKind;
use crate::domain::model::StaffMember;
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Per-firm import profile: header spellings the firm's exports use, an
/// optional staff roster for offline runs, and tuning overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmProfile {
    pub firm: FirmSection,
    pub store: Option<StoreSection>,
    pub import: Option<ImportSection>,
    pub synonyms: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub staff: Vec<StaffMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmSection {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSection {
    pub progress_every: Option<usize>,
}

impl FirmProfile {
    /// 從 TOML 檔案載入事務所設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ImportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析設定
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ImportError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STORE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證設定的合理性
    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_non_empty_string("firm.id", &self.firm.id)?;

        if let Some(store) = &self.store {
            crate::utils::validation::validate_url("store.base_url", &store.base_url)?;
        }

        if let Some(every) = self.import.as_ref().and_then(|i| i.progress_every) {
            crate::utils::validation::validate_positive_number(
                "import.progress_every",
                every,
                1,
            )?;
        }

        // 同義詞的鍵必須是已知的標準欄位名
        if let Some(synonyms) = &self.synonyms {
            let known = FieldKind::known_names();
            for key in synonyms.keys() {
                crate::utils::validation::validate_known_field("synonyms", key, &known)?;
            }
        }

        Ok(())
    }

    /// Builds the run options this profile implies: defaults, overlaid
    /// with the profile's tuning and extra header spellings.
    pub fn import_options(&self) -> ImportOptions {
        let mut options = ImportOptions::default();

        if let Some(every) = self.import.as_ref().and_then(|i| i.progress_every) {
            options.progress_every = every;
        }

        if let Some(synonyms) = &self.synonyms {
            for (key, spellings) in synonyms {
                let Some(kind) = FieldKind::from_name(key) else {
                    continue;
                };
                for spelling in spellings {
                    options.synonyms.extend(kind, spelling);
                }
            }
        }

        options
    }

    pub fn store_url(&self) -> Option<&str> {
        self.store.as_ref().map(|s| s.base_url.as_str())
    }
}

impl Validate for FirmProfile {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
