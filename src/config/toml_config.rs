use crate::utils::error::{LeadError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub query: Option<QuerySection>,
    pub places: Option<PlacesSection>,
    pub email_finder: Option<EmailFinderSection>,
    pub output: Option<OutputSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuerySection {
    pub business: Option<String>,
    pub area: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlacesSection {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_pages: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailFinderSection {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub throttle_seconds: Option<f64>,
    pub timeout_seconds: Option<u64>,
    pub rate_limit_fallback_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSection {
    pub path: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LeadError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LeadError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HUNTER_API_KEY})。找不到的變數保持原樣。
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LeadError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn query_business(&self) -> Option<String> {
        self.query.as_ref().and_then(|q| q.business.clone())
    }

    pub fn query_area(&self) -> Option<String> {
        self.query.as_ref().and_then(|q| q.area.clone())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(places) = &self.places {
            if let Some(url) = &places.base_url {
                validation::validate_url("places.base_url", url)?;
            }
            if let Some(key) = &places.api_key {
                validation::validate_resolved("places.api_key", key)?;
            }
        }

        if let Some(finder) = &self.email_finder {
            if let Some(url) = &finder.base_url {
                validation::validate_url("email_finder.base_url", url)?;
            }
            if let Some(key) = &finder.api_key {
                validation::validate_resolved("email_finder.api_key", key)?;
            }
        }

        if let Some(path) = self.output.as_ref().and_then(|o| o.path.as_deref()) {
            validation::validate_path("output.path", path)?;
        }

        Ok(())
    }
}
