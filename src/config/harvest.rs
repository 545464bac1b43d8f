use crate::adapters::email_finder::{EmailFinderSettings, DEFAULT_THROTTLE};
use crate::adapters::places::{PlacesSettings, MAX_SEARCH_PAGES};
use crate::config::toml_config::TomlConfig;
use crate::core::ConfigProvider;
use crate::domain::model::SearchQuery;
use crate::utils::error::{LeadError, Result};
use crate::utils::validation::{self, Validate};
use std::time::Duration;

pub const DEFAULT_OUTPUT_PATH: &str = "business_master.csv";
pub const PLACES_API_KEY_VAR: &str = "GOOGLE_PLACES_API_KEY";
pub const HUNTER_API_KEY_VAR: &str = "HUNTER_API_KEY";
pub const THROTTLE_VAR: &str = "EMAIL_THROTTLE_SECS";

const MAX_THROTTLE_SECS: f64 = 60.0;

/// Values supplied on the command line (or by the interactive prompt).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub business: Option<String>,
    pub area: Option<String>,
    pub output_path: Option<String>,
    pub throttle_secs: Option<f64>,
    pub max_pages: Option<usize>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub query: SearchQuery,
    pub output_path: String,
    pub max_pages: usize,
    pub places: PlacesSettings,
    pub email_finder: EmailFinderSettings,
}

impl HarvestConfig {
    pub fn from_env(overrides: ConfigOverrides, file: Option<&TomlConfig>) -> Result<Self> {
        Self::resolve(overrides, file, |key| std::env::var(key).ok())
    }

    /// Precedence: command line, then TOML file, then environment, then defaults.
    pub fn resolve<F>(overrides: ConfigOverrides, file: Option<&TomlConfig>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file.cloned().unwrap_or_default();
        let places_file = file.places.clone().unwrap_or_default();
        let finder_file = file.email_finder.clone().unwrap_or_default();

        let business = overrides.business.or_else(|| file.query_business());
        let area = overrides.area.or_else(|| file.query_area());
        let query = SearchQuery::new(
            validation::validate_required_field("business", &business)?.trim(),
            validation::validate_required_field("area", &area)?.trim(),
        );

        let places_key = places_file.api_key.clone().or_else(|| env(PLACES_API_KEY_VAR));
        let hunter_key = finder_file.api_key.clone().or_else(|| env(HUNTER_API_KEY_VAR));
        let places_key = validation::validate_required_field(PLACES_API_KEY_VAR, &places_key)?;
        let hunter_key = validation::validate_required_field(HUNTER_API_KEY_VAR, &hunter_key)?;

        let throttle_secs = match overrides.throttle_secs.or(finder_file.throttle_seconds) {
            Some(secs) => Some(secs),
            None => env(THROTTLE_VAR)
                .map(|raw| {
                    raw.trim()
                        .parse::<f64>()
                        .map_err(|e| LeadError::InvalidConfigValueError {
                            field: THROTTLE_VAR.to_string(),
                            value: raw.clone(),
                            reason: format!("Not a number of seconds: {}", e),
                        })
                })
                .transpose()?,
        };
        let throttle = match throttle_secs {
            Some(secs) => {
                validation::validate_range("throttle_secs", secs, 0.0, MAX_THROTTLE_SECS)?;
                Duration::from_secs_f64(secs)
            }
            None => DEFAULT_THROTTLE,
        };

        let mut places = PlacesSettings::new(places_key.clone());
        if let Some(base_url) = places_file.base_url {
            places.base_url = base_url;
        }
        if let Some(timeout) = places_file.timeout_seconds {
            places.timeout = Duration::from_secs(timeout);
        }

        let mut email_finder = EmailFinderSettings::new(hunter_key.clone());
        email_finder.throttle = throttle;
        if let Some(base_url) = finder_file.base_url {
            email_finder.base_url = base_url;
        }
        if let Some(timeout) = finder_file.timeout_seconds {
            email_finder.timeout = Duration::from_secs(timeout);
        }
        if let Some(fallback) = finder_file.rate_limit_fallback_seconds {
            email_finder.rate_limit_fallback = Duration::from_secs(fallback);
        }

        let output_path = overrides
            .output_path
            .or_else(|| file.output.as_ref().and_then(|o| o.path.clone()))
            .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());

        let config = Self {
            query,
            output_path,
            max_pages: overrides.max_pages.or(places_file.max_pages).unwrap_or(1),
            places,
            email_finder,
        };
        config.validate()?;
        Ok(config)
    }
}

impl ConfigProvider for HarvestConfig {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn search_query(&self) -> &SearchQuery {
        &self.query
    }

    fn max_pages(&self) -> usize {
        self.max_pages
    }
}

impl Validate for HarvestConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("business", &self.query.business)?;
        validation::validate_non_empty_string("area", &self.query.area)?;
        validation::validate_path("output", &self.output_path)?;
        validation::validate_range("max_pages", self.max_pages, 1, MAX_SEARCH_PAGES)?;

        validation::validate_url("places.base_url", &self.places.base_url)?;
        validation::validate_resolved(PLACES_API_KEY_VAR, &self.places.api_key)?;

        validation::validate_url("email_finder.base_url", &self.email_finder.base_url)?;
        validation::validate_resolved(HUNTER_API_KEY_VAR, &self.email_finder.api_key)?;
        validation::validate_range(
            "throttle_secs",
            self.email_finder.throttle.as_secs_f64(),
            0.0,
            MAX_THROTTLE_SECS,
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_with(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn query_overrides() -> ConfigOverrides {
        ConfigOverrides {
            business: Some("bakery".to_string()),
            area: Some("Austin".to_string()),
            ..Default::default()
        }
    }

    fn keys() -> impl Fn(&str) -> Option<String> {
        env_with(&[(PLACES_API_KEY_VAR, "places-key"), (HUNTER_API_KEY_VAR, "hunter-key")])
    }

    #[test]
    fn test_defaults() {
        let config = HarvestConfig::resolve(query_overrides(), None, keys()).unwrap();

        assert_eq!(config.output_path, DEFAULT_OUTPUT_PATH);
        assert_eq!(config.max_pages, 1);
        assert_eq!(config.email_finder.throttle, Duration::from_millis(1500));
        assert_eq!(config.email_finder.api_key, "hunter-key");
        assert_eq!(config.places.api_key, "places-key");
        assert_eq!(config.query.text(), "bakery Austin");
    }

    #[test]
    fn test_missing_api_key() {
        let env = env_with(&[(PLACES_API_KEY_VAR, "places-key")]);
        let err = HarvestConfig::resolve(query_overrides(), None, env).unwrap_err();

        assert!(
            matches!(err, LeadError::MissingConfigError { ref field } if field == HUNTER_API_KEY_VAR)
        );
    }

    #[test]
    fn test_missing_query() {
        let err = HarvestConfig::resolve(ConfigOverrides::default(), None, keys()).unwrap_err();
        assert!(matches!(err, LeadError::MissingConfigError { .. }));
    }

    #[test]
    fn test_throttle_precedence() {
        let env = env_with(&[
            (PLACES_API_KEY_VAR, "places-key"),
            (HUNTER_API_KEY_VAR, "hunter-key"),
            (THROTTLE_VAR, "4"),
        ]);
        let from_env = HarvestConfig::resolve(query_overrides(), None, &env).unwrap();
        assert_eq!(from_env.email_finder.throttle, Duration::from_secs(4));

        let file = TomlConfig::from_toml_str("[email_finder]\nthrottle_seconds = 2.0\n").unwrap();
        let from_file = HarvestConfig::resolve(query_overrides(), Some(&file), &env).unwrap();
        assert_eq!(from_file.email_finder.throttle, Duration::from_secs(2));

        let mut overrides = query_overrides();
        overrides.throttle_secs = Some(0.5);
        let from_cli = HarvestConfig::resolve(overrides, Some(&file), &env).unwrap();
        assert_eq!(from_cli.email_finder.throttle, Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_throttle_env() {
        let env = env_with(&[
            (PLACES_API_KEY_VAR, "places-key"),
            (HUNTER_API_KEY_VAR, "hunter-key"),
            (THROTTLE_VAR, "soon"),
        ]);
        assert!(HarvestConfig::resolve(query_overrides(), None, env).is_err());

        let mut overrides = query_overrides();
        overrides.throttle_secs = Some(-1.0);
        assert!(HarvestConfig::resolve(overrides, None, keys()).is_err());
    }

    #[test]
    fn test_file_values_apply() {
        let file = TomlConfig::from_toml_str(
            r#"
[query]
business = "florists"
area = "Boise"

[places]
base_url = "http://localhost:9000"
max_pages = 3

[email_finder]
api_key = "file-key"
rate_limit_fallback_seconds = 5

[output]
path = "boise.csv"
"#,
        )
        .unwrap();

        let config =
            HarvestConfig::resolve(ConfigOverrides::default(), Some(&file), keys()).unwrap();

        assert_eq!(config.query, SearchQuery::new("florists", "Boise"));
        assert_eq!(config.places.base_url, "http://localhost:9000");
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.email_finder.api_key, "file-key");
        assert_eq!(config.email_finder.rate_limit_fallback, Duration::from_secs(5));
        assert_eq!(config.output_path, "boise.csv");
    }

    #[test]
    fn test_max_pages_out_of_range() {
        let mut overrides = query_overrides();
        overrides.max_pages = Some(5);
        assert!(HarvestConfig::resolve(overrides, None, keys()).is_err());
    }
}
