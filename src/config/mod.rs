#[cfg(feature = "cli")]
pub mod cli;
pub mod harvest;
pub mod toml_config;

pub use harvest::{ConfigOverrides, HarvestConfig};

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "lead-etl")]
#[command(about = "Find local businesses, look up their contact emails and append them to a CSV")]
pub struct CliConfig {
    /// Type of business to search for (prompted when omitted)
    #[arg(long)]
    pub business: Option<String>,

    /// Area to search in (prompted when omitted)
    #[arg(long)]
    pub area: Option<String>,

    /// Master CSV to deduplicate against and append to
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Seconds to wait before each email lookup
    #[arg(long)]
    pub throttle_secs: Option<f64>,

    /// Number of search result pages to fetch (1-3)
    #[arg(long)]
    pub max_pages: Option<usize>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            business: self.business.clone(),
            area: self.area.clone(),
            output_path: self.output.clone(),
            throttle_secs: self.throttle_secs,
            max_pages: self.max_pages,
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = CliConfig::parse_from([
            "lead-etl",
            "--business",
            "dentists",
            "--area",
            "Reno NV",
            "--throttle-secs",
            "2.5",
            "-o",
            "reno.csv",
        ]);

        let overrides = cli.overrides();
        assert_eq!(overrides.business.as_deref(), Some("dentists"));
        assert_eq!(overrides.area.as_deref(), Some("Reno NV"));
        assert_eq!(overrides.throttle_secs, Some(2.5));
        assert_eq!(overrides.output_path.as_deref(), Some("reno.csv"));
        assert!(overrides.max_pages.is_none());
        assert!(!cli.verbose);
    }
}
