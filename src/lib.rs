pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::email_finder::{EmailFinderSettings, HunterClient};
pub use adapters::places::{GooglePlacesClient, PlacesSettings};
pub use adapters::storage::LocalStorage;
pub use config::{ConfigOverrides, HarvestConfig};
pub use core::{etl::HarvestEngine, index::ExistingNameSet, pipeline::EnrichmentPipeline};
pub use domain::model::{AbortReason, BusinessRecord, EmailLookupResult, RunSummary, SearchQuery};
pub use utils::error::{LeadError, Result};
