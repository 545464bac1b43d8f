use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output column order of the master CSV.
pub const CSV_HEADER: [&str; 9] = [
    "Name",
    "Address",
    "Phone Number",
    "Website",
    "Rating",
    "Recent Review",
    "Email",
    "Business",
    "Area",
];

pub const NO_REVIEWS: &str = "No reviews";
pub const NO_REVIEW_TEXT: &str = "No review text available";

/// The query a run was started with. Recorded on every row for provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub business: String,
    pub area: String,
}

impl SearchQuery {
    pub fn new(business: impl Into<String>, area: impl Into<String>) -> Self {
        Self {
            business: business.into(),
            area: area.into(),
        }
    }

    /// Free-text query sent to the places provider.
    pub fn text(&self) -> String {
        format!("{} {}", self.business.trim(), self.area.trim())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPlace {
    pub place_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub text: Option<String>,
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub name: Option<String>,
    pub formatted_address: Option<String>,
    pub formatted_phone_number: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl PlaceDetails {
    /// Text of the first review the provider returned. No local recency sort.
    pub fn recent_review_text(&self) -> String {
        match self.reviews.first() {
            Some(review) => review
                .text
                .clone()
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| NO_REVIEW_TEXT.to_string()),
            None => NO_REVIEWS.to_string(),
        }
    }
}

/// One row of the master CSV. Field order and renames define the columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Address")]
    pub address: Option<String>,
    #[serde(rename = "Phone Number")]
    pub phone: Option<String>,
    #[serde(rename = "Website")]
    pub website: Option<String>,
    #[serde(rename = "Rating")]
    pub rating: Option<f64>,
    #[serde(rename = "Recent Review")]
    pub recent_review_text: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Business")]
    pub source_query_business: String,
    #[serde(rename = "Area")]
    pub source_query_area: String,
}

/// Outcome of one email-finder lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailLookupResult {
    Found(String),
    NotFound,
    QuotaExhausted,
    RateLimited,
    TransientError(String),
    FatalError { kind: FatalKind, detail: String },
}

/// Why a lookup failure makes further lookups pointless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalKind {
    InvalidCredentials,
    Network,
}

/// Record-level rejections. Never surfaced to the operator as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SkipReason {
    MissingName,
    Duplicate,
    NoWebsite,
    NoEmail,
    ProviderError,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SkipReason::MissingName => "missing name",
            SkipReason::Duplicate => "duplicate",
            SkipReason::NoWebsite => "no website",
            SkipReason::NoEmail => "no email found",
            SkipReason::ProviderError => "provider error",
        };
        f.write_str(label)
    }
}

/// Run-level terminations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AbortReason {
    InvalidCredentials { provider: String, detail: String },
    QuotaExhausted { provider: String },
    RateLimited { provider: String },
    NetworkFailure { provider: String, detail: String },
}

impl AbortReason {
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AbortReason::InvalidCredentials { .. } => "Check the API keys in your .env file",
            AbortReason::QuotaExhausted { .. } => {
                "Your plan's quota is used up; wait for the reset or upgrade the plan"
            }
            AbortReason::RateLimited { .. } => {
                "The provider is still rate limiting; wait a few minutes or raise --throttle-secs"
            }
            AbortReason::NetworkFailure { .. } => "Check your network connection and rerun",
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::InvalidCredentials { provider, detail } => {
                write!(f, "{} rejected the credentials ({})", provider, detail)
            }
            AbortReason::QuotaExhausted { provider } => {
                write!(f, "{} quota exhausted (out of credits)", provider)
            }
            AbortReason::RateLimited { provider } => {
                write!(f, "{} is still rate limiting after one retry (HTTP 429)", provider)
            }
            AbortReason::NetworkFailure { provider, detail } => {
                write!(f, "network failure talking to {}: {}", provider, detail)
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SkipCounts {
    pub missing_name: usize,
    pub duplicate: usize,
    pub no_website: usize,
    pub no_email: usize,
    pub provider_error: usize,
}

impl SkipCounts {
    pub fn record(&mut self, reason: SkipReason) {
        let slot = match reason {
            SkipReason::MissingName => &mut self.missing_name,
            SkipReason::Duplicate => &mut self.duplicate,
            SkipReason::NoWebsite => &mut self.no_website,
            SkipReason::NoEmail => &mut self.no_email,
            SkipReason::ProviderError => &mut self.provider_error,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        self.missing_name + self.duplicate + self.no_website + self.no_email + self.provider_error
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub output_path: String,
    pub places_found: usize,
    pub places_processed: usize,
    pub rows_appended: usize,
    pub skipped: SkipCounts,
    pub aborted: Option<AbortReason>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }
}
