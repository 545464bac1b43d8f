use crate::domain::model::{PlaceDetails, RawPlace};
use crate::domain::ports::PlacesProvider;
use crate::utils::error::{LeadError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";
pub const MAX_SEARCH_PAGES: usize = 3;

const DETAIL_FIELDS: &str =
    "name,formatted_address,formatted_phone_number,website,rating,reviews";
// next_page_token 需要一點時間才會生效
const PAGE_TOKEN_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct PlacesSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub page_token_delay: Duration,
}

impl PlacesSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_PLACES_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
            page_token_delay: PAGE_TOKEN_DELAY,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<RawPlace>,
    next_page_token: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<PlaceDetails>,
    error_message: Option<String>,
}

/// Google Places web-service client (text search + place details).
pub struct GooglePlacesClient {
    client: Client,
    settings: PlacesSettings,
}

impl GooglePlacesClient {
    pub fn new(settings: PlacesSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}/json",
            self.settings.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    async fn search_page(&self, params: &[(&str, &str)]) -> Result<TextSearchResponse> {
        let response = self
            .client
            .get(self.url("textsearch"))
            .query(params)
            .query(&[("key", self.settings.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl PlacesProvider for GooglePlacesClient {
    async fn search(&self, query: &str, max_pages: usize) -> Result<Vec<RawPlace>> {
        let mut places = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 0..max_pages.clamp(1, MAX_SEARCH_PAGES) {
            let body = match page_token.take() {
                None => self.search_page(&[("query", query)]).await?,
                Some(token) => {
                    tokio::time::sleep(self.settings.page_token_delay).await;
                    self.search_page(&[("pagetoken", token.as_str())]).await?
                }
            };

            match body.status.as_str() {
                "OK" => {}
                "ZERO_RESULTS" => break,
                _ => {
                    return Err(LeadError::PlacesApiError {
                        status: body.status,
                        message: body.error_message.unwrap_or_default(),
                    })
                }
            }

            tracing::debug!("Search page {} returned {} places", page + 1, body.results.len());
            places.extend(body.results);

            match body.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(places)
    }

    async fn details(&self, place_id: &str) -> Result<PlaceDetails> {
        let response = self
            .client
            .get(self.url("details"))
            .query(&[
                ("place_id", place_id),
                ("fields", DETAIL_FIELDS),
                ("reviews_sort", "newest"),
                ("key", self.settings.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: DetailsResponse = response.json().await?;
        if body.status != "OK" {
            return Err(LeadError::PlacesApiError {
                status: body.status,
                message: body.error_message.unwrap_or_default(),
            });
        }

        Ok(body.result.unwrap_or_default())
    }
}
