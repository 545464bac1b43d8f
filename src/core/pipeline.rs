use crate::core::index::ExistingNameSet;
use crate::domain::model::{
    AbortReason, BusinessRecord, EmailLookupResult, FatalKind, PlaceDetails, RawPlace,
    SearchQuery, SkipCounts, SkipReason,
};
use crate::domain::ports::{EmailFinder, PlacesProvider};
use crate::utils::error::LeadError;
use reqwest::StatusCode;

const PLACES_PROVIDER: &str = "Google Places";

/// Decision for a single raw place.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaceVerdict {
    Accept(BusinessRecord),
    Skip(SkipReason),
    Abort(AbortReason),
}

/// Turns raw places into enriched, deduplicated business records.
pub struct EnrichmentPipeline<P: PlacesProvider, E: EmailFinder> {
    places: P,
    finder: E,
    query: SearchQuery,
}

impl<P: PlacesProvider, E: EmailFinder> EnrichmentPipeline<P, E> {
    pub fn new(places: P, finder: E, query: SearchQuery) -> Self {
        Self {
            places,
            finder,
            query,
        }
    }

    pub fn places(&self) -> &P {
        &self.places
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    /// Lazily enriches `raw_places` one at a time, in order.
    pub fn process(&self, raw_places: Vec<RawPlace>) -> Enrichment<'_, P, E> {
        Enrichment {
            pipeline: self,
            pending: raw_places.into_iter(),
            halted: false,
            processed: 0,
            skipped: SkipCounts::default(),
        }
    }

    pub async fn evaluate(&self, place: &RawPlace, names: &ExistingNameSet) -> PlaceVerdict {
        let details = match self.places.details(&place.place_id).await {
            Ok(details) => details,
            Err(e) => {
                return match classify_places_failure(&e) {
                    Some(reason) => PlaceVerdict::Abort(reason),
                    None => {
                        tracing::warn!("Details lookup for {} failed: {}", place.place_id, e);
                        PlaceVerdict::Skip(SkipReason::ProviderError)
                    }
                };
            }
        };

        let Some(name) = details
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
        else {
            return PlaceVerdict::Skip(SkipReason::MissingName);
        };

        if names.contains(name) {
            return PlaceVerdict::Skip(SkipReason::Duplicate);
        }

        let Some(website) = details.website.as_deref().filter(|w| !w.trim().is_empty()) else {
            return PlaceVerdict::Skip(SkipReason::NoWebsite);
        };

        let provider = self.finder.provider_name().to_string();
        let email = match self.finder.find_email(name, website).await {
            EmailLookupResult::Found(email) => email,
            EmailLookupResult::NotFound => return PlaceVerdict::Skip(SkipReason::NoEmail),
            EmailLookupResult::TransientError(detail) => {
                tracing::warn!("Email lookup for {} failed, skipping: {}", name, detail);
                return PlaceVerdict::Skip(SkipReason::ProviderError);
            }
            EmailLookupResult::QuotaExhausted => {
                return PlaceVerdict::Abort(AbortReason::QuotaExhausted { provider })
            }
            EmailLookupResult::RateLimited => {
                return PlaceVerdict::Abort(AbortReason::RateLimited { provider })
            }
            EmailLookupResult::FatalError { kind, detail } => {
                let reason = match kind {
                    FatalKind::InvalidCredentials => {
                        AbortReason::InvalidCredentials { provider, detail }
                    }
                    FatalKind::Network => AbortReason::NetworkFailure { provider, detail },
                };
                return PlaceVerdict::Abort(reason);
            }
        };

        PlaceVerdict::Accept(self.build_record(name, &details, email))
    }

    fn build_record(&self, name: &str, details: &PlaceDetails, email: String) -> BusinessRecord {
        BusinessRecord {
            name: name.to_string(),
            address: details.formatted_address.clone(),
            phone: details.formatted_phone_number.clone(),
            website: details.website.clone(),
            rating: details.rating,
            recent_review_text: details.recent_review_text(),
            email,
            source_query_business: self.query.business.clone(),
            source_query_area: self.query.area.clone(),
        }
    }
}

/// Pull-based sequence of accepted records. Not restartable; stops for good
/// after an abort.
pub struct Enrichment<'a, P: PlacesProvider, E: EmailFinder> {
    pipeline: &'a EnrichmentPipeline<P, E>,
    pending: std::vec::IntoIter<RawPlace>,
    halted: bool,
    processed: usize,
    skipped: SkipCounts,
}

impl<P: PlacesProvider, E: EmailFinder> Enrichment<'_, P, E> {
    /// Next accepted record, `Ok(None)` once the places are exhausted, or the
    /// reason the run has to stop.
    pub async fn next_record(
        &mut self,
        names: &ExistingNameSet,
    ) -> std::result::Result<Option<BusinessRecord>, AbortReason> {
        if self.halted {
            return Ok(None);
        }

        while let Some(place) = self.pending.next() {
            self.processed += 1;

            match self.pipeline.evaluate(&place, names).await {
                PlaceVerdict::Accept(record) => return Ok(Some(record)),
                PlaceVerdict::Skip(reason) => {
                    tracing::debug!("Skipping place {}: {}", place.place_id, reason);
                    self.skipped.record(reason);
                }
                PlaceVerdict::Abort(reason) => {
                    self.halted = true;
                    return Err(reason);
                }
            }
        }

        Ok(None)
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn skipped(&self) -> &SkipCounts {
        &self.skipped
    }
}

/// Places failures that make continuing pointless. Everything else skips the
/// single place.
fn classify_places_failure(err: &LeadError) -> Option<AbortReason> {
    let provider = PLACES_PROVIDER.to_string();
    match err {
        LeadError::PlacesApiError { status, message } => match status.as_str() {
            "REQUEST_DENIED" => Some(AbortReason::InvalidCredentials {
                provider,
                detail: format!("{}: {}", status, message),
            }),
            "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => {
                Some(AbortReason::QuotaExhausted { provider })
            }
            _ => None,
        },
        LeadError::HttpError(e) => match e.status() {
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                Some(AbortReason::InvalidCredentials {
                    provider,
                    detail: e.to_string(),
                })
            }
            Some(StatusCode::PAYMENT_REQUIRED) => Some(AbortReason::QuotaExhausted { provider }),
            Some(_) => None,
            None if e.is_timeout() || e.is_decode() => None,
            None => Some(AbortReason::NetworkFailure {
                provider,
                detail: e.to_string(),
            }),
        },
        _ => None,
    }
}
