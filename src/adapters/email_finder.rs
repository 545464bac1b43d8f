use crate::domain::model::{EmailLookupResult, FatalKind};
use crate::domain::ports::EmailFinder;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_HUNTER_BASE_URL: &str = "https://api.hunter.io/v2";
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(1500);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_RATE_LIMIT_FALLBACK: Duration = Duration::from_secs(65);

const PROVIDER: &str = "hunter.io";

#[derive(Debug, Clone)]
pub struct EmailFinderSettings {
    pub base_url: String,
    pub api_key: String,
    /// Wait before every lookup.
    pub throttle: Duration,
    pub timeout: Duration,
    /// Backoff for a 429 that carries no Retry-After header.
    pub rate_limit_fallback: Duration,
}

impl EmailFinderSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_HUNTER_BASE_URL.to_string(),
            api_key: api_key.into(),
            throttle: DEFAULT_THROTTLE,
            timeout: DEFAULT_TIMEOUT,
            rate_limit_fallback: DEFAULT_RATE_LIMIT_FALLBACK,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DomainSearchResponse {
    #[serde(default)]
    data: DomainSearchData,
}

#[derive(Debug, Default, Deserialize)]
struct DomainSearchData {
    #[serde(default)]
    emails: Vec<EmailCandidate>,
}

#[derive(Debug, Deserialize)]
struct EmailCandidate {
    value: String,
}

/// One request's classification. A 429 is kept apart so the caller can
/// decide whether a retry is still allowed.
enum Attempt {
    Done(EmailLookupResult),
    RateLimited { retry_after: Option<Duration> },
}

/// Hunter.io domain-search client.
pub struct HunterClient {
    client: Client,
    settings: EmailFinderSettings,
}

impl HunterClient {
    pub fn new(settings: EmailFinderSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/domain-search",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    async fn attempt(&self, domain: &str) -> Attempt {
        tracing::debug!("Looking up emails for domain {}", domain);

        let response = self
            .client
            .get(self.endpoint())
            .query(&[("domain", domain), ("api_key", self.settings.api_key.as_str())])
            .send()
            .await;

        match response {
            Ok(response) => classify_response(response).await,
            Err(e) if e.is_timeout() => Attempt::Done(EmailLookupResult::TransientError(
                format!("request for {} timed out", domain),
            )),
            Err(e) => Attempt::Done(network_failure(format!("network error: {}", e))),
        }
    }
}

#[async_trait]
impl EmailFinder for HunterClient {
    fn provider_name(&self) -> &str {
        PROVIDER
    }

    async fn find_email(&self, business_name: &str, website_url: &str) -> EmailLookupResult {
        let Some(domain) = lookup_domain(website_url) else {
            return EmailLookupResult::TransientError(format!(
                "no domain in website '{}'",
                website_url
            ));
        };

        // 請求前固定等待，避免超過供應商速率限制
        if !self.settings.throttle.is_zero() {
            tokio::time::sleep(self.settings.throttle).await;
        }

        let retry_after = match self.attempt(&domain).await {
            Attempt::Done(result) => return result,
            Attempt::RateLimited { retry_after } => retry_after,
        };

        let wait = retry_after.unwrap_or(self.settings.rate_limit_fallback);
        tracing::warn!(
            "⏳ Rate limited while looking up {} ({}), retrying once in {:?}",
            business_name,
            domain,
            wait
        );
        tokio::time::sleep(wait).await;

        match self.attempt(&domain).await {
            Attempt::Done(result) => result,
            Attempt::RateLimited { .. } => EmailLookupResult::RateLimited,
        }
    }
}

async fn classify_response(response: Response) -> Attempt {
    let status = response.status();
    tracing::debug!("Email finder response status: {}", status);

    if status.is_success() {
        return match response.json::<DomainSearchResponse>().await {
            Ok(body) => Attempt::Done(
                body.data
                    .emails
                    .into_iter()
                    .next()
                    .map(|candidate| EmailLookupResult::Found(candidate.value))
                    .unwrap_or(EmailLookupResult::NotFound),
            ),
            Err(e) if e.is_decode() || e.is_timeout() => Attempt::Done(
                EmailLookupResult::TransientError(format!("unreadable response body: {}", e)),
            ),
            Err(e) => Attempt::Done(network_failure(format!(
                "network error reading response: {}",
                e
            ))),
        };
    }

    let result = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            EmailLookupResult::FatalError {
                kind: FatalKind::InvalidCredentials,
                detail: format!("HTTP {}: invalid API key", status),
            }
        }
        StatusCode::PAYMENT_REQUIRED => EmailLookupResult::QuotaExhausted,
        StatusCode::TOO_MANY_REQUESTS => {
            return Attempt::RateLimited {
                retry_after: retry_after(&response),
            };
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            EmailLookupResult::TransientError(format!("HTTP {}: provider timed out", status))
        }
        _ => EmailLookupResult::TransientError(format!("HTTP {}", status)),
    };
    Attempt::Done(result)
}

fn network_failure(detail: String) -> EmailLookupResult {
    EmailLookupResult::FatalError {
        kind: FatalKind::Network,
        detail,
    }
}

/// Parses an integer-seconds Retry-After header.
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Host component of a website URL. Bare hosts such as `foo.com` are
/// treated as `http://foo.com`; any other explicit scheme has no domain.
pub fn lookup_domain(website_url: &str) -> Option<String> {
    let trimmed = website_url.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = if trimmed.contains("://") {
        Url::parse(trimmed)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))?
    } else {
        Url::parse(&format!("http://{}", trimmed)).ok()?
    };

    parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .map(|host| host.to_string())
}
