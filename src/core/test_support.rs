use crate::core::Storage;
use crate::domain::model::{BusinessRecord, EmailLookupResult, PlaceDetails, RawPlace};
use crate::domain::ports::{EmailFinder, PlacesProvider};
use crate::utils::error::{LeadError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_appends: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(path: &str, data: &[u8]) -> Self {
        let mut files = HashMap::new();
        files.insert(path.to_string(), data.to_vec());
        Self {
            files: Arc::new(Mutex::new(files)),
            fail_appends: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_appends: true,
            ..Self::default()
        }
    }

    pub async fn contents(&self, path: &str) -> String {
        let files = self.files.lock().await;
        files
            .get(path)
            .map(|data| String::from_utf8_lossy(data).into_owned())
            .unwrap_or_default()
    }
}

impl Storage for MemoryStorage {
    async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let files = self.files.lock().await;
        Ok(files.get(path).cloned())
    }

    async fn append_file(&self, path: &str, data: &[u8]) -> Result<()> {
        if self.fail_appends {
            return Err(LeadError::IoError(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("read-only: {}", path),
            )));
        }
        let mut files = self.files.lock().await;
        files
            .entry(path.to_string())
            .or_default()
            .extend_from_slice(data);
        Ok(())
    }
}

pub fn sample_record(name: &str, email: &str) -> BusinessRecord {
    BusinessRecord {
        name: name.to_string(),
        address: Some("1 Main St".to_string()),
        phone: Some("(512) 555-0100".to_string()),
        website: Some("https://foo.com".to_string()),
        rating: Some(4.0),
        recent_review_text: "Lovely".to_string(),
        email: email.to_string(),
        source_query_business: "bakery".to_string(),
        source_query_area: "Austin".to_string(),
    }
}

/// Places provider serving canned details; search returns ids in insertion order.
#[derive(Default)]
pub struct FakePlaces {
    order: Vec<RawPlace>,
    details: std::sync::Mutex<HashMap<String, Result<PlaceDetails>>>,
}

impl FakePlaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, place_id: &str, details: Result<PlaceDetails>) -> Self {
        self.order.push(RawPlace {
            place_id: place_id.to_string(),
        });
        if let Ok(map) = self.details.get_mut() {
            map.insert(place_id.to_string(), details);
        }
        self
    }
}

#[async_trait]
impl PlacesProvider for FakePlaces {
    async fn search(&self, _query: &str, _max_pages: usize) -> Result<Vec<RawPlace>> {
        Ok(self.order.clone())
    }

    async fn details(&self, place_id: &str) -> Result<PlaceDetails> {
        let mut map = self.details.lock().unwrap();
        map.remove(place_id).unwrap_or_else(|| {
            Err(LeadError::PlacesApiError {
                status: "NOT_FOUND".to_string(),
                message: place_id.to_string(),
            })
        })
    }
}

/// Email finder answering by website; unknown websites are `NotFound`.
#[derive(Default)]
pub struct FakeFinder {
    answers: HashMap<String, EmailLookupResult>,
    calls: Arc<std::sync::Mutex<Vec<String>>>,
}

impl FakeFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, website: &str, result: EmailLookupResult) -> Self {
        self.answers.insert(website.to_string(), result);
        self
    }

    /// Websites looked up so far, in call order.
    pub fn calls(&self) -> Arc<std::sync::Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl EmailFinder for FakeFinder {
    fn provider_name(&self) -> &str {
        "fake-finder"
    }

    async fn find_email(&self, _business_name: &str, website_url: &str) -> EmailLookupResult {
        self.calls.lock().unwrap().push(website_url.to_string());
        self.answers
            .get(website_url)
            .cloned()
            .unwrap_or(EmailLookupResult::NotFound)
    }
}
