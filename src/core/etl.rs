use crate::core::index::ExistingNameSet;
use crate::core::pipeline::EnrichmentPipeline;
use crate::core::sink::CsvSink;
use crate::core::{ConfigProvider, Storage};
use crate::domain::model::RunSummary;
use crate::domain::ports::{EmailFinder, PlacesProvider};
use crate::utils::error::Result;
use chrono::Utc;

/// Runs one search-enrich-append pass.
pub struct HarvestEngine<S, C, P, E>
where
    S: Storage,
    C: ConfigProvider,
    P: PlacesProvider,
    E: EmailFinder,
{
    storage: S,
    config: C,
    pipeline: EnrichmentPipeline<P, E>,
}

impl<S, C, P, E> HarvestEngine<S, C, P, E>
where
    S: Storage,
    C: ConfigProvider,
    P: PlacesProvider,
    E: EmailFinder,
{
    pub fn new(storage: S, config: C, places: P, finder: E) -> Self {
        let pipeline = EnrichmentPipeline::new(places, finder, config.search_query().clone());
        Self {
            storage,
            config,
            pipeline,
        }
    }

    /// Aborts end the run early but are reported through the summary, not as
    /// an `Err`. Search and storage failures are errors.
    pub async fn run(self) -> Result<RunSummary> {
        let Self {
            storage,
            config,
            pipeline,
        } = self;
        let started_at = Utc::now();
        let output_path = config.output_path().to_string();
        let query = pipeline.query().text();

        tracing::info!("🚀 Starting lead harvest for '{}'", query);

        // 載入既有資料以便去重
        let mut names = ExistingNameSet::load(&storage, &output_path).await?;

        let raw_places = pipeline.places().search(&query, config.max_pages()).await?;
        let places_found = raw_places.len();
        tracing::info!("🔎 Found {} places for '{}'", places_found, query);

        let mut sink = CsvSink::new(storage, output_path.clone(), &names);
        let mut enrichment = pipeline.process(raw_places);
        let mut rows_appended = 0;
        let mut aborted = None;

        loop {
            match enrichment.next_record(&names).await {
                Ok(Some(record)) => {
                    sink.append(&record, &mut names).await?;
                    rows_appended += 1;
                }
                Ok(None) => break,
                Err(reason) => {
                    tracing::error!("🛑 Stopping run: {}", reason);
                    aborted = Some(reason);
                    break;
                }
            }
        }

        let summary = RunSummary {
            output_path: sink.path().to_string(),
            places_found,
            places_processed: enrichment.processed(),
            rows_appended,
            skipped: enrichment.skipped().clone(),
            aborted,
            started_at,
            finished_at: Utc::now(),
        };

        tracing::info!(
            "📊 Processed {}/{} places, appended {}, skipped {}",
            summary.places_processed,
            summary.places_found,
            summary.rows_appended,
            summary.skipped.total()
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::{FakeFinder, FakePlaces, MemoryStorage};
    use crate::domain::model::{AbortReason, EmailLookupResult, PlaceDetails, SearchQuery};
    use crate::utils::error::LeadError;

    struct MockConfig {
        output_path: String,
        query: SearchQuery,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                output_path: "master.csv".to_string(),
                query: SearchQuery::new("bakery", "Austin"),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn search_query(&self) -> &SearchQuery {
            &self.query
        }

        fn max_pages(&self) -> usize {
            1
        }
    }

    fn place(name: &str, website: &str) -> Result<PlaceDetails> {
        Ok(PlaceDetails {
            name: Some(name.to_string()),
            website: Some(website.to_string()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_duplicates_within_one_run_are_caught() {
        let storage = MemoryStorage::new();
        let places = FakePlaces::new()
            .with("p1", place("Foo", "foo.com"))
            .with("p2", place("FOO ", "foo.com"));
        let finder = FakeFinder::new().with("foo.com", EmailLookupResult::Found("a@foo.com".into()));

        let engine = HarvestEngine::new(storage.clone(), MockConfig::new(), places, finder);
        let summary = engine.run().await.unwrap();

        assert_eq!(summary.rows_appended, 1);
        assert_eq!(summary.skipped.duplicate, 1);
        assert!(summary.is_complete());

        let content = storage.contents("master.csv").await;
        assert_eq!(content.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_quota_exhaustion_keeps_earlier_rows() {
        let storage = MemoryStorage::new();
        let places = FakePlaces::new()
            .with("p1", place("A", "a.com"))
            .with("p2", place("B", "b.com"))
            .with("p3", place("C", "c.com"));
        let finder = FakeFinder::new()
            .with("a.com", EmailLookupResult::Found("a@a.com".into()))
            .with("b.com", EmailLookupResult::QuotaExhausted)
            .with("c.com", EmailLookupResult::Found("c@c.com".into()));

        let engine = HarvestEngine::new(storage.clone(), MockConfig::new(), places, finder);
        let summary = engine.run().await.unwrap();

        assert_eq!(summary.rows_appended, 1);
        assert_eq!(summary.places_processed, 2);
        assert!(matches!(summary.aborted, Some(AbortReason::QuotaExhausted { .. })));

        let content = storage.contents("master.csv").await;
        assert!(content.contains("a@a.com"));
        assert!(!content.contains("c@c.com"));
    }

    #[tokio::test]
    async fn test_storage_failure_is_an_error() {
        let places = FakePlaces::new().with("p1", place("A", "a.com"));
        let finder = FakeFinder::new().with("a.com", EmailLookupResult::Found("a@a.com".into()));

        let engine = HarvestEngine::new(MemoryStorage::failing(), MockConfig::new(), places, finder);
        let result = engine.run().await;

        assert!(matches!(result, Err(LeadError::IoError(_))));
    }

    #[tokio::test]
    async fn test_empty_search_writes_nothing() {
        let storage = MemoryStorage::new();
        let engine = HarvestEngine::new(
            storage.clone(),
            MockConfig::new(),
            FakePlaces::new(),
            FakeFinder::new(),
        );

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.places_found, 0);
        assert_eq!(summary.rows_appended, 0);
        assert!(storage.contents("master.csv").await.is_empty());
    }
}
