use crate::domain::model::{EmailLookupResult, PlaceDetails, RawPlace, SearchQuery};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    /// Returns `None` when nothing has been stored at `path` yet.
    fn read_file(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;
    fn append_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn output_path(&self) -> &str;
    fn search_query(&self) -> &SearchQuery;
    fn max_pages(&self) -> usize;
}

#[async_trait]
pub trait PlacesProvider: Send + Sync {
    async fn search(&self, query: &str, max_pages: usize) -> Result<Vec<RawPlace>>;
    async fn details(&self, place_id: &str) -> Result<PlaceDetails>;
}

#[async_trait]
pub trait EmailFinder: Send + Sync {
    fn provider_name(&self) -> &str;
    async fn find_email(&self, business_name: &str, website_url: &str) -> EmailLookupResult;
}
