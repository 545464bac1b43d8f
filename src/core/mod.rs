pub mod etl;
pub mod index;
pub mod pipeline;
pub mod sink;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::domain::model::{BusinessRecord, EmailLookupResult, RunSummary};
pub use crate::domain::ports::{ConfigProvider, EmailFinder, PlacesProvider, Storage};
pub use crate::utils::error::Result;
