use async_trait::async_trait;
use otakunote_models::{MediaMetadata, SearchFilters};

use crate::error::CatalogError;

/// Read-only view of the external media catalog. The store layer consumes
/// this to resolve title ids into display metadata; implementations must
/// treat unresolvable ids as absent rather than as errors.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Batched id lookup. Partial results are expected: ids the catalog
    /// does not know are simply missing from the returned list.
    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<MediaMetadata>, CatalogError>;

    /// Filtered search, popularity-sorted, paged.
    async fn search(&self, filters: &SearchFilters) -> Result<Vec<MediaMetadata>, CatalogError>;

    /// Full record for a single title (includes description), or None if
    /// the catalog does not know the id.
    async fn details(&self, id: &str) -> Result<Option<MediaMetadata>, CatalogError>;
}
