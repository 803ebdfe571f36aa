use crate::error::FetchError;
use crate::models::{IdSet, ListingDocument, ListingId};
use anyhow::Result;
use async_trait::async_trait;

/// Enumerates every listing ID currently on the site's index
#[async_trait]
pub trait ListingIndex: Send + Sync {
    /// Page through the index until it runs out or the page ceiling is hit.
    /// A page that fails to load contributes no IDs but does not stop the pass.
    async fn discover_listing_ids(&self) -> Result<IdSet>;
}

/// Fetches and extracts one listing's detail page
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// `Ok(None)` when the page is not a valid listing
    async fn fetch_listing(&self, id: &ListingId) -> Result<Option<ListingDocument>, FetchError>;

    /// Get the name of the source
    fn source_name(&self) -> &'static str;
}
