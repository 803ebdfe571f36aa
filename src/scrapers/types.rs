use std::time::Duration;

use crate::models::ListingId;

/// Where and how to scrape the classifieds site
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Site root, e.g. `https://www.28hse.com/en`
    pub base_url: String,
    /// Settle time after each page navigation
    pub page_delay: Duration,
    /// Timeout for detail page requests
    pub request_timeout: Duration,
    /// Hard cap on index pages visited in one discovery pass
    pub page_ceiling: Option<u32>,
}

impl SiteConfig {
    /// First page of the rental listing index
    pub fn index_url(&self) -> String {
        format!("{}/rent", self.base_url.trim_end_matches('/'))
    }

    /// Detail page of one listing
    pub fn listing_url(&self, id: &ListingId) -> String {
        format!(
            "{}/rent/residential/property-{}",
            self.base_url.trim_end_matches('/'),
            id
        )
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.28hse.com/en".to_string(),
            page_delay: Duration::from_secs(3),
            request_timeout: Duration::from_secs(30),
            page_ceiling: None,
        }
    }
}
