use crate::error::FetchError;
use crate::models::{ListingDocument, ListingId};
use crate::scrapers::extract::parse_listing;
use crate::scrapers::traits::ListingSource;
use crate::scrapers::types::SiteConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

/// Detail page fetcher over plain HTTP
pub struct DetailScraper {
    client: Client,
    site: SiteConfig,
}

impl DetailScraper {
    pub fn new(site: SiteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(site.request_timeout)
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, site })
    }
}

#[async_trait]
impl ListingSource for DetailScraper {
    async fn fetch_listing(&self, id: &ListingId) -> Result<Option<ListingDocument>, FetchError> {
        let url = self.site.listing_url(id);
        debug!("Fetching URL: {}", url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Ok(None);
        }
        if !status.is_success() {
            warn!("Listing page returned status: {}", status);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let html = response.text().await?;
        debug!("Downloaded {} bytes of HTML", html.len());

        Ok(parse_listing(&html))
    }

    fn source_name(&self) -> &'static str {
        "28Hse"
    }
}
