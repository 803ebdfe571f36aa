use crate::models::IdSet;
use crate::scrapers::pagination::{collect_listing_ids, last_page_number, page_limit, PageDriver};
use crate::scrapers::traits::ListingIndex;
use crate::scrapers::types::SiteConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const LISTING_CARD: &str = ".detail_page";
const PAGINATION_ITEMS: &str = ".ui.menu.pagination a.item:not(.disabled)";
const NEXT_BUTTON: &str = r#"a.item[attr1="plus"]"#;

/// Browser-based listing index using headless Chrome
pub struct IndexBrowser {
    browser: Arc<Browser>,
    site: SiteConfig,
}

impl IndexBrowser {
    /// Launch headless Chrome
    pub fn launch(site: SiteConfig) -> Result<Self> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .idle_browser_timeout(Duration::from_secs(300))
            .build()
            .context("Failed to build launch options")?;

        let browser = Browser::new(options).context("Failed to launch Chrome browser")?;

        Ok(Self {
            browser: Arc::new(browser),
            site,
        })
    }
}

#[async_trait]
impl ListingIndex for IndexBrowser {
    async fn discover_listing_ids(&self) -> Result<IdSet> {
        let browser = Arc::clone(&self.browser);
        let site = self.site.clone();

        // headless_chrome blocks; keep it off the async workers
        tokio::task::spawn_blocking(move || discover(&browser, &site))
            .await
            .context("Discovery task panicked")?
    }
}

fn discover(browser: &Browser, site: &SiteConfig) -> Result<IdSet> {
    let url = site.index_url();
    info!("Opening listing index {}", url);

    let tab = browser.new_tab().context("Failed to open tab")?;
    tab.navigate_to(&url)?;
    tab.wait_until_navigated()?;
    thread::sleep(site.page_delay);

    let mut driver = ChromeIndex {
        tab: Arc::clone(&tab),
        settle: site.page_delay,
    };

    let advertised = driver.last_page();
    match advertised {
        Some(max) => info!("Extracted maximum page number: {}", max),
        None => info!("No page numbers found."),
    }

    let ids = collect_listing_ids(&mut driver, page_limit(advertised, site.page_ceiling));

    if let Err(e) = tab.close(true) {
        debug!("Failed to close index tab: {}", e);
    }

    Ok(ids)
}

/// Index cursor over a live Chrome tab
struct ChromeIndex {
    tab: Arc<Tab>,
    settle: Duration,
}

impl ChromeIndex {
    fn last_page(&self) -> Option<u32> {
        let items = match self.tab.find_elements(PAGINATION_ITEMS) {
            Ok(items) => items,
            Err(e) => {
                warn!("Pagination menu not found: {}", e);
                return None;
            }
        };

        let attrs: Vec<String> = items
            .iter()
            .filter_map(|item| item.get_attribute_value("attr1").ok().flatten())
            .collect();

        last_page_number(attrs)
    }
}

impl PageDriver for ChromeIndex {
    fn listing_ids(&mut self) -> Result<Vec<String>> {
        let cards = self
            .tab
            .find_elements(LISTING_CARD)
            .context("No listing cards on page")?;

        let mut ids = Vec::with_capacity(cards.len());
        for card in &cards {
            if let Some(id) = card.get_attribute_value("attr1")? {
                ids.push(id);
            }
        }

        debug!("Found {} listing cards", ids.len());
        Ok(ids)
    }

    fn next_page(&mut self) -> Result<bool> {
        let next = self
            .tab
            .find_element(NEXT_BUTTON)
            .context("Next button not found")?;

        let disabled = next
            .get_attribute_value("class")?
            .map(|class| class.split_whitespace().any(|c| c == "disabled"))
            .unwrap_or(false);
        if disabled {
            return Ok(false);
        }

        next.scroll_into_view()?;
        next.click()?;
        thread::sleep(self.settle);
        Ok(true)
    }
}
