pub mod browser;
pub mod detail;
pub mod extract;
pub mod pagination;
pub mod traits;
pub mod types;

pub use browser::IndexBrowser;
pub use detail::DetailScraper;
pub use traits::{ListingIndex, ListingSource};
pub use types::SiteConfig;
