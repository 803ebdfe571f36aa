pub mod collector;
pub mod retry;

pub use collector::{Collector, ListingOutcome, RunReport};
pub use retry::run_with_retries;
