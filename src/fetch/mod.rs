// Fetch module: paginated feed client plus the 30-day window driver.

pub mod client;
pub mod traits;
pub mod windows;

pub use client::{HttpFeedClient, bid_params, order_params, page_complete, prior_params, rd_params};
pub use traits::FeedClient;
pub use windows::{fetch_bid_windows, split_windows};
