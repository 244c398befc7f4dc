pub mod registry;
pub mod rss_feed;

pub use registry::{registry, SourceEntry};
pub use rss_feed::FeedReader;
