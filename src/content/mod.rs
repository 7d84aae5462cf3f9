//! Content module - view models, loading and pagination

pub mod feed;
pub mod loader;
mod post;

pub use feed::{FeedEntry, PostFeed};
pub use loader::{ContentLoader, HomeProps, StaticPaths, StaticProps};
pub use post::{PostDetail, PostSummary, PostsPagination};
