//! Home page post list with "load more" pagination

use serde::Serialize;

use super::{PostSummary, PostsPagination};
use crate::cms::ContentSource;
use crate::config::SiteConfig;
use crate::error::CmsError;
use crate::helpers::{post_url, DateFormatter};

/// A post ready for display in the list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    pub uid: Option<String>,
    pub href: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    /// Publication date already formatted for display
    pub date: Option<String>,
}

/// The list of displayed posts and the cursor to the next page
///
/// Every page, the first included, is formatted as soon as it is received.
/// Pages are only ever appended.
pub struct PostFeed {
    entries: Vec<FeedEntry>,
    next_page: Option<String>,
    formatter: DateFormatter,
    config: SiteConfig,
}

impl PostFeed {
    pub fn new(pagination: PostsPagination, formatter: DateFormatter, config: &SiteConfig) -> Self {
        let mut feed = Self {
            entries: Vec::with_capacity(pagination.results.len()),
            next_page: pagination.next_page,
            formatter,
            config: config.clone(),
        };
        feed.append(pagination.results);
        feed
    }

    pub fn entries(&self) -> &[FeedEntry] {
        &self.entries
    }

    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    /// Whether the "load more" control should be offered
    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Fetch the next page and append it
    ///
    /// Returns the number of appended posts. Without a cursor nothing is
    /// requested. On failure the feed is left as it was, so the caller can
    /// retry.
    pub async fn load_more<S: ContentSource + ?Sized>(
        &mut self,
        source: &S,
    ) -> Result<usize, CmsError> {
        let Some(cursor) = self.next_page.as_deref() else {
            return Ok(0);
        };

        let page = source.fetch_page(cursor).await?;
        let count = page.results.len();
        tracing::debug!("Loaded {} more posts", count);

        self.append(page.results.into_iter().map(PostSummary::from).collect());
        self.next_page = page.next_page;

        Ok(count)
    }

    fn append(&mut self, posts: Vec<PostSummary>) {
        for post in posts {
            let date = self.formatter.format(post.first_publication_date.as_deref());
            let href = post.uid.as_deref().map(|uid| post_url(&self.config, uid));
            self.entries.push(FeedEntry {
                uid: post.uid,
                href,
                title: post.title,
                subtitle: post.subtitle,
                author: post.author,
                date,
            });
        }
    }
}
