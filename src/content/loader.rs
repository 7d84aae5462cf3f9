//! Content loader - shapes CMS responses into page view models

use std::time::Duration;

use super::{PostDetail, PostSummary, PostsPagination};
use crate::cms::ContentSource;
use crate::config::SiteConfig;
use crate::error::CmsError;

/// Data for the home page
#[derive(Debug, Clone, PartialEq)]
pub struct HomeProps {
    pub posts_pagination: PostsPagination,
}

/// Detail routes known at build time
#[derive(Debug, Clone, PartialEq)]
pub struct StaticPaths {
    /// One slug per post uid
    pub paths: Vec<String>,
    /// Unknown slugs are generated on demand instead of answering 404
    pub fallback: bool,
}

/// Page data plus how long the generated page stays fresh
#[derive(Debug, Clone, PartialEq)]
pub struct StaticProps<T> {
    pub props: T,
    pub revalidate: Option<Duration>,
}

/// Loads page data from a content source
pub struct ContentLoader<'a, S: ContentSource + ?Sized> {
    source: &'a S,
    config: &'a SiteConfig,
}

impl<'a, S: ContentSource + ?Sized> ContentLoader<'a, S> {
    /// Create a new content loader
    pub fn new(source: &'a S, config: &'a SiteConfig) -> Self {
        Self { source, config }
    }

    /// Load the first page of posts for the home page
    pub async fn load_home(&self) -> Result<HomeProps, CmsError> {
        let response = self
            .source
            .get_by_type(&self.config.cms.document_type, Some(self.config.cms.page_size))
            .await?;

        let results = response
            .results
            .into_iter()
            .map(PostSummary::from)
            .collect();

        Ok(HomeProps {
            posts_pagination: PostsPagination {
                results,
                next_page: response.next_page,
            },
        })
    }

    /// Enumerate every post slug, following cursors until exhausted
    pub async fn list_paths(&self) -> Result<StaticPaths, CmsError> {
        let mut page = self
            .source
            .get_by_type(&self.config.cms.document_type, None)
            .await?;
        let mut paths = Vec::new();

        loop {
            for doc in page.results {
                match doc.uid {
                    Some(uid) => paths.push(uid),
                    None => tracing::warn!("Skipping document {} without uid", doc.id),
                }
            }

            match page.next_page {
                Some(cursor) => page = self.source.fetch_page(&cursor).await?,
                None => break,
            }
        }

        Ok(StaticPaths {
            paths,
            fallback: true,
        })
    }

    /// Load a single post by slug
    pub async fn load_by_slug(&self, slug: &str) -> Result<StaticProps<PostDetail>, CmsError> {
        let doc = self
            .source
            .get_by_uid(&self.config.cms.document_type, slug)
            .await?;

        Ok(StaticProps {
            props: PostDetail::from(doc),
            revalidate: Some(Duration::from_secs(self.config.revalidate)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::testing::{post, MemorySource};

    fn source() -> MemorySource {
        MemorySource::new(
            vec![
                post("first", "First", "2021-03-25T19:25:28+0000"),
                post("second", "Second", "2021-03-20T10:00:00+0000"),
                post("third", "Third", "2021-03-10T10:00:00+0000"),
            ],
            2,
        )
    }

    #[tokio::test]
    async fn test_load_home_uses_page_size() {
        let source = source();
        let config = SiteConfig::default();
        let home = ContentLoader::new(&source, &config).load_home().await.unwrap();

        assert_eq!(home.posts_pagination.results.len(), 1);
        assert_eq!(home.posts_pagination.results[0].title, "First");
        assert!(home.posts_pagination.next_page.is_some());
    }

    #[tokio::test]
    async fn test_list_paths_follows_cursors() {
        let source = source();
        let config = SiteConfig::default();
        let paths = ContentLoader::new(&source, &config).list_paths().await.unwrap();

        assert_eq!(paths.paths, vec!["first", "second", "third"]);
        assert!(paths.fallback);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_load_by_slug() {
        let source = source();
        let config = SiteConfig::default();
        let loader = ContentLoader::new(&source, &config);

        let props = loader.load_by_slug("second").await.unwrap();
        assert_eq!(props.props.title, "Second");
        assert_eq!(props.revalidate, Some(Duration::from_secs(3600)));

        assert!(loader.load_by_slug("missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let source = source();
        source.fail_next_request();
        let config = SiteConfig::default();
        assert!(ContentLoader::new(&source, &config).load_home().await.is_err());
    }
}
