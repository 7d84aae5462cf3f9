//! Headless CMS access
//!
//! Everything the site knows about its content comes through
//! [`ContentSource`]. [`PrismicClient`] implements it over the Prismic REST
//! API; tests substitute an in-memory source.

mod client;
mod document;
mod richtext;

use async_trait::async_trait;

pub use client::PrismicClient;
pub use document::{ApiInfo, Banner, ContentSection, Document, PostFields, Ref, SearchResponse};
pub use richtext::{
    as_html, as_text, is_safe_url, BlockKind, Embed, RichTextBlock, Span, SpanData, SpanKind,
};

use crate::error::CmsError;

/// A page of post documents
pub type PostPage = SearchResponse<PostFields>;
/// A single post document
pub type PostDocument = Document<PostFields>;

/// Typed query access to the CMS
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// First page of documents of a type, `page_size` defaulting to the API's
    async fn get_by_type(
        &self,
        document_type: &str,
        page_size: Option<usize>,
    ) -> Result<PostPage, CmsError>;

    /// The document of a type with the given uid
    async fn get_by_uid(&self, document_type: &str, uid: &str) -> Result<PostDocument, CmsError>;

    /// Follow a `next_page` cursor
    async fn fetch_page(&self, url: &str) -> Result<PostPage, CmsError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory content source for tests

    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Serves a fixed list of posts, paginated through fake cursor URLs
    pub struct MemorySource {
        pub posts: Vec<PostDocument>,
        pub page_size: usize,
        pub calls: AtomicUsize,
        pub fail_next: Mutex<bool>,
    }

    pub const CURSOR_PREFIX: &str = "https://cms.test/api/v2/documents/search?page=";

    impl MemorySource {
        pub fn new(posts: Vec<PostDocument>, page_size: usize) -> Self {
            Self {
                posts,
                page_size,
                calls: AtomicUsize::new(0),
                fail_next: Mutex::new(false),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn fail_next_request(&self) {
            *self.fail_next.lock().unwrap() = true;
        }

        fn record_call(&self, url: &str) -> Result<(), CmsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut fail = self.fail_next.lock().unwrap();
            if *fail {
                *fail = false;
                return Err(CmsError::Status {
                    status: 503,
                    url: url.to_string(),
                });
            }
            Ok(())
        }

        fn page(&self, page: usize, page_size: usize) -> PostPage {
            let start = (page - 1) * page_size;
            let results: Vec<_> = self
                .posts
                .iter()
                .skip(start)
                .take(page_size)
                .cloned()
                .collect();
            let total_pages = self.posts.len().div_ceil(page_size);
            SearchResponse {
                page,
                results_per_page: page_size,
                total_results_size: self.posts.len(),
                total_pages,
                next_page: (page < total_pages).then(|| format!("{}{}", CURSOR_PREFIX, page + 1)),
                prev_page: (page > 1).then(|| format!("{}{}", CURSOR_PREFIX, page - 1)),
                results,
            }
        }
    }

    #[async_trait]
    impl ContentSource for MemorySource {
        async fn get_by_type(
            &self,
            _document_type: &str,
            page_size: Option<usize>,
        ) -> Result<PostPage, CmsError> {
            self.record_call("get_by_type")?;
            Ok(self.page(1, page_size.unwrap_or(self.page_size)))
        }

        async fn get_by_uid(
            &self,
            document_type: &str,
            uid: &str,
        ) -> Result<PostDocument, CmsError> {
            self.record_call("get_by_uid")?;
            self.posts
                .iter()
                .find(|p| p.uid.as_deref() == Some(uid))
                .cloned()
                .ok_or_else(|| CmsError::NotFound {
                    document_type: document_type.to_string(),
                    uid: uid.to_string(),
                })
        }

        async fn fetch_page(&self, url: &str) -> Result<PostPage, CmsError> {
            self.record_call(url)?;
            let page = url
                .strip_prefix(CURSOR_PREFIX)
                .and_then(|p| p.parse().ok())
                .ok_or_else(|| CmsError::Status {
                    status: 404,
                    url: url.to_string(),
                })?;
            Ok(self.page(page, self.page_size))
        }
    }

    /// A post document with a one-section body
    pub fn post(uid: &str, title: &str, published: &str) -> PostDocument {
        Document {
            id: format!("id-{}", uid),
            uid: Some(uid.to_string()),
            document_type: "posts".to_string(),
            first_publication_date: Some(published.to_string()),
            last_publication_date: Some(published.to_string()),
            tags: Vec::new(),
            lang: Some("pt-br".to_string()),
            data: PostFields {
                title: title.to_string(),
                subtitle: format!("Subtitle of {}", title),
                author: "Joseph Oliveira".to_string(),
                banner: Banner {
                    url: format!("https://images.prismic.io/{}.png", uid),
                    alt: None,
                },
                content: vec![ContentSection {
                    heading: "Intro".to_string(),
                    body: vec![RichTextBlock::paragraph("a b c")],
                }],
            },
        }
    }
}
