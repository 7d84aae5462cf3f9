//! Post view models

use serde::{Deserialize, Serialize};

use crate::cms::{Banner, ContentSection, Document, PostDocument, PostFields};
use crate::helpers::read_time_minutes;

/// A post as listed on the home page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub uid: Option<String>,
    /// Raw CMS timestamp
    pub first_publication_date: Option<String>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

impl From<PostDocument> for PostSummary {
    fn from(doc: PostDocument) -> Self {
        Self {
            uid: doc.uid,
            first_publication_date: doc.first_publication_date,
            title: doc.data.title,
            subtitle: doc.data.subtitle,
            author: doc.data.author,
        }
    }
}

impl PostSummary {
    /// Rebuild a minimal CMS document from the summary
    ///
    /// Only the projected fields survive; everything else is defaulted.
    pub fn into_document(self, document_type: &str) -> PostDocument {
        Document {
            id: String::new(),
            uid: self.uid,
            document_type: document_type.to_string(),
            first_publication_date: self.first_publication_date,
            last_publication_date: None,
            tags: Vec::new(),
            lang: None,
            data: PostFields {
                title: self.title,
                subtitle: self.subtitle,
                author: self.author,
                ..Default::default()
            },
        }
    }
}

/// One page of posts plus the cursor to the next one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostsPagination {
    pub results: Vec<PostSummary>,
    pub next_page: Option<String>,
}

/// A post as shown on its detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub uid: Option<String>,
    pub first_publication_date: Option<String>,
    pub title: String,
    pub banner: Banner,
    pub author: String,
    pub content: Vec<ContentSection>,
}

impl From<PostDocument> for PostDetail {
    fn from(doc: PostDocument) -> Self {
        Self {
            uid: doc.uid,
            first_publication_date: doc.first_publication_date,
            title: doc.data.title,
            banner: doc.data.banner,
            author: doc.data.author,
            content: doc.data.content,
        }
    }
}

impl PostDetail {
    /// Estimated read time in minutes
    pub fn read_time(&self) -> usize {
        read_time_minutes(&self.content)
    }
}
