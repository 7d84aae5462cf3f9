//! Wire types returned by the Prismic REST API

use serde::{Deserialize, Serialize};

use super::richtext::RichTextBlock;

/// A single CMS document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<T> {
    #[serde(default)]
    pub id: String,

    /// URL-friendly unique identifier, absent on some document types
    #[serde(default)]
    pub uid: Option<String>,

    #[serde(rename = "type", default)]
    pub document_type: String,

    #[serde(default)]
    pub first_publication_date: Option<String>,

    #[serde(default)]
    pub last_publication_date: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub lang: Option<String>,

    pub data: T,
}

/// One page of a document search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse<T> {
    #[serde(default = "default_page")]
    pub page: usize,

    #[serde(default)]
    pub results_per_page: usize,

    #[serde(default)]
    pub total_results_size: usize,

    #[serde(default)]
    pub total_pages: usize,

    /// Cursor to the following page, `None` on the last page
    #[serde(default)]
    pub next_page: Option<String>,

    #[serde(default)]
    pub prev_page: Option<String>,

    #[serde(default = "Vec::new")]
    pub results: Vec<Document<T>>,
}

fn default_page() -> usize {
    1
}

/// Custom fields of a `posts` document
///
/// Listing and detail queries return the same document type, so every field
/// is defaulted and the two views read the subset they need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostFields {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Banner,
    pub content: Vec<ContentSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Banner {
    pub url: String,
    pub alt: Option<String>,
}

/// A group of the post body: a heading followed by rich text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSection {
    pub heading: String,
    pub body: Vec<RichTextBlock>,
}

/// API root document, used to discover the master ref
#[derive(Debug, Clone, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub refs: Vec<Ref>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ref {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

impl ApiInfo {
    /// The ref pointing at published content
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "page": 1,
            "results_per_page": 1,
            "results_size": 1,
            "total_results_size": 2,
            "total_pages": 2,
            "next_page": "https://blog.cdn.prismic.io/api/v2/documents/search?page=2",
            "prev_page": null,
            "results": [{
                "id": "YE6z",
                "uid": "como-utilizar-hooks",
                "type": "posts",
                "href": "https://blog.cdn.prismic.io/api/v2/documents/search",
                "first_publication_date": "2021-03-15T19:25:28+0000",
                "last_publication_date": "2021-03-15T19:25:28+0000",
                "slugs": ["como-utilizar-hooks"],
                "lang": "pt-br",
                "data": {
                    "title": "Como utilizar Hooks",
                    "subtitle": "Pensando em sincronização em vez de ciclos de vida",
                    "author": "Joseph Oliveira"
                }
            }]
        }"#;

        let response: SearchResponse<PostFields> = serde_json::from_str(json).unwrap();
        assert_eq!(response.total_pages, 2);
        assert!(response.next_page.is_some());
        assert_eq!(response.results.len(), 1);

        let doc = &response.results[0];
        assert_eq!(doc.uid.as_deref(), Some("como-utilizar-hooks"));
        assert_eq!(doc.document_type, "posts");
        assert_eq!(doc.data.author, "Joseph Oliveira");
        assert!(doc.data.content.is_empty());
        assert!(doc.data.banner.url.is_empty());
    }

    #[test]
    fn test_parse_detail_document() {
        let json = r#"{
            "id": "YE6z",
            "uid": "como-utilizar-hooks",
            "type": "posts",
            "first_publication_date": null,
            "data": {
                "title": "Como utilizar Hooks",
                "banner": { "url": "https://images.prismic.io/banner.png", "dimensions": {} },
                "author": "Joseph Oliveira",
                "content": [{
                    "heading": "Proin et varius",
                    "body": [{ "type": "paragraph", "text": "Nullam dolor sapien", "spans": [] }]
                }]
            }
        }"#;

        let doc: Document<PostFields> = serde_json::from_str(json).unwrap();
        assert!(doc.first_publication_date.is_none());
        assert_eq!(doc.data.banner.url, "https://images.prismic.io/banner.png");
        assert_eq!(doc.data.content.len(), 1);
        assert_eq!(doc.data.content[0].body[0].text, "Nullam dolor sapien");
    }

    #[test]
    fn test_master_ref() {
        let json = r#"{
            "refs": [
                { "id": "preview", "ref": "abc", "label": "Preview", "isMasterRef": false },
                { "id": "master", "ref": "YE6zLxAAACMAb0Xx", "label": "Master", "isMasterRef": true }
            ],
            "types": { "posts": "Posts" }
        }"#;
        let info: ApiInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.master_ref(), Some("YE6zLxAAACMAb0Xx"));
    }
}
