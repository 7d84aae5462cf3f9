//! Prismic REST API client

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use super::document::ApiInfo;
use super::{ContentSource, PostDocument, PostPage};
use crate::config::CmsConfig;
use crate::error::CmsError;

/// HTTP client for a Prismic repository
///
/// Each query first asks the API root for the current master ref, so the
/// client always reads the latest published content.
#[derive(Debug, Clone)]
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: Url,
    access_token: Option<String>,
}

impl PrismicClient {
    /// Create a client for an API root such as `https://repo.cdn.prismic.io/api/v2`
    pub fn new(endpoint: &str, access_token: Option<String>) -> Result<Self, CmsError> {
        let endpoint = Url::parse(endpoint).map_err(|source| CmsError::InvalidUrl {
            url: endpoint.to_string(),
            source,
        })?;

        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
            access_token,
        })
    }

    pub fn from_config(config: &CmsConfig) -> Result<Self, CmsError> {
        Self::new(&config.endpoint, config.access_token.clone())
    }

    /// Fetch the ref of the published content
    async fn master_ref(&self) -> Result<String, CmsError> {
        let mut url = self.endpoint.clone();
        self.authorize(&mut url);

        let info: ApiInfo = self.get_json(url).await?;
        info.master_ref()
            .map(str::to_string)
            .ok_or_else(|| CmsError::NoMasterRef(self.endpoint.to_string()))
    }

    /// Run a predicate query against the master ref
    async fn search(&self, predicate: &str, page_size: Option<usize>) -> Result<PostPage, CmsError> {
        let master_ref = self.master_ref().await?;

        let search_url = format!(
            "{}/documents/search",
            self.endpoint.as_str().trim_end_matches('/')
        );
        let mut url = Url::parse(&search_url).map_err(|source| CmsError::InvalidUrl {
            url: search_url.clone(),
            source,
        })?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("ref", &master_ref);
            query.append_pair("q", &format!("[{}]", predicate));
            if let Some(size) = page_size {
                query.append_pair("pageSize", &size.to_string());
            }
        }
        self.authorize(&mut url);

        tracing::debug!("CMS query {}", predicate);
        self.get_json(url).await
    }

    /// Add the access token unless the URL already carries one
    fn authorize(&self, url: &mut Url) {
        let Some(token) = &self.access_token else {
            return;
        };
        if !url.query_pairs().any(|(key, _)| key == "access_token") {
            url.query_pairs_mut().append_pair("access_token", token);
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CmsError> {
        let shown = redact(&url);
        let response = self.http.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CmsError::Status {
                status: status.as_u16(),
                url: shown,
            });
        }

        let body = response.text().await.map_err(transport)?;
        serde_json::from_str(&body).map_err(|e| CmsError::Decode {
            url: shown,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl ContentSource for PrismicClient {
    async fn get_by_type(
        &self,
        document_type: &str,
        page_size: Option<usize>,
    ) -> Result<PostPage, CmsError> {
        let predicate = format!(r#"[at(document.type,"{}")]"#, escape_quotes(document_type));
        self.search(&predicate, page_size).await
    }

    async fn get_by_uid(&self, document_type: &str, uid: &str) -> Result<PostDocument, CmsError> {
        let predicate = format!(
            r#"[at(my.{}.uid,"{}")]"#,
            document_type,
            escape_quotes(uid)
        );
        let page = self.search(&predicate, Some(1)).await?;
        page.results
            .into_iter()
            .next()
            .ok_or_else(|| CmsError::NotFound {
                document_type: document_type.to_string(),
                uid: uid.to_string(),
            })
    }

    async fn fetch_page(&self, cursor: &str) -> Result<PostPage, CmsError> {
        let mut url = Url::parse(cursor).map_err(|source| CmsError::InvalidUrl {
            url: cursor.to_string(),
            source,
        })?;
        self.authorize(&mut url);
        self.get_json(url).await
    }
}

/// reqwest errors carry the request URL, access token included
fn transport(e: reqwest::Error) -> CmsError {
    CmsError::Http(e.without_url())
}

fn escape_quotes(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// URL as shown in logs and errors, without the access token
fn redact(url: &Url) -> String {
    if !url.query_pairs().any(|(key, _)| key == "access_token") {
        return url.to_string();
    }
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "access_token")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}
