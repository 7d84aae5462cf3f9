//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable overriding `cms.endpoint`
pub const ENDPOINT_ENV: &str = "PRISMIC_API_ENDPOINT";
/// Environment variable overriding `cms.access_token`
pub const ACCESS_TOKEN_ENV: &str = "PRISMIC_ACCESS_TOKEN";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,
    pub cache_dir: String,
    pub languages_dir: String,

    // Date format (date-fns tokens)
    pub date_format: String,

    // Incremental regeneration window, in seconds
    pub revalidate: u64,

    // Content source
    #[serde(default)]
    pub cms: CmsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            language: "pt-BR".to_string(),
            timezone: "UTC".to_string(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),
            cache_dir: ".spacetraveling-cache".to_string(),
            languages_dir: "languages".to_string(),

            date_format: "dd MMM yyyy".to_string(),

            revalidate: 60 * 60,

            cms: CmsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }

    /// Apply CMS overrides from the environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(ACCESS_TOKEN_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, endpoint: Option<String>, access_token: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) {
            tracing::debug!("CMS endpoint overridden from {}", ENDPOINT_ENV);
            self.cms.endpoint = endpoint;
        }
        if let Some(token) = access_token.filter(|t| !t.is_empty()) {
            self.cms.access_token = Some(token);
        }
    }
}

/// Headless CMS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmsConfig {
    /// API root, e.g. `https://<repo>.cdn.prismic.io/api/v2`
    pub endpoint: String,
    pub access_token: Option<String>,
    /// Custom type holding blog posts
    pub document_type: String,
    /// Posts per page on the home page and per "load more"
    pub page_size: usize,
}

impl Default for CmsConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            document_type: "posts".to_string(),
            page_size: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.language, "pt-BR");
        assert_eq!(config.revalidate, 3600);
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.cms.page_size, 1);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
language: en
timezone: America/Sao_Paulo
cms:
  endpoint: https://myblog.cdn.prismic.io/api/v2
  page_size: 5
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.language, "en");
        assert_eq!(config.timezone, "America/Sao_Paulo");
        assert_eq!(config.cms.endpoint, "https://myblog.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.page_size, 5);
        assert_eq!(config.cms.document_type, "posts");
        assert_eq!(config.date_format, "dd MMM yyyy");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SiteConfig::default();
        config.cms.endpoint = "https://a.cdn.prismic.io/api/v2".to_string();

        config.apply_overrides(Some(String::new()), None);
        assert_eq!(config.cms.endpoint, "https://a.cdn.prismic.io/api/v2");

        config.apply_overrides(
            Some("https://b.cdn.prismic.io/api/v2".to_string()),
            Some("secret".to_string()),
        );
        assert_eq!(config.cms.endpoint, "https://b.cdn.prismic.io/api/v2");
        assert_eq!(config.cms.access_token.as_deref(), Some("secret"));
    }
}
