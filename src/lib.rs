//! spacetraveling: a static blog generator backed by a headless CMS
//!
//! Posts live in a Prismic repository. At build time the home page (first
//! page of posts) and one page per post are rendered with embedded Tera
//! templates. The preview server regenerates post pages on demand once they
//! are older than the revalidation window.

pub mod cache;
pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use error::CmsError;

/// A blog site rooted at a directory
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Route manifest directory
    pub cache_dir: PathBuf,
    /// Language overrides directory
    pub languages_dir: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    ///
    /// Reads `_config.yml` when present and applies CMS overrides from the
    /// environment.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a Blog from an already loaded configuration
    pub fn with_config(base_dir: PathBuf, config: config::SiteConfig) -> Self {
        let public_dir = base_dir.join(&config.public_dir);
        let cache_dir = base_dir.join(&config.cache_dir);
        let languages_dir = base_dir.join(&config.languages_dir);

        Self {
            config,
            base_dir,
            public_dir,
            cache_dir,
            languages_dir,
        }
    }

    /// Client for the configured CMS repository
    pub fn cms_client(&self) -> Result<cms::PrismicClient> {
        if self.config.cms.endpoint.is_empty() {
            anyhow::bail!(
                "No CMS endpoint configured. Set cms.endpoint in _config.yml or {}",
                config::ENDPOINT_ENV
            );
        }
        Ok(cms::PrismicClient::from_config(&self.config.cms)?)
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory and route manifest
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
