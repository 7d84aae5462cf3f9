//! Generator module - renders pages with the built-in Tera templates

use anyhow::{Context as _, Result};
use chrono::Utc;
use std::fs;
use std::path::PathBuf;

use tera::Context;

use crate::cache::RouteManifest;
use crate::cms::{as_html, is_safe_url, ContentSource};
use crate::content::{ContentLoader, HomeProps, PostDetail, PostFeed};
use crate::helpers::{is_valid_slug, post_route, DateFormatter};
use crate::i18n::I18n;
use crate::templates::{PostPageData, SectionData, SiteData, TemplateRenderer, ASSETS};
use crate::Blog;

/// Seconds between reloads of the placeholder page
pub const FALLBACK_REFRESH_SECONDS: u64 = 2;

/// Static site generator using Tera templates
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
    i18n: I18n,
    formatter: DateFormatter,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let formatter = DateFormatter::from_config(&blog.config)?;

        let mut i18n = I18n::new(&blog.config.language);
        i18n.load_languages(&blog.languages_dir)?;

        Ok(Self {
            blog: blog.clone(),
            renderer,
            i18n,
            formatter,
        })
    }

    /// Create a base context with common variables
    fn create_base_context(&self) -> Context {
        let config = &self.blog.config;
        let mut context = Context::new();
        context.insert(
            "site",
            &SiteData {
                title: config.title.clone(),
                description: config.description.clone(),
                language: config.language.clone(),
                timezone: config.timezone.clone(),
                url: config.url.clone(),
                root: format!("{}/", config.root.trim_end_matches('/')),
            },
        );
        context.insert("i18n", &self.i18n.get_all_translations());
        context.insert("version", env!("CARGO_PKG_VERSION"));
        context
    }

    /// Copy the embedded stylesheet, logo and scripts
    pub fn write_assets(&self) -> Result<()> {
        for (name, content) in ASSETS {
            self.write(name, content)?;
        }
        Ok(())
    }

    /// Render the home page
    pub fn render_home(&self, home: &HomeProps) -> Result<String> {
        let feed = PostFeed::new(
            home.posts_pagination.clone(),
            self.formatter.clone(),
            &self.blog.config,
        );

        let mut context = self.create_base_context();
        context.insert("posts", feed.entries());
        context.insert("next_page", &feed.next_page());
        self.renderer.render("index.html", &context)
    }

    pub fn write_home(&self, home: &HomeProps) -> Result<PathBuf> {
        let html = self.render_home(home)?;
        self.write("index.html", &html)
    }

    /// Render a post detail page
    pub fn render_post(&self, post: &PostDetail) -> Result<String> {
        let banner_url = Some(post.banner.url.clone()).filter(|url| is_safe_url(url));
        let sections = post
            .content
            .iter()
            .map(|section| SectionData {
                heading: section.heading.clone(),
                html: as_html(&section.body, &self.blog.config.root),
            })
            .collect();

        let page = PostPageData {
            title: post.title.clone(),
            banner_url,
            author: post.author.clone(),
            date: self
                .formatter
                .format(post.first_publication_date.as_deref()),
            read_time: self.i18n.get_count("read_time", post.read_time()),
            sections,
        };

        let mut context = self.create_base_context();
        context.insert("post", &page);
        self.renderer.render("post.html", &context)
    }

    /// Write a post page, returning its path relative to the public dir
    pub fn write_post(&self, post: &PostDetail) -> Result<String> {
        let uid = post
            .uid
            .as_deref()
            .context("Cannot write a post without uid")?;
        if !is_valid_slug(uid) {
            anyhow::bail!("Refusing to write post with unsafe uid {:?}", uid);
        }

        let html = self.render_post(post)?;
        let relative = format!("post/{}/index.html", uid);
        self.write(&relative, &html)?;
        tracing::debug!("Generated post: {}", relative);
        Ok(relative)
    }

    /// Placeholder shown while a post is generated on demand
    pub fn render_fallback(&self) -> Result<String> {
        let mut context = self.create_base_context();
        context.insert("refresh_seconds", &FALLBACK_REFRESH_SECONDS);
        self.renderer.render("loading.html", &context)
    }

    pub fn render_not_found(&self) -> Result<String> {
        self.renderer
            .render("not_found.html", &self.create_base_context())
    }

    /// Error page for a post whose first fetch failed
    pub fn render_unavailable(&self) -> Result<String> {
        self.renderer
            .render("unavailable.html", &self.create_base_context())
    }

    fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let output_path = self.blog.public_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create dir {:?}", parent))?;
        }
        fs::write(&output_path, content)
            .with_context(|| format!("Failed to write {:?}", output_path))?;
        Ok(output_path)
    }
}

/// Build the whole site from a content source
///
/// Fetches run one after another. Any CMS failure aborts the build.
pub async fn generate_site<S: ContentSource + ?Sized>(
    blog: &Blog,
    source: &S,
) -> Result<RouteManifest> {
    let generator = Generator::new(blog)?;
    let loader = ContentLoader::new(source, &blog.config);

    generator.write_assets()?;

    let home = loader
        .load_home()
        .await
        .context("Failed to load the home page posts from the CMS")?;
    generator.write_home(&home)?;
    tracing::info!(
        "Generated home page with {} posts",
        home.posts_pagination.results.len()
    );

    let paths = loader
        .list_paths()
        .await
        .context("Failed to list posts from the CMS")?;

    let mut manifest = RouteManifest::new();
    for slug in &paths.paths {
        if !is_valid_slug(slug) {
            tracing::warn!("Skipping post with unsafe uid {:?}", slug);
            continue;
        }
        let props = loader
            .load_by_slug(slug)
            .await
            .with_context(|| format!("Failed to load post {:?} from the CMS", slug))?;
        let output = generator.write_post(&props.props)?;
        manifest.record_generated(&post_route(slug), &output, Utc::now());
    }

    manifest.save(&blog.cache_dir)?;
    tracing::info!("Generated {} post pages", manifest.len());

    Ok(manifest)
}
