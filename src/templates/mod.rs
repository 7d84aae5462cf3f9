//! Built-in site templates using Tera template engine
//!
//! Templates and static assets are embedded directly in the binary.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::helpers::html_escape;

/// Static files copied to the output directory as-is
pub const ASSETS: &[(&str, &str)] = &[
    ("styles.css", include_str!("site/assets/styles.css")),
    ("spacetraveling.svg", include_str!("site/assets/spacetraveling.svg")),
    ("load-more.js", include_str!("site/assets/load-more.js")),
];

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // CMS strings are escaped everywhere; rich-text bodies are sanitized
        // upstream and marked `safe` in the templates. Slashes stay as-is so
        // URLs remain readable.
        tera.autoescape_on(vec![".html"]);
        tera.set_escape_fn(html_escape);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("post.html", include_str!("site/post.html")),
            ("loading.html", include_str!("site/loading.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            ("unavailable.html", include_str!("site/unavailable.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("site/partials/header.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,
    pub url: String,
    pub root: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub title: String,
    pub banner_url: Option<String>,
    pub author: String,
    pub date: Option<String>,
    pub read_time: String,
    pub sections: Vec<SectionData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionData {
    pub heading: String,
    /// Sanitized HTML of the section body
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_context() -> Context {
        let mut context = Context::new();
        context.insert(
            "site",
            &SiteData {
                title: "spacetraveling".to_string(),
                description: String::new(),
                language: "pt-BR".to_string(),
                timezone: "UTC".to_string(),
                url: "http://localhost:4000".to_string(),
                root: "/".to_string(),
            },
        );
        let mut i18n = HashMap::new();
        i18n.insert("logo_alt", "logo");
        i18n.insert("loading", "Carregando...");
        context.insert("i18n", &i18n);
        context.insert("version", "test");
        context
    }

    #[test]
    fn test_all_templates_parse() {
        let renderer = TemplateRenderer::new().unwrap();
        let names: Vec<_> = renderer.tera.get_template_names().collect();
        assert!(names.contains(&"index.html"));
        assert!(names.contains(&"post.html"));
        assert!(names.contains(&"partials/header.html"));
    }

    #[test]
    fn test_loading_page() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = base_context();
        context.insert("refresh_seconds", &2);

        let html = renderer.render("loading.html", &context).unwrap();
        assert!(html.contains("<h1>Carregando...</h1>"));
        assert!(html.contains(r#"<meta http-equiv="refresh" content="2">"#));
        assert!(html.contains(r#"<img src="/spacetraveling.svg" alt="logo">"#));
    }

    #[test]
    fn test_cms_strings_are_escaped() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = base_context();
        context.insert(
            "post",
            &PostPageData {
                title: "<b>Bold</b> & co".to_string(),
                banner_url: None,
                author: "Ana".to_string(),
                date: None,
                read_time: "1 min".to_string(),
                sections: vec![SectionData {
                    heading: "Intro".to_string(),
                    html: "<p>kept</p>".to_string(),
                }],
            },
        );

        let html = renderer.render("post.html", &context).unwrap();
        assert!(html.contains("<h1>&lt;b&gt;Bold&lt;/b&gt; &amp; co</h1>"));
        assert!(html.contains(r#"<div class="body"><p>kept</p></div>"#));
        assert!(!html.contains("class=\"banner\""));
    }
}
