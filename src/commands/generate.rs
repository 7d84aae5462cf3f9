//! Generate static files

use anyhow::Result;

use crate::generator::generate_site;
use crate::Blog;

/// Build the whole site from the configured CMS
pub async fn run(blog: &Blog) -> Result<()> {
    let start = std::time::Instant::now();
    let client = blog.cms_client()?;

    let manifest = generate_site(blog, &client).await?;

    tracing::info!(
        "Generated {} routes in {:.2}s",
        manifest.len() + 1,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Whether a previous build left a home page behind
pub fn has_output(blog: &Blog) -> bool {
    blog.public_dir.join("index.html").exists()
}
