//! Clean the public directory

use anyhow::Result;
use std::fs;

use crate::Blog;

/// Remove the generated site and the route manifest
pub fn run(blog: &Blog) -> Result<()> {
    for dir in [&blog.public_dir, &blog.cache_dir] {
        if dir.exists() {
            fs::remove_dir_all(dir)?;
            tracing::info!("Deleted: {:?}", dir);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_clean_removes_output_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path().to_path_buf(), SiteConfig::default());
        fs::create_dir_all(blog.public_dir.join("post/a")).unwrap();
        fs::create_dir_all(&blog.cache_dir).unwrap();
        fs::write(blog.cache_dir.join("routes.json"), "{}").unwrap();
        fs::write(dir.path().join("_config.yml"), "title: kept").unwrap();

        run(&blog).unwrap();
        assert!(!blog.public_dir.exists());
        assert!(!blog.cache_dir.exists());
        assert!(dir.path().join("_config.yml").exists());

        // Nothing to clean is fine
        run(&blog).unwrap();
    }
}
