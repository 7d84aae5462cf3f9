//! List posts in the CMS

use anyhow::{Context, Result};

use crate::cms::ContentSource;
use crate::content::{ContentLoader, FeedEntry, PostFeed};
use crate::helpers::DateFormatter;
use crate::Blog;

/// Print every post, newest first as the CMS orders them
pub async fn run(blog: &Blog) -> Result<()> {
    let client = blog.cms_client()?;
    let entries = collect(blog, &client).await?;

    println!("Posts ({}):", entries.len());
    for entry in entries {
        println!(
            "  {} - {} [{}]",
            entry.date.as_deref().unwrap_or("-"),
            entry.title,
            entry.uid.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

/// Page through all posts with the same cursor logic as the home page
pub async fn collect<S: ContentSource + ?Sized>(blog: &Blog, source: &S) -> Result<Vec<FeedEntry>> {
    let loader = ContentLoader::new(source, &blog.config);
    let home = loader
        .load_home()
        .await
        .context("Failed to load posts from the CMS")?;

    let formatter = DateFormatter::from_config(&blog.config)?;
    let mut feed = PostFeed::new(home.posts_pagination, formatter, &blog.config);
    while feed.has_more() {
        feed.load_more(source)
            .await
            .context("Failed to load the next page of posts")?;
    }

    Ok(feed.entries().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::testing::{post, MemorySource};
    use crate::config::SiteConfig;

    #[tokio::test]
    async fn test_collect_follows_all_pages() {
        let dir = tempfile::tempdir().unwrap();
        let blog = Blog::with_config(dir.path().to_path_buf(), SiteConfig::default());
        let source = MemorySource::new(
            vec![
                post("a", "A", "2021-03-25T19:25:28+0000"),
                post("b", "B", "2021-03-20T19:25:28+0000"),
                post("c", "C", "2021-03-15T19:25:28+0000"),
            ],
            1,
        );

        let entries = collect(&blog, &source).await.unwrap();
        let titles: Vec<_> = entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C"]);
        assert_eq!(entries[2].date.as_deref(), Some("15 mar 2021"));
        assert_eq!(source.calls(), 3);
    }
}
