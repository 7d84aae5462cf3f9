//! URL helper functions

use crate::config::SiteConfig;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/styles.css") // -> "/blog/styles.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Route of a post detail page, relative to the root
pub fn post_route(uid: &str) -> String {
    format!("/post/{}", uid)
}

/// Link to a post detail page
pub fn post_url(config: &SiteConfig, uid: &str) -> String {
    url_for(config, &post_route(uid))
}

/// Whether a uid can be used as a path segment as-is
///
/// CMS uids are already slugs; anything that slugifies differently could
/// escape the output directory or collide with another route.
pub fn is_valid_slug(uid: &str) -> bool {
    !uid.is_empty() && slug::slugify(uid) == uid
}
