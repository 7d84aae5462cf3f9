//! Route manifest for incremental regeneration
//!
//! Records when each generated route was last rendered so that a page can
//! be regenerated once it is older than the revalidation window. The
//! manifest is persisted next to the site so a restarted server keeps the
//! freshness of pages generated by an earlier build.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Manifest file name inside the cache directory
const MANIFEST_FILE: &str = "routes.json";

/// How long a failed first fetch is answered with an error page
pub const FAILURE_RETRY: Duration = Duration::from_secs(30);

/// Outcome of the last generation of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    /// Page written to `output_path`
    Generated,
    /// The CMS has no document for this route
    Missing,
    /// The first fetch failed; nothing was ever written
    Failed,
}

/// A route and when it was generated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub generated_at: DateTime<Utc>,
    /// Output path relative to the public dir
    pub output_path: Option<String>,
    pub status: RouteStatus,
}

impl RouteEntry {
    /// Whether the entry has reached the revalidation window
    pub fn is_stale(&self, now: DateTime<Utc>, window: Duration) -> bool {
        let age = now.signed_duration_since(self.generated_at);
        match age.to_std() {
            Ok(age) => age >= window,
            // Generated "in the future" (clock skew): treat as fresh
            Err(_) => false,
        }
    }
}

/// What to do with a request for a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAction {
    /// Serve the generated page
    ServeFresh,
    /// Serve the generated page and regenerate it in the background
    ServeStale,
    /// Unknown route: serve the placeholder and generate the page
    Fallback,
    /// No such post; `revalidate` asks to check the CMS again
    NotFound { revalidate: bool },
    /// The last attempt to fetch a never generated route failed
    Unavailable,
}

/// Decide how to answer a request given the route's manifest entry
pub fn plan_request(entry: Option<&RouteEntry>, now: DateTime<Utc>, window: Duration) -> RouteAction {
    let Some(entry) = entry else {
        return RouteAction::Fallback;
    };
    let stale = entry.is_stale(now, window);
    match entry.status {
        RouteStatus::Generated if stale => RouteAction::ServeStale,
        RouteStatus::Generated => RouteAction::ServeFresh,
        RouteStatus::Missing => RouteAction::NotFound { revalidate: stale },
        RouteStatus::Failed if entry.is_stale(now, window.min(FAILURE_RETRY)) => {
            RouteAction::Fallback
        }
        RouteStatus::Failed => RouteAction::Unavailable,
    }
}

/// Persisted map of route -> entry
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RouteManifest {
    /// Version of the manifest format
    pub version: u32,
    pub routes: HashMap<String, RouteEntry>,
}

impl RouteManifest {
    /// Current manifest format version
    const VERSION: u32 = 1;

    /// Create an empty manifest with version set
    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            ..Default::default()
        }
    }

    fn path(cache_dir: &Path) -> PathBuf {
        cache_dir.join(MANIFEST_FILE)
    }

    /// Load the manifest from disk, or create a new empty one
    pub fn load(cache_dir: &Path) -> Self {
        let path = Self::path(cache_dir);
        if let Ok(content) = fs::read_to_string(&path) {
            match serde_json::from_str::<RouteManifest>(&content) {
                Ok(manifest) if manifest.version == Self::VERSION => return manifest,
                Ok(_) => tracing::info!("Route manifest version mismatch, starting fresh"),
                Err(e) => tracing::warn!("Ignoring unreadable route manifest {:?}: {}", path, e),
            }
        }
        Self::new()
    }

    /// Save the manifest to disk
    pub fn save(&self, cache_dir: &Path) -> Result<()> {
        fs::create_dir_all(cache_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(Self::path(cache_dir), content)?;
        Ok(())
    }

    pub fn get(&self, route: &str) -> Option<&RouteEntry> {
        self.routes.get(route)
    }

    /// Record a freshly written page
    pub fn record_generated(&mut self, route: &str, output_path: &str, now: DateTime<Utc>) {
        self.routes.insert(
            route.to_string(),
            RouteEntry {
                generated_at: now,
                output_path: Some(output_path.to_string()),
                status: RouteStatus::Generated,
            },
        );
    }

    /// Record that the CMS has no document for a route
    pub fn record_missing(&mut self, route: &str, now: DateTime<Utc>) {
        self.routes.insert(
            route.to_string(),
            RouteEntry {
                generated_at: now,
                output_path: None,
                status: RouteStatus::Missing,
            },
        );
    }

    /// Record a failed fetch of a route that has no page yet
    ///
    /// Routes with an existing page or a known missing document keep their
    /// entry.
    pub fn record_failed(&mut self, route: &str, now: DateTime<Utc>) {
        if self
            .get(route)
            .is_some_and(|e| e.status != RouteStatus::Failed)
        {
            return;
        }
        self.routes.insert(
            route.to_string(),
            RouteEntry {
                generated_at: now,
                output_path: None,
                status: RouteStatus::Failed,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
