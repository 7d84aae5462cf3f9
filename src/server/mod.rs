//! Preview server with on-demand page regeneration
//!
//! Post routes go through the route manifest: fresh pages are served from
//! disk, stale ones are served and regenerated in the background, unknown
//! ones get the loading page while they are generated. Everything else is
//! served from the public dir.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cache::{plan_request, RouteAction, RouteManifest};
use crate::cms::ContentSource;
use crate::content::ContentLoader;
use crate::generator::Generator;
use crate::helpers::{is_valid_slug, post_route};
use crate::Blog;

/// Shared server state
pub struct ServerState {
    blog: Blog,
    source: Arc<dyn ContentSource>,
    generator: Generator,
    manifest: Mutex<RouteManifest>,
    in_flight: Mutex<HashSet<String>>,
    window: Duration,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ServerState {
    pub fn new(blog: &Blog, source: Arc<dyn ContentSource>) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            source,
            generator: Generator::new(blog)?,
            manifest: Mutex::new(RouteManifest::load(&blog.cache_dir)),
            in_flight: Mutex::new(HashSet::new()),
            window: Duration::from_secs(blog.config.revalidate),
        })
    }

    /// Fetch a post and rewrite its page
    ///
    /// A missing document marks the route as missing. Other failures leave
    /// an existing page in place; a route with no page yet is marked failed
    /// so it gets an error page until the retry window passes.
    pub async fn regenerate(&self, slug: &str) -> Result<()> {
        let route = post_route(slug);
        let loader = ContentLoader::new(self.source.as_ref(), &self.blog.config);

        match loader.load_by_slug(slug).await {
            Ok(props) => {
                let output = self.generator.write_post(&props.props)?;
                self.update_manifest(|m| m.record_generated(&route, &output, Utc::now()))
                    .await?;
                tracing::info!("Regenerated {}", route);
            }
            Err(e) if e.is_not_found() => {
                self.update_manifest(|m| m.record_missing(&route, Utc::now()))
                    .await?;
                tracing::info!("No post for {}", route);
            }
            Err(e) => {
                self.update_manifest(|m| m.record_failed(&route, Utc::now()))
                    .await?;
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Apply a change under the lock, then write the snapshot to disk
    async fn update_manifest(&self, update: impl FnOnce(&mut RouteManifest) + Send) -> Result<()> {
        let snapshot = {
            let mut manifest = lock(&self.manifest);
            update(&mut manifest);
            manifest.clone()
        };
        let cache_dir = self.blog.cache_dir.clone();
        tokio::task::spawn_blocking(move || snapshot.save(&cache_dir)).await??;
        Ok(())
    }
}

/// Regenerate a post in the background unless it is already in flight
fn spawn_regenerate(state: Arc<ServerState>, slug: String) {
    if !lock(&state.in_flight).insert(slug.clone()) {
        tracing::debug!("Regeneration of {} already in flight", slug);
        return;
    }

    tokio::spawn(async move {
        if let Err(e) = state.regenerate(&slug).await {
            tracing::warn!("Failed to regenerate post {}: {:#}", slug, e);
        }
        lock(&state.in_flight).remove(&slug);
    });
}

/// Build the router for a server state
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/post/:slug", get(post_handler))
        .route("/post/:slug/", get(post_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the preview server
pub async fn start(blog: &Blog, ip: &str, port: u16, open: bool) -> Result<()> {
    let source: Arc<dyn ContentSource> = Arc::new(blog.cms_client()?);
    let state = Arc::new(ServerState::new(blog, source)?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn post_handler(State(state): State<Arc<ServerState>>, Path(slug): Path<String>) -> Response {
    if !is_valid_slug(&slug) {
        return not_found(&state);
    }

    let route = post_route(&slug);
    let (action, output_path) = {
        let manifest = lock(&state.manifest);
        let entry = manifest.get(&route);
        let action = plan_request(entry, Utc::now(), state.window);
        (action, entry.and_then(|e| e.output_path.clone()))
    };
    tracing::debug!("{} -> {:?}", route, action);

    match action {
        RouteAction::ServeFresh | RouteAction::ServeStale => {
            if action == RouteAction::ServeStale {
                spawn_regenerate(state.clone(), slug.clone());
            }
            let page = match output_path {
                Some(path) => tokio::fs::read_to_string(state.blog.public_dir.join(path))
                    .await
                    .ok(),
                None => None,
            };
            match page {
                Some(html) => Html(html).into_response(),
                // Output removed from disk: generate it again
                None => fallback_page(state, slug),
            }
        }
        RouteAction::Fallback => fallback_page(state, slug),
        RouteAction::NotFound { revalidate } => {
            if revalidate {
                spawn_regenerate(state.clone(), slug);
            }
            not_found(&state)
        }
        RouteAction::Unavailable => match state.generator.render_unavailable() {
            Ok(html) => (StatusCode::SERVICE_UNAVAILABLE, Html(html)).into_response(),
            Err(e) => server_error(e),
        },
    }
}

fn fallback_page(state: Arc<ServerState>, slug: String) -> Response {
    let page = state.generator.render_fallback();
    spawn_regenerate(state, slug);
    match page {
        Ok(html) => Html(html).into_response(),
        Err(e) => server_error(e),
    }
}

fn not_found(state: &ServerState) -> Response {
    match state.generator.render_not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => server_error(e),
    }
}

fn server_error(e: anyhow::Error) -> Response {
    tracing::error!("Failed to render page: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
}

/// Serve the home page and assets from the public dir
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let mut service = ServeDir::new(&state.blog.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(&state),
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
