use std::path::PathBuf;

use axum::routing::{get, post};
use axum::Router;
use snip_core::Shortener;
use snip_shortener::ShortLinkRoute;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use typed_builder::TypedBuilder;

use crate::cors::{self, CorsOrigin};
use crate::handlers::{
    expand_handler, health_handler, list_handler, not_found_handler, redirect_handler,
    root_redirect_handler, shorten_handler,
};
use crate::state::AppState;

/// Router options that do not belong to the shortening service.
#[derive(Debug, Clone, Default, TypedBuilder)]
pub struct HttpOptions {
    #[builder(default)]
    pub cors_origin: CorsOrigin,
    #[builder(default)]
    pub short_link_route: ShortLinkRoute,
    /// Frontend directory; unknown paths fall back to its `index.html`.
    #[builder(default, setter(into))]
    pub static_dir: Option<PathBuf>,
}

pub struct App {}

impl App {
    pub fn router<S: Shortener>(state: AppState<S>, options: &HttpOptions) -> Router {
        let root_links = options.short_link_route == ShortLinkRoute::Root;

        let router = Router::new()
            .route("/health", get(health_handler))
            .route("/api/shorten", post(shorten_handler::<S>))
            .route("/api/expand/{short_code}", get(expand_handler::<S>))
            .route("/api/urls", get(list_handler::<S>))
            .route("/api/{short_code}", get(redirect_handler::<S>));

        let router = match &options.static_dir {
            // Files win over root-level codes; whatever is neither falls
            // back to the frontend's index.html.
            Some(dir) if root_links => {
                let links = Router::new()
                    .route("/{short_code}", get(root_redirect_handler::<S>))
                    .fallback_service(ServeFile::new(dir.join("index.html")))
                    .with_state(state.clone());
                router.fallback_service(ServeDir::new(dir).fallback(links))
            }
            Some(dir) => router.fallback_service(
                ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
            ),
            None if root_links => router
                .route("/{short_code}", get(root_redirect_handler::<S>))
                .fallback(not_found_handler),
            None => router.fallback(not_found_handler),
        };

        router
            .layer(cors::layer(&options.cors_origin))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
