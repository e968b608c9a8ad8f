use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use parks_store::ParkStore;

pub mod error;
pub mod forms;
pub mod moderation;
pub mod notifier;
mod pages;
mod rest;
pub mod templates;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::AppError;
pub use notifier::{Mailer, OutgoingMail, SmtpMailer};

// --- App State ---

pub struct AppState {
    pub store: Arc<dyn ParkStore>,
    pub mailer: Arc<dyn Mailer>,
    /// Domain used in links inside notification mail.
    pub site_domain: String,
    /// Recipients of flagged-story notifications.
    pub admins: Vec<String>,
}

/// All routes, with request tracing.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/search/", get(pages::search_redirect).post(pages::search))
        .route("/parks/", get(rest::filter_parks))
        .route("/neighborhood/{slug}/", get(pages::neighborhood))
        .route("/park/{slug}/", get(pages::park).post(pages::park_story))
        .route("/play/", get(pages::play))
        .route(
            "/play/{activity_slug}/{neighborhood_slug}/",
            get(pages::play_filtered),
        )
        .route(
            "/ajax/{neighborhood_slug}/{activity_slug}/",
            get(rest::neighborhood_activity),
        )
        .route("/event/{id}/{name}/", get(pages::event))
        .route("/explore/", get(pages::explore).post(pages::explore_submit))
        .route("/trip/", get(pages::trip))
        .route("/story/{id}/", get(pages::story))
        .route("/story/{id}/flag/", post(pages::story_flag))
        .route("/policy/", get(pages::policy))
        .fallback(pages::not_found)
        .with_state(state)
        // Logging layer: method + path only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
