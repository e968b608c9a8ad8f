use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use parks_common::{ParksError, TopNav};

use crate::templates::{render_error, render_not_found};

/// Handler failure. Missing entities become the 404 page; everything else
/// is logged and answered with a generic 500 page.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Parks(#[from] ParksError),
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Parks(ParksError::Anyhow(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Parks(ParksError::NotFound { entity, key }) => {
                tracing::debug!(entity, key = %key, "Not found");
                not_found_response()
            }
            AppError::Parks(e) => {
                error!(error = %e, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(render_error())).into_response()
            }
        }
    }
}

pub fn not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(render_not_found(&TopNav::default())),
    )
        .into_response()
}
