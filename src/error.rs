//! Errors a request can end with.
//!
//! Validation problems are not errors here: they re-render the form. Everything
//! in [`AppError`] is terminal for the request and answers 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use thiserror::Error;

use crate::view;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("request failed: {self}");
        view::internal_server_error()
    }
}

/// Fallback for every unmatched route.
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, view::not_found_page()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_error_maps_to_500() {
        let res = AppError::from(DbErr::Custom("boom".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let res = not_found().await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
