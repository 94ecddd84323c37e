use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("database unavailable: {0}")]
    Unavailable(#[from] DbErr),
}

impl CatalogError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Maps constraint violations raised by writes to `InvalidArgument`.
    pub fn from_write(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::invalid("slug already exists"),
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                Self::invalid("unknown category reference")
            },
            _ => Self::Unavailable(err),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CatalogError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Error returned by the JSON API: `{success: false, message}`.
#[derive(Debug)]
pub struct ApiError(CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "api request failed");
        }
        let body = Json(json!({ "success": false, "message": self.0.to_string() }));
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned by page routes: bare status with the message as text.
#[derive(Debug)]
pub struct PageError(CatalogError);

impl From<CatalogError> for PageError {
    fn from(err: CatalogError) -> Self {
        Self(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "page request failed");
        }
        (status, self.0.to_string()).into_response()
    }
}

pub type PageResult<T> = Result<T, PageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_error_kinds_to_status() {
        assert_eq!(CatalogError::not_found("Movie").status(), StatusCode::NOT_FOUND);
        assert_eq!(CatalogError::invalid("page must be >= 1").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            CatalogError::from(DbErr::Conn(sea_orm::RuntimeErr::Internal("down".into()))).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn not_found_message_names_the_entity() {
        assert_eq!(CatalogError::not_found("Season").to_string(), "Season not found");
    }

    #[test]
    fn non_constraint_write_errors_stay_unavailable() {
        let err = CatalogError::from_write(DbErr::Custom("boom".into()));
        assert!(matches!(err, CatalogError::Unavailable(_)));
    }
}
