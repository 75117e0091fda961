//! HTTP mapping for the domain error taxonomy. Validation, not-found, and
//! guard failures surface as 4xx with their stable codes; storage and asset
//! failures collapse into a generic 500 body so internal detail stays out of
//! responses.

use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use cp_core::error::AppError;
use serde_json::json;

#[derive(Debug)]
pub struct ApiError(pub AppError);

pub type ApiResult<T> = Result<T, ApiError>;

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::RadarUnpublishConflict
            | AppError::RadarRequiresPublished
            | AppError::DeleteGuardViolation => StatusCode::CONFLICT,
            AppError::AssetDecode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AssetUpload(_)
            | AppError::StoreTransaction(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            log::error!("request failed: {}", self.0);
            "internal server error".to_string()
        } else {
            self.0.to_string()
        };
        HttpResponse::build(status).json(json!({
            "error": message,
            "code": self.0.code(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_violations_are_conflicts() {
        assert_eq!(
            ApiError(AppError::RadarUnpublishConflict).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError(AppError::DeleteGuardViolation).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn storage_detail_never_reaches_the_body() {
        let err = ApiError(AppError::StoreTransaction("disk quota on /var/db".into()));
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Body construction is deterministic; the message collapses to the
        // generic one before serialization.
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn client_errors_keep_their_codes() {
        assert_eq!(
            ApiError(AppError::Validation("title is required".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(AppError::NotFound("story".into(), "x".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(AppError::AssetDecode("bad".into())).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
