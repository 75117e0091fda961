//! # AppError
//!
//! Centralized error handling for the Citypress ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all cp-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Story, Category, User)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., missing form field, malformed id)
    #[error("validation error: {0}")]
    Validation(String),

    /// The radar story cannot be unpublished while it holds the radar slot.
    #[error("cannot unpublish the current radar story")]
    RadarUnpublishConflict,

    /// Only published stories may be promoted to radar.
    #[error("radar target must be published")]
    RadarRequiresPublished,

    /// Published, radar, or recommended stories cannot be hard-deleted.
    #[error("cannot delete a published, radar, or recommended story")]
    DeleteGuardViolation,

    /// Uploaded bytes could not be decoded as an image.
    #[error("failed to decode image: {0}")]
    AssetDecode(String),

    /// The asset store rejected or failed a write.
    #[error("failed to upload asset: {0}")]
    AssetUpload(String),

    /// A storage-layer transaction aborted or conflicted.
    #[error("store transaction failed: {0}")]
    StoreTransaction(String),

    /// Security/Auth failure (e.g., missing or invalid API key)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Infrastructure failure (e.g., DB down, mail relay unreachable)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code, one per error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(..) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION",
            AppError::RadarUnpublishConflict => "RADAR_UNPUBLISH_CONFLICT",
            AppError::RadarRequiresPublished => "RADAR_REQUIRES_PUBLISHED",
            AppError::DeleteGuardViolation => "DELETE_GUARD",
            AppError::AssetDecode(_) => "ASSET_DECODE",
            AppError::AssetUpload(_) => "ASSET_UPLOAD",
            AppError::StoreTransaction(_) => "STORE_TRANSACTION",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Internal(_) => "INTERNAL",
        }
    }
}

/// A specialized Result type for Citypress logic.
pub type Result<T> = std::result::Result<T, AppError>;
