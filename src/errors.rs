// Erreurs de l'API, converties en réponses JSON {"error": kind, "message": texte}

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("You already have a review for this watchlist item.")]
    DuplicateReview,
    #[error("Invalid login credentials")]
    InvalidCredentials,
    #[error("User is inactive")]
    InactiveAccount,
    #[error("{0}")]
    InvalidToken(String),
    #[error("Token is blacklisted")]
    TokenRevoked,
    #[error("{0}")]
    Unauthorized(String),
    #[error("You do not have permission to perform this action.")]
    PermissionDenied,
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::NotFound(_) => "not_found",
            ApiError::DuplicateReview => "duplicate_review",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::InactiveAccount => "inactive_account",
            ApiError::InvalidToken(_) => "invalid_token",
            ApiError::TokenRevoked => "token_revoked",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::PermissionDenied => "permission_denied",
            ApiError::Database(_) => "database_error",
            ApiError::Internal(_) => "internal_error",
        }
    }

    /// Traduit une violation d'unicité en doublon de review, le reste en erreur BD.
    pub fn from_review_insert(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::DuplicateReview,
            _ => ApiError::Database(err),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::DuplicateReview
            | ApiError::InvalidCredentials
            | ApiError::InactiveAccount
            | ApiError::InvalidToken(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TokenRevoked | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::PermissionDenied => StatusCode::FORBIDDEN,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Les détails BD restent dans les logs
        let message = match self {
            ApiError::Database(e) => {
                tracing::error!(error = %e, "database error");
                "Internal server error".to_string()
            }
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.kind(),
            "message": message,
        }))
    }
}
