use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::ErrorResponse;
use thiserror::Error;
use uuid::Uuid;

/// Campaign domain errors
///
/// Validation variants carry one machine-readable code per cause so the
/// caller can fix their input; everything surfaced before a campaign row
/// is created leaves no persisted state behind.
#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("Recipient list is empty")]
    EmptyRecipients,

    #[error("Recipient list has {count} entries, maximum is {max}")]
    TooManyRecipients { count: usize, max: usize },

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Duplicate email address: {0}")]
    DuplicateEmail(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Chunk size {chunk_size} exceeds transport batch limit {batch_limit}")]
    ChunkSizeTooLarge {
        chunk_size: usize,
        batch_limit: usize,
    },

    #[error("Campaign not found: {0}")]
    NotFound(Uuid),

    #[error("Campaign {0} is not running")]
    AlreadyFinished(Uuid),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type CampaignResult<T> = Result<T, CampaignError>;

impl CampaignError {
    /// Machine-readable error code for API consumers
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyRecipients => "EMPTY_RECIPIENTS",
            Self::TooManyRecipients { .. } => "TOO_MANY_RECIPIENTS",
            Self::InvalidEmail(_) => "INVALID_EMAIL",
            Self::DuplicateEmail(_) => "DUPLICATE_EMAIL",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ChunkSizeTooLarge { .. } => "CHUNK_SIZE_TOO_LARGE",
            Self::NotFound(_) => "CAMPAIGN_NOT_FOUND",
            Self::AlreadyFinished(_) => "CAMPAIGN_ALREADY_FINISHED",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::EmptyRecipients
            | Self::TooManyRecipients { .. }
            | Self::InvalidEmail(_)
            | Self::DuplicateEmail(_)
            | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyFinished(_) => StatusCode::CONFLICT,
            Self::ChunkSizeTooLarge { .. }
            | Self::Transport(_)
            | Self::Database(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CampaignError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "campaign request failed");
        } else {
            tracing::warn!(error = %self, code = self.error_code(), "campaign request rejected");
        }

        let body = ErrorResponse::new(self.error_code(), self.to_string());
        (status, Json(body)).into_response()
    }
}

impl From<sea_orm::DbErr> for CampaignError {
    fn from(err: sea_orm::DbErr) -> Self {
        CampaignError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_per_cause() {
        assert_eq!(CampaignError::EmptyRecipients.error_code(), "EMPTY_RECIPIENTS");
        assert_eq!(
            CampaignError::DuplicateEmail("a@b.co".into()).error_code(),
            "DUPLICATE_EMAIL"
        );
        assert_eq!(
            CampaignError::NotFound(Uuid::nil()).error_code(),
            "CAMPAIGN_NOT_FOUND"
        );
    }

    #[test]
    fn test_validation_errors_map_to_400() {
        assert_eq!(
            CampaignError::TooManyRecipients { count: 500, max: 200 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CampaignError::InvalidEmail("nope".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CampaignError::NotFound(Uuid::nil()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CampaignError::AlreadyFinished(Uuid::nil()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            CampaignError::Database("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
