use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::blockchain::{MiningError, RegistryError};

/// Errors returned to API clients
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Mining(#[from] MiningError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Registry(_) => StatusCode::BAD_REQUEST,
            ApiError::Mining(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::Validation("Missing values".to_string()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(RegistryError::InvalidAddress("x".to_string())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::from(MiningError::Cancelled).status_code(), StatusCode::CONFLICT);
        assert_eq!(ApiError::Internal("boom".to_string()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
