use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use folio_core::FolioError;
use serde_json::json;
use tracing::error;

/// The one place where failures become HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    Domain(FolioError),
    Unauthorized(&'static str),
    Forbidden(&'static str),
}

impl From<FolioError> for ApiError {
    fn from(e: FolioError) -> Self {
        ApiError::Domain(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Domain(FolioError::NotFound(_) | FolioError::UnknownKind(_)) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Domain(FolioError::Conflict(_) | FolioError::Invalid(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Domain(FolioError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Domain(FolioError::Store(detail)) => {
                error!(%detail, "store failure");
                "Internal Server Error".to_string()
            }
            ApiError::Domain(e) => e.to_string(),
            ApiError::Unauthorized(m) | ApiError::Forbidden(m) => m.to_string(),
        };
        (status, Json(json!({"success": false, "message": message}))).into_response()
    }
}
