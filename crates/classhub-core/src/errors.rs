use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationErrors;

use crate::file_storage::StorageError;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Identifiers at fault, present only when specific ids caused the failure.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub ids: Vec<String>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            ids: Vec::new(),
        }
    }

    /// Attach the offending identifiers to the response body.
    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.ids = ids.into_iter().map(|id| id.to_string()).collect();
        self
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::CONFLICT, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, Error::msg(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, Error::msg(message.into()))
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::internal(Error::msg(message.into()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status.as_u16(), error = ?self.error, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: self.error.to_string(),
            ids: self.ids,
        });

        (self.status, body).into_response()
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::unprocessable(errors)
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidFileSize { .. }
            | StorageError::InvalidMimeType { .. }
            | StorageError::InvalidExtension { .. }
            | StorageError::InvalidKey(_) => AppError::bad_request(err),
            StorageError::NotFound => AppError::not_found(err),
            StorageError::IoError(_) => AppError::internal(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(error: AppError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_body_omits_empty_ids() {
        let err = AppError::not_found(anyhow::anyhow!("Course not found"));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Course not found");
        assert!(body.get("ids").is_none());
    }

    #[tokio::test]
    async fn test_error_body_lists_ids() {
        let error = AppError::conflict(anyhow::anyhow!("Students already assigned"))
            .with_ids(["a", "b"]);
        let (status, body) = body_json(error).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["ids"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn test_storage_error_status_mapping() {
        let too_big = AppError::from(StorageError::InvalidFileSize { max_bytes: 10 });
        assert_eq!(too_big.status, StatusCode::BAD_REQUEST);

        let missing = AppError::from(StorageError::NotFound);
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let io = AppError::from(StorageError::IoError(std::io::Error::other("disk")));
        assert_eq!(io.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unauthorized_message() {
        let error = AppError::unauthorized("Missing authorization header");
        assert_eq!(error.status, StatusCode::UNAUTHORIZED);
        assert_eq!(error.error.to_string(), "Missing authorization header");
    }
}
