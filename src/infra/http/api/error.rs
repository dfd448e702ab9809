use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use promptdeck_api_types::ErrorBody;

use crate::application::error::ErrorReport;
use crate::application::listing::ListingError;
use crate::application::prompts::PromptServiceError;

/// Message returned for every unexpected failure; details only go to the log.
pub const SERVER_ERROR_MESSAGE: &str = "Server error";

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    report: Option<ErrorReport>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            report: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(source: &'static str, err: &dyn std::error::Error) -> Self {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        Self {
            status,
            message: SERVER_ERROR_MESSAGE.to_string(),
            report: Some(ErrorReport::from_error(source, status, err)),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<PromptServiceError> for ApiError {
    fn from(err: PromptServiceError) -> Self {
        match err {
            PromptServiceError::Validation(err) => ApiError::bad_request(err.to_string()),
            PromptServiceError::NotFound => {
                ApiError::not_found(PromptServiceError::NotFound.to_string())
            }
            PromptServiceError::Repo(inner) => {
                ApiError::internal("infra::http::api::prompts", &inner)
            }
        }
    }
}

impl From<ListingError> for ApiError {
    fn from(err: ListingError) -> Self {
        ApiError::internal("infra::http::api::listing", &err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message.clone(),
        };
        let mut response = (self.status, Json(body)).into_response();
        let status = self.status;
        let report = self
            .report
            .unwrap_or_else(|| ErrorReport::from_message("infra::http::api", status, self.message));
        report.attach(&mut response);
        response
    }
}
