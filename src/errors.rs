use crate::data::ParamError;
use crate::departments::UnknownDepartment;
use axum::http::StatusCode;
use thiserror::Error;

/// Failure of a single upstream feed request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("unexpected body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} is missing {field}")]
    Missing { url: String, field: &'static str },
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn bad_gateway(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: err.to_string(),
        }
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        Self::bad_gateway(err)
    }
}

impl From<UnknownDepartment> for AppError {
    fn from(err: UnknownDepartment) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<ParamError> for AppError {
    fn from(err: ParamError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
