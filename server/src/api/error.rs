use std::convert::Infallible;
use trackcore::telemetry::MetricsRecorder;
use warp::http::StatusCode;
use warp::{reject, Rejection, Reply};

use super::model::ErrorResponse;

/// Failure raised by a request handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl reject::Reject for ApiError {}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Turns every rejection into a `{success: false, error}` body.
pub fn recover(err: Rejection, metrics: &MetricsRecorder) -> Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "not found".to_string())
    } else if let Some(api) = err.find::<ApiError>() {
        if let ApiError::Internal(cause) = api {
            log::error!("request failed: {:#}", cause);
        }
        (api.status(), api.to_string())
    } else if let Some(body) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, body.to_string())
    } else if let Some(query) = err.find::<reject::InvalidQuery>() {
        (StatusCode::BAD_REQUEST, query.to_string())
    } else if err.find::<reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "expected a JSON body".to_string(),
        )
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "method not allowed".to_string(),
        )
    } else {
        log::error!("unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal server error".to_string(),
        )
    };

    metrics.record_error();
    let body = ErrorResponse {
        success: false,
        error: message,
    };
    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}
