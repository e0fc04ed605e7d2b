use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    if let Some(err) = err.find::<ApiErrorCode>() {
        let json = warp::reply::json(&ApiResponse::<()>::err(err.clone(), err.to_string()));
        Ok(warp::reply::with_status(json, err.status()))
    } else if err.is_not_found() {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            ApiErrorCode::NotFound,
            "no such route",
        ));
        Ok(warp::reply::with_status(json, StatusCode::NOT_FOUND))
    } else {
        let json = warp::reply::json(&ApiResponse::<()>::err(
            ApiErrorCode::InvalidRequest,
            format!("unhandled rejection: {err:?}"),
        ));
        Ok(warp::reply::with_status(json, StatusCode::BAD_REQUEST))
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Session has been revoked")]
    SessionRevoked,
    #[error("Invalid request")]
    InvalidRequest,
    #[error("Not found")]
    NotFound,
    #[error("Service unavailable")]
    ServiceUnavailable,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidCredentials
            | ApiErrorCode::InvalidToken
            | ApiErrorCode::SessionRevoked => StatusCode::UNAUTHORIZED,
            ApiErrorCode::EmailTaken => StatusCode::CONFLICT,
            ApiErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            AuthError::EmailTaken => ApiErrorCode::EmailTaken,
            // A deleted account or a lost rotation race both surface as a
            // plain 401; the client's only move is to log in again.
            AuthError::UserNotFound
            | AuthError::InvalidAccessToken
            | AuthError::InvalidRefreshToken => ApiErrorCode::InvalidToken,
            AuthError::RefreshTokenRevoked => ApiErrorCode::SessionRevoked,
            AuthError::InvalidInput(_) => ApiErrorCode::InvalidRequest,
            AuthError::Store(e) => {
                warn!("store error: {}", e);
                ApiErrorCode::ServiceUnavailable
            }
            AuthError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_auth_failure_surfaces_as_401() {
        let failures = [
            AuthError::InvalidCredentials,
            AuthError::UserNotFound,
            AuthError::InvalidAccessToken,
            AuthError::InvalidRefreshToken,
            AuthError::RefreshTokenRevoked,
        ];
        for failure in failures {
            let code = ApiErrorCode::from(failure);
            assert_eq!(code.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn store_failure_surfaces_as_503() {
        let code = ApiErrorCode::from(AuthError::Store("connection reset".to_string()));
        assert!(matches!(code, ApiErrorCode::ServiceUnavailable));
        assert_eq!(code.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
