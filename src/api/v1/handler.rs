use super::error::*;
use crate::application_port::*;
use crate::domain_model::UserId;
use crate::domain_port::UserStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: UserId,
    pub tokens: SessionTokens,
}

pub async fn register(
    body: RegisterRequest,
    account_service: Arc<dyn AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let outcome = account_service
        .register(RegisterInput {
            email: body.email,
            display_name: body.display_name,
            password: body.password,
        })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(AuthResponse {
        user_id: outcome.user_id,
        tokens: outcome.tokens,
    })))
}

pub async fn login(
    body: LoginRequest,
    account_service: Arc<dyn AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let outcome = account_service
        .login(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(AuthResponse {
        user_id: outcome.user_id,
        tokens: outcome.tokens,
    })))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn refresh(
    body: RefreshRequest,
    session_manager: Arc<dyn SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let tokens = session_manager
        .rotate(&body.refresh_token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(tokens)))
}

#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse;

pub async fn logout(
    user_id: UserId,
    body: LogoutRequest,
    session_manager: Arc<dyn SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    // Best-effort by contract: an absent or garbage token still logs out.
    session_manager.revoke_one(user_id, &body.refresh_token).await;
    Ok(warp::reply::json(&ApiResponse::ok(LogoutResponse)))
}

pub async fn logout_all(
    user_id: UserId,
    session_manager: Arc<dyn SessionManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    session_manager
        .revoke_all(user_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(LogoutResponse)))
}

pub async fn profile(
    user_id: UserId,
    account_service: Arc<dyn AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let profile = account_service
        .profile(user_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(profile)))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health(user_store: Arc<dyn UserStore>) -> Result<impl warp::Reply, warp::Rejection> {
    user_store
        .ping()
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(HealthResponse {
        status: "ok",
    })))
}
