use super::error::*;
use super::handler;
use crate::application_port::SessionManager;
use crate::domain_model::UserId;
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let register = warp::post()
        .and(warp::path("register"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.account_service.clone()))
        .and_then(handler::register);

    let login = warp::post()
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.account_service.clone()))
        .and_then(handler::login);

    let refresh = warp::post()
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(with(server.session_manager.clone()))
        .and_then(handler::refresh);

    let logout = warp::post()
        .and(warp::path("logout"))
        .and(warp::path::end())
        .and(with_verification(server.session_manager.clone()))
        .and(warp::body::json())
        .and(with(server.session_manager.clone()))
        .and_then(handler::logout);

    let logout_all = warp::post()
        .and(warp::path("logout_all"))
        .and(warp::path::end())
        .and(with_verification(server.session_manager.clone()))
        .and(with(server.session_manager.clone()))
        .and_then(handler::logout_all);

    let profile = warp::get()
        .and(warp::path("profile"))
        .and(warp::path::end())
        .and(with_verification(server.session_manager.clone()))
        .and(with(server.account_service.clone()))
        .and_then(handler::profile);

    let health = warp::get()
        .and(warp::path("health"))
        .and(warp::path::end())
        .and(with(server.user_store.clone()))
        .and_then(handler::health);

    register
        .or(login)
        .or(refresh)
        .or(logout)
        .or(logout_all)
        .or(profile)
        .or(health)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_verification(
    session_manager: Arc<dyn SessionManager>,
) -> impl Filter<Extract = (UserId,), Error = warp::Rejection> + Clone {
    warp::header::<String>(http::header::AUTHORIZATION.as_ref()).and_then(move |token: String| {
        let session_manager = session_manager.clone();
        async move {
            if let Some(token) = token.strip_prefix("Bearer ") {
                let user_id = session_manager
                    .verify_access_token(token)
                    .await
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)?;
                Ok(user_id)
            } else {
                Err(reject::custom(ApiErrorCode::InvalidToken))
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::*;
    use crate::application_port::*;
    use crate::domain_port::UserStore;
    use crate::infra_memory::MemoryUserStore;
    use serde_json::{Value, json};
    use warp::http::StatusCode;

    fn test_server() -> Arc<Server> {
        let user_store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(TokenConfig {
            issuer: "mealvault.test".to_string(),
            audience: "mealvault-client".to_string(),
            access_ttl: std::time::Duration::from_secs(900),
            refresh_ttl: std::time::Duration::from_secs(3600),
            signing_key: b"router-test-secret".to_vec(),
        }));
        let session_manager: Arc<dyn SessionManager> = Arc::new(RefreshSessionManager::new(
            token_codec,
            user_store.clone(),
            chrono::Duration::days(14),
        ));
        let account_service: Arc<dyn AccountService> = Arc::new(RealAccountService::new(
            user_store.clone(),
            Arc::new(Argon2CredentialHasher),
            session_manager.clone(),
        ));
        Arc::new(Server {
            account_service,
            session_manager,
            user_store,
        })
    }

    fn api(
        server: Arc<Server>,
    ) -> warp::filters::BoxedFilter<(impl warp::Reply,)> {
        routes(server).recover(crate::api::v1::error::recover_error).boxed()
    }

    fn register_body(email: &str) -> Value {
        json!({
            "email": email,
            "display_name": "Router Test",
            "password": "longenough",
        })
    }

    async fn post_json(
        api: &warp::filters::BoxedFilter<(impl warp::Reply + Send + 'static,)>,
        path: &str,
        body: &Value,
    ) -> (StatusCode, Value) {
        let resp = warp::test::request()
            .method("POST")
            .path(path)
            .json(body)
            .reply(api)
            .await;
        let status = resp.status();
        let parsed: Value = serde_json::from_slice(resp.body()).unwrap();
        (status, parsed)
    }

    #[tokio::test]
    async fn register_then_refresh_rotates_the_token() {
        let api = api(test_server());
        let (status, registered) =
            post_json(&api, "/register", &register_body("router@example.com")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(registered["success"], json!(true));
        let first = registered["data"]["tokens"]["refresh_token"]
            .as_str()
            .unwrap()
            .to_string();

        let (status, refreshed) =
            post_json(&api, "/refresh", &json!({ "refresh_token": first })).await;

        assert_eq!(status, StatusCode::OK);
        let second = refreshed["data"]["refresh_token"].as_str().unwrap();
        assert_ne!(second, first);
    }

    #[tokio::test]
    async fn replayed_refresh_token_gets_the_revoked_envelope() {
        let api = api(test_server());
        let (_, registered) =
            post_json(&api, "/register", &register_body("replay-router@example.com")).await;
        let first = registered["data"]["tokens"]["refresh_token"]
            .as_str()
            .unwrap()
            .to_string();

        let (status, _) =
            post_json(&api, "/refresh", &json!({ "refresh_token": first })).await;
        assert_eq!(status, StatusCode::OK);

        let (status, replayed) =
            post_json(&api, "/refresh", &json!({ "refresh_token": first })).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(replayed["success"], json!(false));
        assert_eq!(replayed["error"]["code"], json!("SessionRevoked"));
    }

    #[tokio::test]
    async fn wrong_password_login_is_a_401_with_a_generic_code() {
        let api = api(test_server());
        post_json(&api, "/register", &register_body("login-router@example.com")).await;

        let body = json!({
            "email": "login-router@example.com",
            "password": "wrongwrong",
        });
        let (status, parsed) = post_json(&api, "/login", &body).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(parsed["error"]["code"], json!("InvalidCredentials"));
    }

    #[tokio::test]
    async fn profile_needs_a_valid_bearer_token() {
        let api = api(test_server());
        let (_, registered) =
            post_json(&api, "/register", &register_body("profile-router@example.com")).await;
        let access = registered["data"]["tokens"]["access_token"].as_str().unwrap();

        let denied = warp::test::request()
            .method("GET")
            .path("/profile")
            .header("authorization", "Bearer garbage")
            .reply(&api)
            .await;
        assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);

        let allowed = warp::test::request()
            .method("GET")
            .path("/profile")
            .header("authorization", format!("Bearer {access}"))
            .reply(&api)
            .await;
        assert_eq!(allowed.status(), StatusCode::OK);
        let parsed: Value = serde_json::from_slice(allowed.body()).unwrap();
        assert_eq!(parsed["data"]["email"], json!("profile-router@example.com"));
    }

    #[tokio::test]
    async fn health_reports_ok_for_a_reachable_store() {
        let api = api(test_server());
        let resp = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&api)
            .await;

        assert_eq!(resp.status(), StatusCode::OK);
        let parsed: Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(parsed["data"]["status"], json!("ok"));
    }
}
