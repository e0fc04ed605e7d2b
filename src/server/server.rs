use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::logger::*;
use crate::settings::Settings;
use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    pub account_service: Arc<dyn AccountService>,
    pub session_manager: Arc<dyn SessionManager>,
    pub user_store: Arc<dyn UserStore>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let user_store: Arc<dyn UserStore> = match settings.store.backend.as_str() {
            "memory" => Arc::new(MemoryUserStore::new()),
            other => return Err(anyhow::anyhow!("Unknown store backend: {}", other)),
        };

        let signing_key = std::env::var("JWT_SIGNING_KEY")
            .unwrap_or_else(|_| settings.auth.signing_key.clone())
            .into_bytes();
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(TokenConfig {
            issuer: settings.auth.issuer.clone(),
            audience: settings.auth.audience.clone(),
            access_ttl: Duration::from_secs(settings.auth.access_ttl_secs),
            refresh_ttl: Duration::from_secs(settings.auth.refresh_ttl_secs),
            signing_key,
        }));

        let session_manager: Arc<dyn SessionManager> = Arc::new(RefreshSessionManager::new(
            token_codec,
            user_store.clone(),
            ChronoDuration::seconds(settings.auth.session_validity_secs),
        ));

        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2CredentialHasher);
        let account_service: Arc<dyn AccountService> = Arc::new(RealAccountService::new(
            user_store.clone(),
            credential_hasher,
            session_manager.clone(),
        ));

        info!("server started");

        Ok(Self {
            account_service,
            session_manager,
            user_store,
        })
    }

    pub async fn shutdown(&self) {
        // All state lives behind the store port; nothing to flush here.
        info!("server shutting down...");
    }
}
