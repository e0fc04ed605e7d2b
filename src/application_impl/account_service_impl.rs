use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 8;

pub struct RealAccountService {
    user_store: Arc<dyn UserStore>,
    credential_hasher: Arc<dyn CredentialHasher>,
    session_manager: Arc<dyn SessionManager>,
}

impl RealAccountService {
    pub fn new(
        user_store: Arc<dyn UserStore>,
        credential_hasher: Arc<dyn CredentialHasher>,
        session_manager: Arc<dyn SessionManager>,
    ) -> Self {
        Self {
            user_store,
            credential_hasher,
            session_manager,
        }
    }

    fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn validate_register(email: &str, password: &str) -> Result<(), AuthError> {
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::InvalidInput("invalid email".to_string()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::InvalidInput("password too short".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AccountService for RealAccountService {
    async fn register(&self, request: RegisterInput) -> Result<AuthOutcome, AuthError> {
        let email = Self::normalize_email(&request.email);
        Self::validate_register(&email, &request.password)?;

        let password_hash = self.credential_hasher.hash_password(&request.password).await?;
        let user_id = UserId(Uuid::new_v4());
        let display_name = request.display_name.trim().to_string();

        self.user_store
            .insert_user(UserRecord::new(user_id, email, display_name, password_hash))
            .await?;

        let tokens = self.session_manager.issue_session(user_id).await?;
        Ok(AuthOutcome { user_id, tokens })
    }

    async fn login(&self, request: LoginInput) -> Result<AuthOutcome, AuthError> {
        let email = Self::normalize_email(&request.email);

        // Unknown email and wrong password collapse into the same error so
        // the endpoint cannot be used to enumerate accounts.
        let user = self
            .user_store
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let ok = self
            .credential_hasher
            .verify_password(&request.password, &user.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.session_manager.issue_session(user.user_id).await?;
        Ok(AuthOutcome {
            user_id: user.user_id,
            tokens,
        })
    }

    async fn profile(&self, user_id: UserId) -> Result<ProfileView, AuthError> {
        let user = self
            .user_store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(ProfileView {
            user_id: user.user_id,
            email: user.email,
            display_name: user.display_name,
            created_at: user.created_at,
        })
    }
}
