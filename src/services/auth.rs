use tracing::{debug, info};

use crate::api::{ApiError, ApiGateway};
use crate::models::{AccountProfile, AuthResponse, LoginRequest};

/// Login, logout, and account profile operations
pub struct AuthService {
    gateway: ApiGateway,
}

impl AuthService {
    pub fn new(gateway: ApiGateway) -> Self {
        Self { gateway }
    }

    /// Log in with email and password.
    ///
    /// On success the returned credential pair is stored in the session,
    /// ready for authenticated calls. The full response is returned either
    /// way so the caller can surface the server's message on failure.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        debug!(email = %request.email, "Logging in");
        let response: AuthResponse = self
            .gateway
            .post_unauthenticated("/console/api/login", request)
            .await?;

        if let Some(tokens) = response.tokens() {
            self.gateway
                .session()
                .save_credential_pair(&tokens.access_token, &tokens.refresh_token);
            info!("Login succeeded, credentials stored");
        }

        Ok(response)
    }

    /// Drop the stored credential pair. The API host is kept so the next
    /// login does not have to re-enter it.
    pub fn logout(&self) {
        self.gateway.session().clear_credential_pair();
        info!("Logged out, credentials cleared");
    }

    /// Fetch the account profile for the logged-in user
    pub async fn profile(&self) -> Result<AccountProfile, ApiError> {
        self.gateway.get("/console/api/account/profile").await
    }
}
