use crate::domain::models::container::ClientId;
use crate::domain::models::session::{Credentials, LoginReply, VerifyReply};
use crate::domain::ports::{ApiError, ProvisioningApi};
use log::error;

/// The three fixed authentication calls.
#[derive(Debug, Clone)]
pub struct AuthService<A: ProvisioningApi> {
    api: A,
}

impl<A: ProvisioningApi> AuthService<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Whether `client_id` may manage a container. Any failure counts as "no".
    pub async fn verify_user(&self, client_id: &ClientId) -> VerifyReply {
        match self.api.verify_client(client_id).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error verifying user {}: {e}", client_id.as_str());
                VerifyReply::invalid()
            }
        }
    }

    pub async fn admin_login(&self, credentials: &Credentials) -> Result<LoginReply, ApiError> {
        self.api
            .admin_login(credentials)
            .await
            .inspect_err(|e| error!("Login error: {e}"))
    }

    pub async fn admin_logout(&self) -> Result<LoginReply, ApiError> {
        self.api
            .admin_logout()
            .await
            .inspect_err(|e| error!("Logout error: {e}"))
    }
}
