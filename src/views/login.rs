use crate::auth::AuthService;
use crate::domain::models::session::Credentials;
use crate::domain::ports::ProvisioningApi;
use crate::notifications::Notifier;
use crate::views::{Outcome, error_text};
use log::info;

/// Admin login form.
#[derive(Debug, Default, Clone)]
pub struct AdminLogin {
    pub username: String,
    pub password: String,
}

impl AdminLogin {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Posts the form. `Applied` means the session cookie is set.
    pub async fn submit<A: ProvisioningApi>(
        &mut self,
        auth: &AuthService<A>,
        notifier: &Notifier,
    ) -> Outcome {
        if self.username.trim().is_empty() || self.password.is_empty() {
            notifier.error("Username and password are required").await;
            return Outcome::Blocked;
        }

        let credentials = Credentials::new(self.username.clone(), self.password.clone());
        match auth.admin_login(&credentials).await {
            Ok(reply) if reply.success => {
                info!("admin {} logged in", credentials.username);
                notifier.success("Login successful").await;
                self.password.clear();
                Outcome::Applied
            }
            Ok(_) => {
                notifier.error("Login failed").await;
                Outcome::Failed
            }
            Err(e) => {
                notifier.error(error_text(&e, "Login failed")).await;
                Outcome::Failed
            }
        }
    }
}
