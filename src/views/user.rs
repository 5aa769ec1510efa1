use crate::auth::AuthService;
use crate::domain::models::container::{
    ClientId, ContainerReply, ImageEntry, ImageName, PortMap, WebLink, web_links,
};
use crate::domain::ports::ProvisioningApi;
use crate::notifications::Notifier;
use crate::views::{Outcome, error_text};
use log::{debug, error};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Spawn,
    Restart,
    Destroy,
}

impl Display for UserAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UserAction::Spawn => write!(f, "spawn"),
            UserAction::Restart => write!(f, "restart"),
            UserAction::Destroy => write!(f, "destroy"),
        }
    }
}

/// The end user's screen: one client id, one image, at most one container.
pub struct UserDashboard<A: ProvisioningApi> {
    api: A,
    auth: AuthService<A>,
    notifier: Notifier,
    client_id: String,
    image: String,
    is_authorized: bool,
    container_id: String,
    ports: PortMap,
    host_ip: Option<String>,
    note: Option<String>,
}

impl<A: ProvisioningApi> UserDashboard<A> {
    pub fn new(api: A, notifier: Notifier, image: impl Into<String>) -> Self {
        Self {
            auth: AuthService::new(api.clone()),
            api,
            notifier,
            client_id: String::new(),
            image: image.into(),
            is_authorized: false,
            container_id: String::new(),
            ports: PortMap::new(),
            host_ip: None,
            note: None,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn is_authorized(&self) -> bool {
        self.is_authorized
    }

    pub fn container_id(&self) -> Option<&str> {
        if self.container_id.is_empty() {
            None
        } else {
            Some(&self.container_id)
        }
    }

    pub fn ports(&self) -> &PortMap {
        &self.ports
    }

    /// Host address the service reported with the last spawn.
    pub fn host_ip(&self) -> Option<&str> {
        self.host_ip.as_deref()
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn web_links(&self, hostname: &str) -> Vec<WebLink> {
        web_links(&self.ports, hostname)
    }

    pub fn set_image(&mut self, image: impl Into<String>) {
        self.image = image.into();
    }

    pub fn select_image(&mut self, entry: &ImageEntry) {
        self.image = entry.image.clone();
    }

    /// Replaces the client id, re-checks authorization and loads the
    /// client's container if it has one.
    pub async fn set_client_id(&mut self, client_id: impl Into<String>) {
        self.client_id = client_id.into();
        if self.client_id.trim().is_empty() {
            self.is_authorized = false;
            self.clear_container();
            return;
        }

        let reply = self.auth.verify_user(&self.current_client()).await;
        self.is_authorized = reply.valid;
        if self.is_authorized {
            self.fetch_container().await;
        } else {
            debug!("client {} is not authorized", self.client_id);
            self.clear_container();
        }
    }

    pub async fn fetch_container(&mut self) {
        match self.api.get_container(&self.current_client()).await {
            Ok(reply) => {
                self.container_id = reply.container_id.unwrap_or_default();
                self.ports = reply.ports.unwrap_or_default();
                self.host_ip = reply.host_ip;
                self.note = reply.note;
            }
            Err(e) => {
                error!("Error fetching container for {}: {e}", self.client_id);
                self.clear_container();
            }
        }
    }

    pub fn can_spawn(&self) -> bool {
        self.is_authorized
    }

    pub fn can_restart(&self) -> bool {
        self.is_authorized && !self.container_id.is_empty()
    }

    pub fn can_destroy(&self) -> bool {
        self.can_restart()
    }

    pub fn is_enabled(&self, action: UserAction) -> bool {
        match action {
            UserAction::Spawn => self.can_spawn(),
            UserAction::Restart => self.can_restart(),
            UserAction::Destroy => self.can_destroy(),
        }
    }

    pub async fn spawn(&mut self) -> Outcome {
        self.request(UserAction::Spawn).await
    }

    pub async fn restart(&mut self) -> Outcome {
        self.request(UserAction::Restart).await
    }

    pub async fn destroy(&mut self) -> Outcome {
        self.request(UserAction::Destroy).await
    }

    pub async fn request(&mut self, action: UserAction) -> Outcome {
        if !self.is_authorized {
            self.notifier.error("Client ID is not authorized").await;
            return Outcome::Blocked;
        }
        if !self.is_enabled(action) {
            self.notifier
                .error(format!("No container to {action} for this client"))
                .await;
            return Outcome::Blocked;
        }
        if action == UserAction::Spawn && self.image.trim().is_empty() {
            self.notifier.error("Image is required").await;
            return Outcome::Blocked;
        }

        let client_id = self.current_client();
        debug!("sending {action} request for {}", client_id.as_str());
        let result = match action {
            UserAction::Spawn => {
                let image = ImageName::new(self.image.clone());
                self.api.spawn_container(&client_id, &image).await
            }
            UserAction::Restart => self.api.restart_container(&client_id).await,
            UserAction::Destroy => self.api.destroy_container(&client_id).await,
        };

        match result {
            Ok(reply) => {
                self.apply(action, reply).await;
                Outcome::Applied
            }
            Err(e) => {
                error!("Error in {action}: {e}");
                self.notifier.error(error_text(&e, "Request failed")).await;
                Outcome::Failed
            }
        }
    }

    async fn apply(&mut self, action: UserAction, reply: ContainerReply) {
        let message = reply
            .message
            .clone()
            .unwrap_or_else(|| format!("Container {action} successful"));
        self.notifier.success(message).await;
        match action {
            UserAction::Spawn => {
                self.container_id = reply.container_id.unwrap_or_default();
                self.ports = reply.ports.unwrap_or_default();
                self.host_ip = reply.host_ip;
                self.note = reply.note;
            }
            UserAction::Restart => {
                self.ports = reply.ports.unwrap_or_default();
            }
            UserAction::Destroy => self.clear_container(),
        }
    }

    /// Image catalogue entries matching `fragment`.
    pub async fn search_images(&self, fragment: &str) -> Vec<ImageEntry> {
        match self.api.search_images(fragment).await {
            Ok(entries) => entries,
            Err(e) => {
                error!("Error searching images for {fragment}: {e}");
                self.notifier.error("Image search failed").await;
                Vec::new()
            }
        }
    }

    // sent as typed; trimming is only for the blank check
    fn current_client(&self) -> ClientId {
        ClientId::new(self.client_id.clone())
    }

    fn clear_container(&mut self) {
        self.container_id.clear();
        self.ports.clear();
        self.host_ip = None;
        self.note = None;
    }
}
