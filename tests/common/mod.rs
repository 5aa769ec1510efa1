#![allow(dead_code)]

use container_console::domain::models::container::{
    ClientId, ContainerAction, ContainerReply, ContainerStatus, ContainerSummary, HostPort,
    ImageEntry, ImageName, PortMap,
};
use container_console::domain::models::session::{
    Credentials, LoginReply, MessageReply, VerifyReply,
};
use container_console::domain::models::user::{CreateUserRequest, UserDirectory};
use container_console::domain::ports::{ApiError, ProvisioningApi};
use container_console::notifications::{Notification, Notifier};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc::Receiver;

pub const ADMIN_PASSWORD: &str = "secret";
pub const HOST_IP: &str = "10.0.0.5";

/// In-memory provisioning service that counts every call.
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
pub struct FakeState {
    pub directory: UserDirectory,
    pub containers: BTreeMap<String, ContainerSummary>,
    pub images: Vec<ImageEntry>,
    pub logged_in: bool,
    pub session_expired: bool,
    pub fail_logout: bool,
    /// Admin list endpoints answer 500 with an `error` text.
    pub fail_lists: bool,
    /// Container actions answer 500 without an `error` text.
    pub fail_actions: bool,
    /// Login answers 200 without `success: true`.
    pub refuse_login_softly: bool,
    pub calls: HashMap<&'static str, usize>,
    next_port: u16,
}

fn status(code: u16, error: &str) -> ApiError {
    ApiError::Status {
        status: code,
        error: Some(error.to_string()),
    }
}

fn unauthorized() -> ApiError {
    ApiError::Unauthorized {
        error: Some("Admin authentication required".to_string()),
    }
}

impl FakeApi {
    pub fn new() -> Self {
        let api = Self::default();
        {
            let mut state = api.state();
            state.directory = UserDirectory {
                users: vec!["user1".into(), "user2".into(), "user3".into(), "admin".into()],
                admins: vec!["admin".into()],
            };
            state.images = vec![
                ImageEntry {
                    image: "ubuntu".into(),
                    label: "Ubuntu".into(),
                    volumes: BTreeMap::new(),
                },
                ImageEntry {
                    image: "nginx".into(),
                    label: "Nginx web server".into(),
                    volumes: BTreeMap::new(),
                },
            ];
            state.next_port = 32768;
        }
        api
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self, endpoint: &str) -> usize {
        self.state().calls.get(endpoint).copied().unwrap_or(0)
    }

    pub fn with_container(self, client_id: &str, status: &str, ports: &[(&str, HostPort)]) -> Self {
        let summary = ContainerSummary {
            client_id: ClientId::new(client_id),
            image: "nginx:latest".into(),
            status: ContainerStatus::from(status.to_string()),
            container_id: format!("{client_id}-0123456789abcdef"),
            ports: ports
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            created: None,
        };
        self.state().containers.insert(client_id.to_string(), summary);
        self
    }
}

impl FakeState {
    fn record(&mut self, endpoint: &'static str) {
        *self.calls.entry(endpoint).or_default() += 1;
    }

    fn require_admin(&self) -> Result<(), ApiError> {
        if self.logged_in && !self.session_expired {
            Ok(())
        } else {
            Err(unauthorized())
        }
    }

    fn require_client(&self, client_id: &ClientId) -> Result<(), ApiError> {
        if self.directory.users.iter().any(|u| u == client_id.as_str()) {
            Ok(())
        } else {
            Err(status(403, "Unauthorized client ID"))
        }
    }

    fn fresh_ports(&mut self) -> PortMap {
        let mut ports = PortMap::new();
        ports.insert("80/tcp".into(), HostPort::Text(self.next_port.to_string()));
        ports.insert("22/tcp".into(), HostPort::Text((self.next_port + 1).to_string()));
        self.next_port += 2;
        ports
    }
}

impl ProvisioningApi for FakeApi {
    async fn get_container(&self, client_id: &ClientId) -> Result<ContainerReply, ApiError> {
        let mut state = self.state();
        state.record("get");
        state.require_client(client_id)?;
        let container = state
            .containers
            .get(client_id.as_str())
            .ok_or_else(|| status(404, "No container found"))?;
        Ok(ContainerReply {
            message: Some("Container found".into()),
            container_id: Some(container.container_id.clone()),
            ports: Some(container.ports.clone()),
            ..Default::default()
        })
    }

    async fn spawn_container(
        &self,
        client_id: &ClientId,
        image: &ImageName,
    ) -> Result<ContainerReply, ApiError> {
        let mut state = self.state();
        state.record("spawn");
        state.require_client(client_id)?;
        if state.containers.contains_key(client_id.as_str()) {
            return Err(status(400, "Client already has a container"));
        }
        let ports = state.fresh_ports();
        let summary = ContainerSummary {
            client_id: client_id.clone(),
            image: image.as_str().to_string(),
            status: ContainerStatus::Running,
            container_id: format!("{}-spawned", client_id.as_str()),
            ports: ports.clone(),
            created: None,
        };
        let container_id = summary.container_id.clone();
        state
            .containers
            .insert(client_id.as_str().to_string(), summary);
        Ok(ContainerReply {
            message: Some("Container spawned successfully".into()),
            container_id: Some(container_id),
            ports: Some(ports),
            host_ip: Some(HOST_IP.into()),
            note: Some("Ports are mapped to random host ports".into()),
        })
    }

    async fn restart_container(&self, client_id: &ClientId) -> Result<ContainerReply, ApiError> {
        let mut state = self.state();
        state.record("restart");
        state.require_client(client_id)?;
        if !state.containers.contains_key(client_id.as_str()) {
            return Err(status(404, "No container found"));
        }
        let ports = state.fresh_ports();
        if let Some(container) = state.containers.get_mut(client_id.as_str()) {
            container.ports = ports.clone();
        }
        Ok(ContainerReply {
            message: Some("Container restarted".into()),
            ports: Some(ports),
            ..Default::default()
        })
    }

    async fn destroy_container(&self, client_id: &ClientId) -> Result<ContainerReply, ApiError> {
        let mut state = self.state();
        state.record("destroy");
        state.require_client(client_id)?;
        state
            .containers
            .remove(client_id.as_str())
            .ok_or_else(|| status(404, "No container found"))?;
        Ok(ContainerReply {
            message: Some("Container destroyed".into()),
            ..Default::default()
        })
    }

    async fn search_images(&self, fragment: &str) -> Result<Vec<ImageEntry>, ApiError> {
        let mut state = self.state();
        state.record("search");
        let fragment = fragment.to_lowercase();
        Ok(state
            .images
            .iter()
            .filter(|entry| entry.label.to_lowercase().contains(&fragment))
            .cloned()
            .collect())
    }

    async fn verify_client(&self, client_id: &ClientId) -> Result<VerifyReply, ApiError> {
        let mut state = self.state();
        state.record("verify");
        let valid = state.directory.users.iter().any(|u| u == client_id.as_str());
        Ok(VerifyReply {
            valid,
            is_admin: valid && state.directory.admins.iter().any(|a| a == client_id.as_str()),
        })
    }

    async fn admin_login(&self, credentials: &Credentials) -> Result<LoginReply, ApiError> {
        let mut state = self.state();
        state.record("login");
        if state.refuse_login_softly {
            return Ok(LoginReply {
                success: false,
                message: Some("Try again later".into()),
            });
        }
        if credentials.username == "admin" && credentials.password == ADMIN_PASSWORD {
            state.logged_in = true;
            state.session_expired = false;
            Ok(LoginReply {
                success: true,
                message: Some("Login successful".into()),
            })
        } else {
            Err(ApiError::Unauthorized {
                error: Some("Invalid credentials".into()),
            })
        }
    }

    async fn admin_logout(&self) -> Result<LoginReply, ApiError> {
        let mut state = self.state();
        state.record("logout");
        if state.fail_logout {
            return Err(status(500, "Internal Server Error"));
        }
        state.logged_in = false;
        Ok(LoginReply {
            success: true,
            message: Some("Logout successful".into()),
        })
    }

    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, ApiError> {
        let mut state = self.state();
        state.record("list_containers");
        state.require_admin()?;
        if state.fail_lists {
            return Err(status(500, "Docker daemon unavailable"));
        }
        Ok(state.containers.values().cloned().collect())
    }

    async fn list_users(&self) -> Result<UserDirectory, ApiError> {
        let mut state = self.state();
        state.record("list_users");
        state.require_admin()?;
        if state.fail_lists {
            return Err(status(500, "User store unavailable"));
        }
        Ok(state.directory.clone())
    }

    async fn create_user(&self, request: &CreateUserRequest) -> Result<MessageReply, ApiError> {
        let mut state = self.state();
        state.record("create_user");
        state.require_admin()?;
        if state.directory.users.contains(&request.username) {
            return Err(status(400, "User already exists"));
        }
        state.directory.users.push(request.username.clone());
        if request.is_admin {
            state.directory.admins.push(request.username.clone());
        }
        Ok(MessageReply {
            message: Some(format!("User {} added successfully", request.username)),
        })
    }

    async fn delete_user(&self, username: &str) -> Result<MessageReply, ApiError> {
        let mut state = self.state();
        state.record("delete_user");
        state.require_admin()?;
        if username == "admin" {
            return Err(status(400, "Cannot delete default admin user"));
        }
        let before = state.directory.users.len();
        state.directory.users.retain(|u| u != username);
        if state.directory.users.len() == before {
            return Err(status(404, "User not found"));
        }
        state.directory.admins.retain(|a| a != username);
        Ok(MessageReply {
            message: Some(format!("User {username} deleted successfully")),
        })
    }

    async fn container_action(
        &self,
        client_id: &ClientId,
        action: ContainerAction,
    ) -> Result<ContainerReply, ApiError> {
        let mut state = self.state();
        state.record("container_action");
        state.require_admin()?;
        if state.fail_actions {
            return Err(ApiError::Status {
                status: 500,
                error: None,
            });
        }
        if !state.containers.contains_key(client_id.as_str()) {
            return Err(status(404, "No container found for this client"));
        }
        match action {
            ContainerAction::Destroy => {
                state.containers.remove(client_id.as_str());
            }
            ContainerAction::Stop => {
                if let Some(c) = state.containers.get_mut(client_id.as_str()) {
                    c.status = ContainerStatus::Exited;
                }
            }
            ContainerAction::Start | ContainerAction::Restart => {
                if let Some(c) = state.containers.get_mut(client_id.as_str()) {
                    c.status = ContainerStatus::Running;
                }
            }
        }
        Ok(ContainerReply {
            message: Some(format!("Container for client {} {action}", client_id.as_str())),
            ..Default::default()
        })
    }
}

pub fn notifier() -> (Notifier, Receiver<Notification>) {
    Notifier::channel(64)
}

/// Texts of every notification received so far.
pub fn drain(rx: &mut Receiver<Notification>) -> Vec<String> {
    let mut texts = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        texts.push(notification.text);
    }
    texts
}
