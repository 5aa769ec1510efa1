use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Container ports that get a clickable "Open" link in the status panel.
pub const WEB_PORTS: [u16; 4] = [80, 443, 8080, 3000];

/// Opaque identifier of an end user's container allocation.
#[derive(Deserialize, Serialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The name of an image as understood by the provisioning service, e.g. "ubuntu" or "nginx:latest"
#[derive(Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
pub struct ImageName(pub String);

impl ImageName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Host side of a port binding. The service reports it either as a bare
/// number, as a string, or as a `{hostPort, hostIp}` object.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum HostPort {
    Number(u16),
    Text(String),
    Binding {
        #[serde(rename = "hostPort")]
        host_port: String,
        #[serde(rename = "hostIp", default, skip_serializing_if = "Option::is_none")]
        host_ip: Option<String>,
    },
}

impl HostPort {
    pub fn port(&self) -> Option<u16> {
        match self {
            HostPort::Number(port) => Some(*port),
            HostPort::Text(text) => text.trim().parse().ok(),
            HostPort::Binding { host_port, .. } => host_port.trim().parse().ok(),
        }
    }
}

impl Display for HostPort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HostPort::Number(port) => write!(f, "{port}"),
            HostPort::Text(text) => write!(f, "{text}"),
            HostPort::Binding {
                host_port,
                host_ip: Some(ip),
            } => write!(f, "{ip}:{host_port}"),
            HostPort::Binding { host_port, .. } => write!(f, "{host_port}"),
        }
    }
}

/// Container port key (`"80/tcp"`) to host port.
pub type PortMap = BTreeMap<String, HostPort>;

/// Numeric part of a container port key such as `"8080/tcp"`.
pub fn container_port_number(key: &str) -> Option<u16> {
    key.split('/').next()?.trim().parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebLink {
    pub container_port: String,
    pub url: String,
}

/// "Open" links for every mapped web port, ordered by container port key.
pub fn web_links(ports: &PortMap, hostname: &str) -> Vec<WebLink> {
    ports
        .iter()
        .filter(|(key, _)| container_port_number(key).is_some_and(|p| WEB_PORTS.contains(&p)))
        .filter_map(|(key, host)| {
            host.port().map(|port| WebLink {
                container_port: key.clone(),
                url: format!("http://{hostname}:{port}"),
            })
        })
        .collect()
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum ContainerStatus {
    Running,
    Exited,
    Other(String),
}

impl From<String> for ContainerStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "running" => ContainerStatus::Running,
            "exited" => ContainerStatus::Exited,
            _ => ContainerStatus::Other(value),
        }
    }
}

impl From<ContainerStatus> for String {
    fn from(value: ContainerStatus) -> Self {
        value.to_string()
    }
}

impl Display for ContainerStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerStatus::Running => write!(f, "running"),
            ContainerStatus::Exited => write!(f, "exited"),
            ContainerStatus::Other(status) => write!(f, "{status}"),
        }
    }
}

impl ContainerStatus {
    /// Actions an administrator is offered for a container in this state.
    pub fn allowed_actions(&self) -> &'static [ContainerAction] {
        match self {
            ContainerStatus::Running => &[
                ContainerAction::Restart,
                ContainerAction::Stop,
                ContainerAction::Destroy,
            ],
            ContainerStatus::Exited => &[ContainerAction::Start, ContainerAction::Destroy],
            ContainerStatus::Other(_) => &[ContainerAction::Destroy],
        }
    }

    pub fn allows(&self, action: ContainerAction) -> bool {
        self.allowed_actions().contains(&action)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContainerAction {
    Start,
    Stop,
    Restart,
    Destroy,
}

impl Display for ContainerAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerAction::Start => write!(f, "start"),
            ContainerAction::Stop => write!(f, "stop"),
            ContainerAction::Restart => write!(f, "restart"),
            ContainerAction::Destroy => write!(f, "destroy"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown container action `{0}`, expected one of start, stop, restart, destroy")]
pub struct UnknownAction(pub String);

impl FromStr for ContainerAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(ContainerAction::Start),
            "stop" => Ok(ContainerAction::Stop),
            "restart" => Ok(ContainerAction::Restart),
            "destroy" | "delete" => Ok(ContainerAction::Destroy),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

/// One row of the admin container list.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ContainerSummary {
    pub client_id: ClientId,
    pub image: String,
    pub status: ContainerStatus,
    pub container_id: String,
    #[serde(default)]
    pub ports: PortMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl ContainerSummary {
    pub fn short_id(&self) -> &str {
        match self.container_id.char_indices().nth(12) {
            Some((idx, _)) => &self.container_id[..idx],
            None => &self.container_id,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct ContainerList {
    #[serde(default)]
    pub containers: Vec<ContainerSummary>,
}

/// Reply of the per-client container endpoints and of admin actions.
/// Fields the endpoint does not send stay `None`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct ContainerReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub container_id: Option<String>,
    #[serde(default)]
    pub ports: Option<PortMap>,
    #[serde(default)]
    pub host_ip: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ClientRequest<'a> {
    pub client_id: &'a ClientId,
}

#[derive(Serialize, Debug, Clone)]
pub struct SpawnRequest<'a> {
    pub client_id: &'a ClientId,
    pub image: &'a ImageName,
}

#[derive(Serialize, Debug, Clone)]
pub struct ActionRequest {
    pub action: ContainerAction,
}

#[derive(Serialize, Debug, Clone)]
pub struct SearchRequest<'a> {
    pub image: &'a str,
}

/// Entry of the image catalogue returned by `/search`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub image: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub volumes: BTreeMap<String, String>,
}
