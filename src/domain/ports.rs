use crate::domain::models::container::{
    ClientId, ContainerAction, ContainerReply, ContainerSummary, ImageEntry, ImageName,
};
use crate::domain::models::session::{Credentials, LoginReply, MessageReply, VerifyReply};
use crate::domain::models::user::{CreateUserRequest, UserDirectory};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("authentication required")]
    Unauthorized { error: Option<String> },
    #[error("request failed with status {status}")]
    Status { status: u16, error: Option<String> },
    #[error("invalid base url `{0}`")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// The `error` string the service put into the reply body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { error } | ApiError::Status { error, .. } => error.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            ApiError::InvalidBaseUrl(_) => None,
        }
    }
}

// The provisioning service as seen by the console. Every endpoint the
// console calls is one method here.
pub trait ProvisioningApi: Send + Sync + 'static + Clone {
    fn get_container(
        &self,
        client_id: &ClientId,
    ) -> impl Future<Output = Result<ContainerReply, ApiError>> + Send;

    fn spawn_container(
        &self,
        client_id: &ClientId,
        image: &ImageName,
    ) -> impl Future<Output = Result<ContainerReply, ApiError>> + Send;

    fn restart_container(
        &self,
        client_id: &ClientId,
    ) -> impl Future<Output = Result<ContainerReply, ApiError>> + Send;

    fn destroy_container(
        &self,
        client_id: &ClientId,
    ) -> impl Future<Output = Result<ContainerReply, ApiError>> + Send;

    fn search_images(
        &self,
        fragment: &str,
    ) -> impl Future<Output = Result<Vec<ImageEntry>, ApiError>> + Send;

    fn verify_client(
        &self,
        client_id: &ClientId,
    ) -> impl Future<Output = Result<VerifyReply, ApiError>> + Send;

    fn admin_login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<LoginReply, ApiError>> + Send;

    fn admin_logout(&self) -> impl Future<Output = Result<LoginReply, ApiError>> + Send;

    fn list_containers(
        &self,
    ) -> impl Future<Output = Result<Vec<ContainerSummary>, ApiError>> + Send;

    fn list_users(&self) -> impl Future<Output = Result<UserDirectory, ApiError>> + Send;

    fn create_user(
        &self,
        request: &CreateUserRequest,
    ) -> impl Future<Output = Result<MessageReply, ApiError>> + Send;

    fn delete_user(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<MessageReply, ApiError>> + Send;

    fn container_action(
        &self,
        client_id: &ClientId,
        action: ContainerAction,
    ) -> impl Future<Output = Result<ContainerReply, ApiError>> + Send;
}
