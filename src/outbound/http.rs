use crate::domain::models::container::{
    ActionRequest, ClientId, ClientRequest, ContainerAction, ContainerList, ContainerReply,
    ContainerSummary, ImageEntry, ImageName, SearchRequest, SpawnRequest,
};
use crate::domain::models::session::{
    Credentials, ErrorBody, LoginReply, MessageReply, VerifyReply,
};
use crate::domain::models::user::{CreateUserRequest, UserDirectory};
use crate::domain::ports::{ApiError, ProvisioningApi};
use log::debug;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// `ProvisioningApi` over HTTP. The admin session cookie lives in the
/// client's cookie store, so clones share one session.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
}

impl HttpApi {
    pub fn new(base: Url, timeout: Option<Duration>) -> Result<Self, ApiError> {
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base.to_string()));
        }
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base,
        })
    }

    /// Base URL extended by the given path segments. Segments are
    /// percent-encoded, so user names and client ids can be passed as is.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        debug!("{method} {url}");
        Ok(self.client.request(method, url))
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.request(Method::POST, segments)?.json(body).send().await?;
        decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let response = self.request(Method::GET, segments)?.send().await?;
        decode(response).await
    }

    async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let response = self.request(Method::DELETE, segments)?.send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    let body = response.text().await.unwrap_or_default();
    debug!("request failed with {status}: {body}");
    let error = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|body| body.error);
    if status == StatusCode::UNAUTHORIZED {
        Err(ApiError::Unauthorized { error })
    } else {
        Err(ApiError::Status {
            status: status.as_u16(),
            error,
        })
    }
}

impl ProvisioningApi for HttpApi {
    async fn get_container(&self, client_id: &ClientId) -> Result<ContainerReply, ApiError> {
        self.post(&["get"], &ClientRequest { client_id }).await
    }

    async fn spawn_container(
        &self,
        client_id: &ClientId,
        image: &ImageName,
    ) -> Result<ContainerReply, ApiError> {
        self.post(&["spawn"], &SpawnRequest { client_id, image }).await
    }

    async fn restart_container(&self, client_id: &ClientId) -> Result<ContainerReply, ApiError> {
        self.post(&["restart"], &ClientRequest { client_id }).await
    }

    async fn destroy_container(&self, client_id: &ClientId) -> Result<ContainerReply, ApiError> {
        self.post(&["destroy"], &ClientRequest { client_id }).await
    }

    async fn search_images(&self, fragment: &str) -> Result<Vec<ImageEntry>, ApiError> {
        self.post(&["search"], &SearchRequest { image: fragment }).await
    }

    async fn verify_client(&self, client_id: &ClientId) -> Result<VerifyReply, ApiError> {
        self.post(&["api", "auth", "verify"], &ClientRequest { client_id })
            .await
    }

    async fn admin_login(&self, credentials: &Credentials) -> Result<LoginReply, ApiError> {
        self.post(&["api", "auth", "admin", "login"], credentials)
            .await
    }

    async fn admin_logout(&self) -> Result<LoginReply, ApiError> {
        self.post(&["api", "auth", "admin", "logout"], &serde_json::json!({}))
            .await
    }

    async fn list_containers(&self) -> Result<Vec<ContainerSummary>, ApiError> {
        let list: ContainerList = self.get(&["api", "admin", "containers"]).await?;
        Ok(list.containers)
    }

    async fn list_users(&self) -> Result<UserDirectory, ApiError> {
        self.get(&["api", "admin", "users"]).await
    }

    async fn create_user(&self, request: &CreateUserRequest) -> Result<MessageReply, ApiError> {
        self.post(&["api", "admin", "users"], request).await
    }

    async fn delete_user(&self, username: &str) -> Result<MessageReply, ApiError> {
        self.delete(&["api", "admin", "users", username]).await
    }

    async fn container_action(
        &self,
        client_id: &ClientId,
        action: ContainerAction,
    ) -> Result<ContainerReply, ApiError> {
        self.post(
            &["api", "admin", "container", client_id.as_str(), "action"],
            &ActionRequest { action },
        )
        .await
    }
}
