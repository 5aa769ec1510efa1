use crate::auth::AuthService;
use crate::domain::models::container::{ClientId, ContainerAction, ContainerSummary};
use crate::domain::models::user::{CreateUserRequest, UserDirectory, UserRow, is_deletable};
use crate::domain::ports::{ApiError, ProvisioningApi};
use crate::notifications::Notifier;
use crate::views::{Outcome, error_text};
use log::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Containers,
    Users,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddUserForm {
    pub visible: bool,
    pub username: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Session {
    Active,
    Ended,
}

/// The administrator's screen.
///
/// Nothing in here is updated optimistically: mutating calls only bump
/// `refresh_trigger`, and [`AdminDashboard::sync`] re-reads whatever the
/// new trigger value has not been fetched for yet.
pub struct AdminDashboard<A: ProvisioningApi> {
    api: A,
    auth: AuthService<A>,
    notifier: Notifier,
    containers: Vec<ContainerSummary>,
    loading: bool,
    active_tab: Tab,
    directory: UserDirectory,
    add_user: AddUserForm,
    refresh_trigger: u64,
    containers_fetched_at: Option<u64>,
    users_fetched_at: Option<u64>,
    session: Session,
}

impl<A: ProvisioningApi> AdminDashboard<A> {
    pub fn new(api: A, notifier: Notifier) -> Self {
        Self {
            auth: AuthService::new(api.clone()),
            api,
            notifier,
            containers: Vec::new(),
            loading: true,
            active_tab: Tab::default(),
            directory: UserDirectory::default(),
            add_user: AddUserForm::default(),
            refresh_trigger: 0,
            containers_fetched_at: None,
            users_fetched_at: None,
            session: Session::Active,
        }
    }

    pub fn containers(&self) -> &[ContainerSummary] {
        &self.containers
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    pub fn user_rows(&self) -> Vec<UserRow> {
        self.directory.rows()
    }

    pub fn refresh_trigger(&self) -> u64 {
        self.refresh_trigger
    }

    pub fn is_session_active(&self) -> bool {
        self.session == Session::Active
    }

    pub fn add_user_form(&self) -> &AddUserForm {
        &self.add_user
    }

    pub fn add_user_form_mut(&mut self) -> &mut AddUserForm {
        &mut self.add_user
    }

    pub fn open_add_user(&mut self) {
        self.add_user.visible = true;
    }

    pub fn set_active_tab(&mut self, tab: Tab) {
        if tab == Tab::Users && self.active_tab != Tab::Users {
            self.users_fetched_at = None;
        }
        self.active_tab = tab;
    }

    /// Bumps the refresh trigger; the next [`AdminDashboard::sync`] re-fetches.
    pub fn refresh(&mut self) {
        self.refresh_trigger += 1;
    }

    /// One poll interval elapsed.
    pub async fn tick(&mut self) {
        self.refresh();
        self.sync().await;
    }

    /// Fetches every list that is stale for the current refresh trigger.
    pub async fn sync(&mut self) {
        if !self.is_session_active() {
            return;
        }
        let trigger = self.refresh_trigger;
        let containers_due = self.containers_fetched_at != Some(trigger);
        let users_due = self.active_tab == Tab::Users && self.users_fetched_at != Some(trigger);

        match (containers_due, users_due) {
            (true, true) => {
                let (containers, users) =
                    futures_util::join!(self.api.list_containers(), self.api.list_users());
                self.containers_fetched_at = Some(trigger);
                self.users_fetched_at = Some(trigger);
                self.apply_containers(containers).await;
                if self.is_session_active() {
                    self.apply_users(users).await;
                }
            }
            (true, false) => {
                let containers = self.api.list_containers().await;
                self.containers_fetched_at = Some(trigger);
                self.apply_containers(containers).await;
            }
            (false, true) => {
                let users = self.api.list_users().await;
                self.users_fetched_at = Some(trigger);
                self.apply_users(users).await;
            }
            (false, false) => debug!("nothing to refresh at trigger {trigger}"),
        }
    }

    async fn apply_containers(&mut self, result: Result<Vec<ContainerSummary>, ApiError>) {
        self.loading = false;
        match result {
            Ok(containers) => self.containers = containers,
            Err(e) if e.is_unauthorized() => self.force_logout().await,
            Err(e) => {
                error!("Error fetching containers: {e}");
                self.notifier.error("Failed to load containers").await;
            }
        }
    }

    async fn apply_users(&mut self, result: Result<UserDirectory, ApiError>) {
        match result {
            Ok(directory) => self.directory = directory,
            Err(e) if e.is_unauthorized() => self.force_logout().await,
            Err(e) => {
                error!("Error fetching users: {e}");
                self.notifier.error("Failed to load users").await;
            }
        }
    }

    pub async fn container_action(&mut self, client_id: &str, action: ContainerAction) -> Outcome {
        let Some(container) = self
            .containers
            .iter()
            .find(|c| c.client_id.as_str() == client_id)
        else {
            self.notifier
                .error(format!("No container found for client {client_id}"))
                .await;
            return Outcome::Blocked;
        };
        if !container.status.allows(action) {
            let status = container.status.to_string();
            self.notifier
                .error(format!("Cannot {action} a container that is {status}"))
                .await;
            return Outcome::Blocked;
        }

        let client_id = ClientId::new(client_id);
        match self.api.container_action(&client_id, action).await {
            Ok(reply) => {
                debug!("{action} {}: {:?}", client_id.as_str(), reply.message);
                self.notifier
                    .success(format!("Container {action} operation successful"))
                    .await;
                self.refresh();
                Outcome::Applied
            }
            Err(e) => {
                error!("Error performing {action} action: {e}");
                let text = format!(
                    "Failed to {action} container: {}",
                    error_text(&e, "Unknown error")
                );
                self.fail(e, text).await;
                Outcome::Failed
            }
        }
    }

    pub async fn add_user(&mut self) -> Outcome {
        let username = self.add_user.username.clone();
        if username.trim().is_empty() {
            self.notifier.error("Username is required").await;
            return Outcome::Blocked;
        }

        let request = CreateUserRequest {
            username,
            is_admin: self.add_user.is_admin,
        };
        match self.api.create_user(&request).await {
            Ok(_) => {
                self.notifier
                    .success(format!("User {} added successfully", request.username))
                    .await;
                self.add_user = AddUserForm::default();
                self.refresh();
                Outcome::Applied
            }
            Err(e) => {
                error!("Error adding user: {e}");
                let text = error_text(&e, "Failed to add user");
                self.fail(e, text).await;
                Outcome::Failed
            }
        }
    }

    /// Deletes `username` once `confirm` agrees. The default admin account
    /// is never deleted.
    pub async fn delete_user(
        &mut self,
        username: &str,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Outcome {
        if !is_deletable(username) {
            self.notifier
                .error(format!("User {username} cannot be deleted"))
                .await;
            return Outcome::Blocked;
        }
        if !confirm(&format!("Are you sure you want to delete user {username}?")) {
            return Outcome::Cancelled;
        }

        match self.api.delete_user(username).await {
            Ok(_) => {
                self.notifier
                    .success(format!("User {username} deleted successfully"))
                    .await;
                self.refresh();
                Outcome::Applied
            }
            Err(e) => {
                error!("Error deleting user: {e}");
                let text = error_text(&e, "Failed to delete user");
                self.fail(e, text).await;
                Outcome::Failed
            }
        }
    }

    /// Logs out. A failed call leaves the session as it is.
    pub async fn logout(&mut self) -> Outcome {
        match self.auth.admin_logout().await {
            Ok(_) => {
                self.notifier.success("Logged out successfully").await;
                self.end_session();
                Outcome::Applied
            }
            Err(_) => {
                self.notifier.error("Logout failed").await;
                Outcome::Failed
            }
        }
    }

    async fn fail(&mut self, e: ApiError, text: String) {
        if e.is_unauthorized() {
            self.force_logout().await;
        } else {
            self.notifier.error(text).await;
        }
    }

    // A 401 ends the session on this side whatever the logout call returns.
    async fn force_logout(&mut self) {
        self.notifier.error("Authentication required").await;
        if self.auth.admin_logout().await.is_ok() {
            self.notifier.success("Logged out successfully").await;
        }
        self.end_session();
    }

    fn end_session(&mut self) {
        info!("admin session ended");
        self.session = Session::Ended;
    }
}
