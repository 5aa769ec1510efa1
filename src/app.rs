use crate::auth::AuthService;
use crate::domain::ports::ProvisioningApi;
use crate::notifications::Notifier;
use crate::views::Outcome;
use crate::views::admin::AdminDashboard;
use crate::views::login::AdminLogin;
use crate::views::user::UserDashboard;
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    UserDashboard,
    AdminLogin,
    AdminDashboard,
}

/// Top level navigation between the user screen and the admin screens.
pub struct App<A: ProvisioningApi> {
    api: A,
    auth: AuthService<A>,
    notifier: Notifier,
    route: Route,
    user: UserDashboard<A>,
    login: AdminLogin,
    dashboard: Option<AdminDashboard<A>>,
}

impl<A: ProvisioningApi> App<A> {
    pub fn new(api: A, notifier: Notifier, default_image: impl Into<String>) -> Self {
        Self {
            user: UserDashboard::new(api.clone(), notifier.clone(), default_image),
            auth: AuthService::new(api.clone()),
            api,
            notifier,
            route: Route::UserDashboard,
            login: AdminLogin::default(),
            dashboard: None,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn is_admin_authenticated(&self) -> bool {
        self.dashboard.is_some()
    }

    /// Moves to `route`; the admin dashboard is only reachable with a session.
    pub fn navigate(&mut self, route: Route) {
        self.route = match route {
            Route::AdminDashboard if !self.is_admin_authenticated() => Route::AdminLogin,
            Route::AdminLogin if self.is_admin_authenticated() => Route::AdminDashboard,
            other => other,
        };
    }

    pub fn user(&mut self) -> &mut UserDashboard<A> {
        &mut self.user
    }

    pub fn login_form(&mut self) -> &mut AdminLogin {
        &mut self.login
    }

    pub fn dashboard(&mut self) -> Option<&mut AdminDashboard<A>> {
        self.dashboard.as_mut()
    }

    pub async fn login(&mut self) -> Outcome {
        let outcome = self.login.submit(&self.auth, &self.notifier).await;
        if outcome.is_applied() {
            self.dashboard = Some(AdminDashboard::new(self.api.clone(), self.notifier.clone()));
            self.route = Route::AdminDashboard;
        }
        outcome
    }

    pub async fn logout(&mut self) -> Outcome {
        let Some(dashboard) = self.dashboard.as_mut() else {
            return Outcome::Blocked;
        };
        let outcome = dashboard.logout().await;
        self.sync_session();
        outcome
    }

    /// Drops the dashboard once its session has ended, e.g. after a 401.
    pub fn sync_session(&mut self) {
        if self
            .dashboard
            .as_ref()
            .is_some_and(|dashboard| !dashboard.is_session_active())
        {
            info!("returning to admin login");
            self.dashboard = None;
            self.route = Route::AdminLogin;
        }
    }
}
