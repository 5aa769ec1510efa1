use crate::domain::ports::ProvisioningApi;
use crate::views::admin::AdminDashboard;
use log::{debug, info};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

/// Poll interval of the admin dashboard.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Shutdown,
    SessionEnded,
}

/// Loads the dashboard, then re-reads it on every interval tick until
/// `shutdown` flips to `true` or the admin session ends. `on_refresh` runs
/// after the initial load and after every tick.
pub async fn run_refresh_loop<A, F>(
    dashboard: &mut AdminDashboard<A>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut on_refresh: F,
) -> StopReason
where
    A: ProvisioningApi,
    F: FnMut(&AdminDashboard<A>),
{
    info!("refreshing every {}s", interval.as_secs());
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick completes immediately
    ticker.tick().await;

    dashboard.sync().await;
    if !dashboard.is_session_active() {
        return StopReason::SessionEnded;
    }
    on_refresh(dashboard);

    loop {
        if *shutdown.borrow() {
            return StopReason::Shutdown;
        }
        tokio::select! {
            _ = ticker.tick() => {
                debug!("refresh tick");
                dashboard.tick().await;
                if !dashboard.is_session_active() {
                    return StopReason::SessionEnded;
                }
                on_refresh(dashboard);
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    return StopReason::Shutdown;
                }
            }
        }
    }
}
