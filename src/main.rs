mod cli;

use crate::cli::{AdminCommand, ConsoleCommand, UserCommand, configure_cli};
use container_console::app::{App, Route};
use container_console::config::{Config, load_config};
use container_console::domain::ports::ApiError;
use container_console::notifications::{Notifier, start_notification_handler};
use container_console::outbound::http::HttpApi;
use container_console::poller::{StopReason, run_refresh_loop};
use container_console::render;
use container_console::views::Outcome;
use container_console::views::admin::Tab;
use env_logger::Env;
use log::{debug, info};
use std::io::{BufRead, Write};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error)]
enum ConsoleError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid url `{0}`: {1}")]
    Url(String, url::ParseError),
    #[error("admin credentials missing, pass --username/--password or set them in the [admin] section")]
    MissingCredentials,
    #[error("operation not completed ({0:?})")]
    NotApplied(Outcome),
    #[error("admin session ended")]
    SessionEnded,
    #[error(transparent)]
    Signal(#[from] ctrlc::Error),
}

fn expect_applied(outcome: Outcome) -> Result<(), ConsoleError> {
    if outcome.is_applied() {
        Ok(())
    } else {
        Err(ConsoleError::NotApplied(outcome))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + 'static>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let invocation = configure_cli();

    let mut config = load_config(&invocation.config_path)?;
    if let Some(url) = &invocation.url {
        config.api.url = url
            .parse()
            .map_err(|e| ConsoleError::Url(url.clone(), e))?;
    }
    debug!("configuration: {config:?}");

    let api = HttpApi::new(config.api.url.clone(), config.api.timeout())?;
    let (notifier, rx) = Notifier::channel(32);
    let handler = tokio::spawn(start_notification_handler(rx));

    let result = run(invocation.command, &config, api, notifier).await;
    // all notifiers are dropped by now, so the handler drains and stops
    handler.await?;
    result.map_err(Into::into)
}

async fn run(
    command: ConsoleCommand,
    config: &Config,
    api: HttpApi,
    notifier: Notifier,
) -> Result<(), ConsoleError> {
    let mut app = App::new(api, notifier, config.defaults.image.clone());
    match command {
        ConsoleCommand::User { client_id, command } => {
            let hostname = config.link_hostname();
            let user = app.user();
            user.set_client_id(client_id).await;
            let outcome = match command {
                UserCommand::Status => Outcome::Applied,
                UserCommand::Spawn { image } => {
                    if let Some(image) = image {
                        user.set_image(image);
                    }
                    user.spawn().await
                }
                UserCommand::Restart => user.restart().await,
                UserCommand::Destroy => user.destroy().await,
            };
            print!("{}", render::container_status(user, &hostname));
            println!("{}", render::user_actions(user));
            expect_applied(outcome)
        }
        ConsoleCommand::Search { query } => {
            let entries = app.user().search_images(&query).await;
            print!("{}", render::image_matches(&entries));
            Ok(())
        }
        ConsoleCommand::Admin {
            username,
            password,
            command,
        } => {
            let form = app.login_form();
            form.username = username
                .or_else(|| config.admin.username.clone())
                .ok_or(ConsoleError::MissingCredentials)?;
            form.password = password
                .or_else(|| config.admin.password.clone())
                .ok_or(ConsoleError::MissingCredentials)?;

            app.navigate(Route::AdminDashboard);
            expect_applied(app.login().await)?;

            let result = run_admin(&mut app, config, command).await;
            app.sync_session();
            if app.is_admin_authenticated() {
                app.logout().await;
            }
            result
        }
    }
}

async fn run_admin(
    app: &mut App<HttpApi>,
    config: &Config,
    command: AdminCommand,
) -> Result<(), ConsoleError> {
    let Some(dashboard) = app.dashboard() else {
        return Err(ConsoleError::SessionEnded);
    };

    let outcome = match command {
        AdminCommand::Containers { watch: None } => {
            dashboard.sync().await;
            Outcome::Applied
        }
        AdminCommand::Containers {
            watch: Some(seconds),
        } => {
            let interval = if seconds == 0 {
                config.refresh_interval()
            } else {
                Duration::from_secs(seconds)
            };
            let (tx, rx) = watch::channel(false);
            ctrlc::set_handler(move || {
                info!("Received shutdown signal, stopping refresh");
                _ = tx.send(true);
            })?;
            let reason = run_refresh_loop(dashboard, interval, rx, |view| {
                print!("{}", render::dashboard(view));
            })
            .await;
            return match reason {
                StopReason::Shutdown => Ok(()),
                StopReason::SessionEnded => Err(ConsoleError::SessionEnded),
            };
        }
        AdminCommand::Action { client_id, action } => {
            dashboard.sync().await;
            let outcome = dashboard.container_action(&client_id, action).await;
            dashboard.sync().await;
            outcome
        }
        AdminCommand::Users => {
            dashboard.set_active_tab(Tab::Users);
            dashboard.sync().await;
            Outcome::Applied
        }
        AdminCommand::AddUser { username, is_admin } => {
            dashboard.set_active_tab(Tab::Users);
            dashboard.open_add_user();
            let form = dashboard.add_user_form_mut();
            form.username = username;
            form.is_admin = is_admin;
            let outcome = dashboard.add_user().await;
            dashboard.sync().await;
            outcome
        }
        AdminCommand::DeleteUser {
            username,
            assume_yes,
        } => {
            dashboard.set_active_tab(Tab::Users);
            let outcome = dashboard
                .delete_user(&username, |prompt| assume_yes || confirm(prompt))
                .await;
            dashboard.sync().await;
            outcome
        }
    };

    if !dashboard.is_session_active() {
        return Err(ConsoleError::SessionEnded);
    }
    print!("{}", render::dashboard(dashboard));
    expect_applied(outcome)
}

fn confirm(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    _ = std::io::stdout().flush();
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}
