use clap::{Arg, ArgAction, ArgMatches, Command};
use container_console::domain::models::container::ContainerAction;
use std::path::PathBuf;

pub struct Invocation {
    pub config_path: PathBuf,
    pub url: Option<String>,
    pub command: ConsoleCommand,
}

#[derive(Debug, PartialEq)]
pub enum UserCommand {
    Status,
    Spawn { image: Option<String> },
    Restart,
    Destroy,
}

#[derive(Debug, PartialEq)]
pub enum AdminCommand {
    /// `Some(0)` asks for the configured interval.
    Containers { watch: Option<u64> },
    Action {
        client_id: String,
        action: ContainerAction,
    },
    Users,
    AddUser { username: String, is_admin: bool },
    DeleteUser { username: String, assume_yes: bool },
}

#[derive(Debug, PartialEq)]
pub enum ConsoleCommand {
    User {
        client_id: String,
        command: UserCommand,
    },
    Search {
        query: String,
    },
    Admin {
        username: Option<String>,
        password: Option<String>,
        command: AdminCommand,
    },
}

impl From<ArgMatches> for Invocation {
    fn from(matches: ArgMatches) -> Self {
        let config_path = matches
            .get_one::<PathBuf>("config")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("console.toml"));
        let url = matches.get_one::<String>("url").cloned();
        let command = match matches.subcommand() {
            Some(("user", sub)) => ConsoleCommand::User {
                client_id: string(sub, "client_id"),
                command: match sub.subcommand() {
                    Some(("spawn", spawn)) => UserCommand::Spawn {
                        image: spawn.get_one::<String>("image").cloned(),
                    },
                    Some(("restart", _)) => UserCommand::Restart,
                    Some(("destroy", _)) => UserCommand::Destroy,
                    _ => UserCommand::Status,
                },
            },
            Some(("search", sub)) => ConsoleCommand::Search {
                query: string(sub, "query"),
            },
            Some(("admin", sub)) => ConsoleCommand::Admin {
                username: sub.get_one::<String>("username").cloned(),
                password: sub.get_one::<String>("password").cloned(),
                command: match sub.subcommand() {
                    Some(("action", action)) => AdminCommand::Action {
                        client_id: string(action, "client_id"),
                        action: *action
                            .get_one::<ContainerAction>("action")
                            .unwrap_or(&ContainerAction::Restart),
                    },
                    Some(("users", _)) => AdminCommand::Users,
                    Some(("add-user", add)) => AdminCommand::AddUser {
                        username: string(add, "username"),
                        is_admin: add.get_flag("admin"),
                    },
                    Some(("delete-user", delete)) => AdminCommand::DeleteUser {
                        username: string(delete, "username"),
                        assume_yes: delete.get_flag("yes"),
                    },
                    Some(("containers", containers)) => AdminCommand::Containers {
                        watch: containers.get_one::<u64>("watch").copied(),
                    },
                    _ => AdminCommand::Containers { watch: None },
                },
            },
            _ => unreachable!("a subcommand is required"),
        };
        Invocation {
            config_path,
            url,
            command,
        }
    }
}

fn string(matches: &ArgMatches, id: &str) -> String {
    matches.get_one::<String>(id).cloned().unwrap_or_default()
}

fn command() -> Command {
    Command::new("container-console")
        .version(env!("CARGO_PKG_VERSION"))
        .about("inspect and manage containers of the provisioning service")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path of the TOML configuration (default: console.toml)")
                .value_name("PATH")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("url")
                .long("url")
                .help("Base URL of the provisioning service")
                .value_name("URL")
                .global(true),
        )
        .subcommand(
            Command::new("user")
                .about("Manage the container of one client")
                .arg(
                    Arg::new("client_id")
                        .long("client-id")
                        .value_name("ID")
                        .required(true),
                )
                .subcommand(Command::new("status").about("Show the client's container (default)"))
                .subcommand(
                    Command::new("spawn").about("Spawn a container").arg(
                        Arg::new("image")
                            .short('i')
                            .long("image")
                            .value_name("IMAGE")
                            .help("Image to run (default from configuration)"),
                    ),
                )
                .subcommand(Command::new("restart").about("Restart the client's container"))
                .subcommand(Command::new("destroy").about("Destroy the client's container")),
        )
        .subcommand(
            Command::new("search")
                .about("Search the image catalogue")
                .arg(Arg::new("query").value_name("QUERY").required(true)),
        )
        .subcommand(
            Command::new("admin")
                .about("Administer containers and users")
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .value_name("USERNAME"),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .value_name("PASSWORD"),
                )
                .subcommand(
                    Command::new("containers")
                        .about("List all containers (default)")
                        .arg(
                            Arg::new("watch")
                                .short('w')
                                .long("watch")
                                .help("Watch mode: refresh every N seconds (default: configured interval)")
                                .value_name("SECONDS")
                                .num_args(0..=1)
                                .default_missing_value("0")
                                .value_parser(clap::value_parser!(u64)),
                        ),
                )
                .subcommand(
                    Command::new("action")
                        .about("Start, stop, restart or destroy a client's container")
                        .arg(Arg::new("client_id").value_name("CLIENT_ID").required(true))
                        .arg(
                            Arg::new("action")
                                .value_name("ACTION")
                                .required(true)
                                .value_parser(|s: &str| s.parse::<ContainerAction>()),
                        ),
                )
                .subcommand(Command::new("users").about("List users and admins"))
                .subcommand(
                    Command::new("add-user")
                        .about("Add a user")
                        .arg(Arg::new("username").value_name("USERNAME").required(true))
                        .arg(
                            Arg::new("admin")
                                .long("admin")
                                .help("Grant admin privileges")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(
                    Command::new("delete-user")
                        .about("Delete a user")
                        .arg(Arg::new("username").value_name("USERNAME").required(true))
                        .arg(
                            Arg::new("yes")
                                .short('y')
                                .long("yes")
                                .help("Do not ask for confirmation")
                                .action(ArgAction::SetTrue),
                        ),
                ),
        )
}

pub(crate) fn configure_cli() -> Invocation {
    command().get_matches().into()
}
