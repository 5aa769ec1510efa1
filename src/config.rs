use figment2::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use url::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Api {
    pub url: Url,
    pub timeout: Option<u64>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            url: Url::parse("http://localhost:5000/").expect("static url is valid"),
            timeout: Some(30),
        }
    }
}

impl Api {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Admin {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Refresh {
    pub interval: u64,
}

impl Default for Refresh {
    fn default() -> Self {
        Self { interval: 10 }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Display {
    pub hostname: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Defaults {
    pub image: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            image: "ubuntu".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub admin: Admin,
    #[serde(default)]
    pub refresh: Refresh,
    #[serde(default)]
    pub display: Display,
    #[serde(default)]
    pub defaults: Defaults,
}

impl Config {
    /// Host used for "Open" links: the configured one, else the API host.
    pub fn link_hostname(&self) -> String {
        self.display
            .hostname
            .clone()
            .or_else(|| self.api.url.host_str().map(str::to_string))
            .unwrap_or_else(|| "localhost".to_string())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.interval.max(1))
    }
}

/// Defaults, then `config_path` if it exists, then `CONSOLE_*` variables
/// (`CONSOLE_API_URL` sets `api.url`).
pub fn load_config(config_path: &Path) -> Result<Config, figment2::Error> {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_path))
        .merge(Env::prefixed("CONSOLE_").split("_"))
        .extract()
}

#[test]
fn test_load_config() {
    use figment2::Jail;
    Jail::expect_with(|jail: &mut Jail| {
        jail.create_file(
            "console-test.toml",
            r#"
            [api]
            url="http://provisioner:5000/"

            [admin]
            username="admin"
            password="fromfile"

            [refresh]
            interval=5

            [defaults]
            image="nginx"
            "#,
        )?;

        jail.set_env("CONSOLE_ADMIN_PASSWORD", "fromenv");
        jail.set_env("CONSOLE_DISPLAY_HOSTNAME", "docker-host");

        let config = load_config("console-test.toml".as_ref())?;

        assert_eq!(config.api.url.as_str(), "http://provisioner:5000/");
        assert_eq!(config.api.timeout, Some(30));
        assert_eq!(config.admin.username.as_deref(), Some("admin"));
        assert_eq!(config.admin.password.as_deref(), Some("fromenv"));
        assert_eq!(config.refresh_interval(), Duration::from_secs(5));
        assert_eq!(config.defaults.image, "nginx");
        assert_eq!(config.link_hostname(), "docker-host");

        Ok(())
    });
}

#[test]
fn test_defaults_without_file() {
    use figment2::Jail;
    Jail::expect_with(|_jail: &mut Jail| {
        let config = load_config("missing.toml".as_ref())?;
        assert_eq!(config, Config::default());
        assert_eq!(config.link_hostname(), "localhost");
        assert_eq!(config.refresh_interval(), Duration::from_secs(10));
        assert_eq!(config.defaults.image, "ubuntu");
        Ok(())
    });
}
