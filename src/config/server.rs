use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;

/// Port used when `PORT` is unset or unusable.
pub const DEFAULT_PORT: u16 = 3000;

/// Environment variable naming the YAML configuration file.
pub const CONFIG_PATH_ENV: &str = "APPRENTICE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// Prefix for environment overrides of any config key, e.g. `APPRENTICE_LOGGING__LEVEL`.
pub const ENV_PREFIX: &str = "APPRENTICE_";

/// Value of `APP_ENV` that suppresses the automatic listen step.
pub const TEST_ENV: &str = "test";

/// Runtime configuration for the server binary.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port", deserialize_with = "lenient_port")]
    pub port: u16,
    /// Deployment environment, read from `APP_ENV`.
    #[serde(
        default,
        deserialize_with = "lenient_env",
        skip_serializing_if = "Option::is_none"
    )]
    pub app_env: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: default_host(),
            port: DEFAULT_PORT,
            app_env: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Address the startup path binds to.
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// True when running under a test harness, in which case `main` must not listen.
    pub fn is_test_env(&self) -> bool {
        self.app_env
            .as_deref()
            .is_some_and(|env| env.trim().eq_ignore_ascii_case(TEST_ENV))
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Builds the layered figment: defaults, then the YAML file at `path`,
/// then prefixed env overrides, then the bare `PORT` / `APP_ENV` variables.
pub fn figment(path: &str) -> Figment {
    Figment::from(Serialized::defaults(ServerConfig::default()))
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .merge(Env::raw().only(&["PORT", "APP_ENV"]))
}

/// Load config from the environment, layered over an optional YAML file.
///
/// The file path comes from `APPRENTICE_CONFIG` and defaults to
/// `./config.yaml`; a missing file is not an error.
pub fn load_config() -> Result<ServerConfig, figment::Error> {
    let path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    figment(&path).extract()
}

/// Accepts whatever a port setting happens to contain. Anything that is not
/// an integer in `1..=65535` resolves to [`DEFAULT_PORT`].
fn lenient_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(PortVisitor)
}

fn usable_port(port: Option<u16>) -> u16 {
    port.filter(|p| *p != 0).unwrap_or(DEFAULT_PORT)
}

struct PortVisitor;

impl<'de> Visitor<'de> for PortVisitor {
    type Value = u16;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a TCP port number")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<u16, E> {
        Ok(usable_port(u16::try_from(value).ok()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<u16, E> {
        Ok(usable_port(u16::try_from(value).ok()))
    }

    fn visit_f64<E: de::Error>(self, _value: f64) -> Result<u16, E> {
        Ok(DEFAULT_PORT)
    }

    fn visit_bool<E: de::Error>(self, _value: bool) -> Result<u16, E> {
        Ok(DEFAULT_PORT)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<u16, E> {
        Ok(usable_port(value.trim().parse().ok()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<u16, E> {
        Ok(DEFAULT_PORT)
    }

    fn visit_none<E: de::Error>(self) -> Result<u16, E> {
        Ok(DEFAULT_PORT)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<u16, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

/// Accepts any scalar for the environment name. Env values are typed by
/// figment, so `APP_ENV=1` arrives as a number and is kept as `"1"`.
fn lenient_env<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(EnvNameVisitor)
}

struct EnvNameVisitor;

impl<'de> Visitor<'de> for EnvNameVisitor {
    type Value = Option<String>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an environment name")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Some(value.to_string()))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Some(value.to_string()))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(Some(value.to_string()))
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(Some(value.to_string()))
    }

    fn visit_char<E: de::Error>(self, value: char) -> Result<Self::Value, E> {
        Ok(Some(value.to_string()))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(Some(value.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}
