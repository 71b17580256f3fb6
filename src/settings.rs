//! Runtime settings.
//!
//! Values are layered: built-in defaults, then an optional `roster.toml` in the
//! working directory, then `ROSTER_*` environment variables with `__` between
//! nested keys (`ROSTER_SERVER__BIND=0.0.0.0:8080`).

use std::net::SocketAddr;

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct App {
    /// Tracing level applied to this crate when `RUST_LOG` is unset.
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub bind: SocketAddr,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub inactivity_hours: i64,
    pub secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub database: Database,
    pub session: Session,
}

impl Settings {
    /// Reads defaults, `roster.toml` and the environment.
    pub fn new() -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::with_name("roster").required(false))
            .add_source(
                Environment::with_prefix("ROSTER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults only, ignoring files and the environment.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::defaults()?.build()?.try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.bind", "127.0.0.1:5000")?
            .set_default("database.url", "sqlite://data.sqlite?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("session.inactivity_hours", 24)?
            .set_default("session.secure", false)
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    #[test]
    fn defaults_deserialize() {
        let settings = Settings::with_defaults().unwrap();

        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.bind, "127.0.0.1:5000".parse().unwrap());
        assert_eq!(settings.database.url, "sqlite://data.sqlite?mode=rwc");
        assert_eq!(settings.database.max_connections, 10);
        assert_eq!(settings.session.inactivity_hours, 24);
        assert!(!settings.session.secure);
    }

    #[test]
    fn file_overrides_defaults() {
        let toml = r#"
            [server]
            bind = "0.0.0.0:8080"

            [session]
            secure = true
        "#;
        let settings: Settings = Settings::defaults()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.server.bind.port(), 8080);
        assert!(settings.session.secure);
        assert_eq!(settings.session.inactivity_hours, 24);
    }

    #[test]
    fn malformed_bind_is_rejected() {
        let result = Settings::defaults()
            .unwrap()
            .set_override("server.bind", "not an address")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize::<Settings>();

        assert!(result.is_err());
    }
}
