use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::LazyLock;
use std::time::Duration;

/// Path prefix shared by every HTTP route.
pub const API_PREFIX: &str = "/api";

/// Character set and collation used when the database is created on first use.
pub const DB_CHARSET: &str = "utf8mb4";
pub const DB_COLLATION: &str = "utf8mb4_unicode_ci";

/// Process-wide configuration, loaded on first access.
///
/// Panics on first access if the environment holds a value that cannot be
/// parsed (e.g. `PORT=abc`); `main` calls [`Config::load`] first so such
/// errors surface there instead.
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::load().unwrap_or_else(|e| panic!("invalid configuration: {e}"))
});

/// Settings whose environment value is taken as-is.
const STRING_KEYS: [&str; 6] = [
    "db_host",
    "db_user",
    "db_password",
    "db_name",
    "app_env",
    "loglevel",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub db_host: String,
    pub db_user: String,
    pub db_password: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_max_connections: u32,
    /// How long a caller waits for a pooled connection when all are lent out.
    pub db_acquire_timeout_secs: u64,
    pub listen_host: IpAddr,
    pub port: u16,
    pub app_env: String,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_host: "localhost".to_string(),
            db_user: "root".to_string(),
            db_password: String::new(),
            db_port: 3306,
            db_name: "crud_app".to_string(),
            db_max_connections: 10,
            db_acquire_timeout_secs: 24 * 60 * 60,
            listen_host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            app_env: "development".to_string(),
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults overlaid with raw environment variables (`DB_HOST`, `PORT`, ...).
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    /// Numeric and address keys go through figment's value parsing; string
    /// keys are merged verbatim so values like `007` or `2024` stay text.
    /// `NODE_ENV` is honoured when `APP_ENV` is unset.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default())).merge(
            Env::raw().only(&[
                "db_port",
                "db_max_connections",
                "db_acquire_timeout_secs",
                "listen_host",
                "port",
            ]),
        );
        if let Ok(node_env) = std::env::var("NODE_ENV") {
            figment = figment.merge(Serialized::default("app_env", node_env));
        }
        for key in STRING_KEYS {
            if let Ok(value) = std::env::var(key.to_ascii_uppercase()) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }
        figment
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_host, self.port)
    }

    pub fn database(&self) -> DatabaseSettings {
        DatabaseSettings {
            host: self.db_host.clone(),
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            port: self.db_port,
            name: self.db_name.clone(),
            max_connections: self.db_max_connections,
            acquire_timeout: Duration::from_secs(self.db_acquire_timeout_secs),
        }
    }
}

/// Connection parameters handed to the storage layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseSettings {
    pub host: String,
    pub user: String,
    pub password: String,
    pub port: u16,
    pub name: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert_eq!(cfg.db_host, "localhost");
        assert_eq!(cfg.db_user, "root");
        assert_eq!(cfg.db_password, "");
        assert_eq!(cfg.db_port, 3306);
        assert_eq!(cfg.db_name, "crud_app");
        assert_eq!(cfg.db_max_connections, 10);
        assert_eq!(cfg.port, 5000);
        assert!(!cfg.is_production());
        assert_eq!(cfg.listen_addr().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn environment_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("DB_HOST", "db.internal");
            jail.set_env("DB_PORT", "3307");
            jail.set_env("DB_NAME", "inventory");
            jail.set_env("PORT", "8080");
            jail.set_env("LISTEN_HOST", "0.0.0.0");
            jail.set_env("APP_ENV", "Production");

            let cfg = Config::load()?;
            assert_eq!(cfg.db_host, "db.internal");
            assert_eq!(cfg.db_port, 3307);
            assert_eq!(cfg.db_name, "inventory");
            assert_eq!(cfg.port, 8080);
            assert!(cfg.is_production());
            assert_eq!(cfg.listen_addr().to_string(), "0.0.0.0:8080");
            Ok(())
        });
    }

    #[test]
    fn numeric_looking_strings_are_kept_verbatim() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("DB_PASSWORD", "007");
            jail.set_env("DB_NAME", "2024");
            jail.set_env("DB_USER", "42");

            let cfg = Config::load()?;
            assert_eq!(cfg.db_password, "007");
            assert_eq!(cfg.db_name, "2024");
            assert_eq!(cfg.db_user, "42");
            assert_eq!(cfg.database().password, "007");
            Ok(())
        });
    }

    #[test]
    fn node_env_is_a_fallback_for_app_env() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("NODE_ENV", "production");
            assert!(Config::load()?.is_production());

            jail.set_env("APP_ENV", "development");
            assert!(!Config::load()?.is_production());
            Ok(())
        });
    }

    #[test]
    fn malformed_port_is_rejected() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env("DB_PORT", "not-a-port");
            assert!(Config::load().is_err());
            Ok(())
        });
    }

    #[test]
    fn database_settings_carry_pool_limits() {
        let db = Config::default().database();
        assert_eq!(db.max_connections, 10);
        assert_eq!(db.acquire_timeout, Duration::from_secs(86_400));
        assert_eq!(db.name, "crud_app");
    }
}
