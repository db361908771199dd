//! Server configuration loaded from environment variables.

use std::net::SocketAddr;

use thiserror::Error;
use uuid::Uuid;

/// Owner used when a request carries no `x-user-id` header.
pub const DEFAULT_OWNER_ID: Uuid = Uuid::from_u128(1);

#[derive(Debug, Error)]
#[error("invalid value for {var}: {value:?}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
}

/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub app_name: String,
    pub environment: String,
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub default_owner_id: Uuid,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            app_name: "workflowd".into(),
            environment: "development".into(),
            host: "0.0.0.0".into(),
            port: 8000,
            cors_origins: vec!["http://localhost:3000".into()],
            default_owner_id: DEFAULT_OWNER_ID,
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

/// Split a comma-separated origin list. `*` is rejected because the CORS
/// layer allows credentials.
fn parse_cors_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    let origins: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if origins.iter().any(|o| o == "*") {
        return Err(ConfigError { var: "CORS_ORIGINS", value: raw.to_owned() });
    }
    Ok(origins)
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default                                  |
    /// |--------------------|------------------------------------------|
    /// | `APP_NAME`         | `workflowd`                              |
    /// | `ENVIRONMENT`      | `development`                            |
    /// | `HOST`             | `0.0.0.0`                                |
    /// | `PORT`             | `8000`                                   |
    /// | `CORS_ORIGINS`     | `http://localhost:3000`                  |
    /// | `DEFAULT_OWNER_ID` | `00000000-0000-0000-0000-000000000001`   |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = var_or("PORT", "8000");
        let port = port.parse().map_err(|_| ConfigError { var: "PORT", value: port })?;

        let owner = var_or("DEFAULT_OWNER_ID", &defaults.default_owner_id.to_string());
        let default_owner_id = owner
            .parse()
            .map_err(|_| ConfigError { var: "DEFAULT_OWNER_ID", value: owner })?;

        let cors_origins = parse_cors_origins(&var_or("CORS_ORIGINS", "http://localhost:3000"))?;

        Ok(Self {
            app_name: var_or("APP_NAME", &defaults.app_name),
            environment: var_or("ENVIRONMENT", &defaults.environment),
            host: var_or("HOST", &defaults.host),
            port,
            cors_origins,
            default_owner_id,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError { var: "HOST", value: addr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_local_development() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.default_owner_id.to_string(), "00000000-0000-0000-0000-000000000001");
        assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:8000");
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let origins = parse_cors_origins("http://a.test, http://b.test,,").unwrap();
        assert_eq!(origins, ["http://a.test", "http://b.test"]);
    }

    #[test]
    fn wildcard_cors_origin_is_rejected() {
        let err = parse_cors_origins("http://a.test,*").unwrap_err();
        assert_eq!(err.var, "CORS_ORIGINS");
    }

    #[test]
    fn bad_host_is_reported() {
        let config = ServerConfig { host: "not a host".into(), ..Default::default() };
        let err = config.bind_addr().unwrap_err();
        assert_eq!(err.var, "HOST");
    }
}
