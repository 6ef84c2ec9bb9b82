//! Server configuration.

use std::time::Duration;

/// Signing secret used when none is configured. Development only.
pub const DEFAULT_JWT_SECRET: &str = "watchroom-development-secret";

pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 3000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// HS256 secret for connection credentials
    pub jwt_secret: String,
    /// Bound on every collaborator-store call
    pub store_timeout: Duration,
}

impl ServerConfig {
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
        }
    }
}
