//! Server configuration module

use clap::Parser;
use tienda_app::context::AppSettings;

use crate::config::{
    auth::AuthConfig,
    db::DatabaseConfig,
    logging::LoggingConfig,
    server::ServerRuntimeConfig,
    telemetry::TelemetryConfig,
};

pub(crate) mod auth;
pub(crate) mod db;
pub(crate) mod logging;
pub(crate) mod server;
pub(crate) mod telemetry;

/// Tienda JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "tienda-json", about = "Tienda JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Trace export settings.
    #[command(flatten)]
    pub telemetry: TelemetryConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Session token settings.
    #[command(flatten)]
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }

    /// Settings for building the application services.
    #[must_use]
    pub fn app_settings(&self) -> AppSettings {
        AppSettings {
            database_url: self.database.database_url.clone(),
            run_migrations: self.database.run_migrations,
            jwt_secret: self.auth.secret(),
            jwt_ttl_seconds: self.auth.jwt_ttl_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_minimal_arguments_with_defaults() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "tienda-json",
            "--database-url",
            "postgresql://localhost/tienda",
            "--jwt-secret",
            "secret",
        ])?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8698");
        assert_eq!(config.server.shutdown_grace(), Some(Duration::from_secs(30)));
        assert_eq!(config.auth.jwt_ttl_seconds, 3600);
        assert!(!config.database.run_migrations);
        assert!(!config.telemetry.otel_enabled, "trace export is opt-in");
        assert!(!config.telemetry.propagates_parent());

        let settings = config.app_settings();

        assert_eq!(settings.database_url, "postgresql://localhost/tienda");
        assert!(!settings.jwt_secret.is_empty());

        Ok(())
    }

    #[test]
    fn parent_propagation_requires_trace_export() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "tienda-json",
            "--database-url",
            "postgresql://localhost/tienda",
            "--jwt-secret",
            "secret",
            "--otel-parent-propagation-enabled",
        ])?;

        assert!(
            !config.telemetry.propagates_parent(),
            "propagation without export should stay off"
        );

        Ok(())
    }

    #[test]
    fn out_of_range_sample_ratio_is_an_error() {
        let result = ServerConfig::try_parse_from([
            "tienda-json",
            "--database-url",
            "postgresql://localhost/tienda",
            "--jwt-secret",
            "secret",
            "--otel-trace-sample-ratio",
            "2",
        ]);

        assert!(result.is_err(), "expected sample ratio above one to fail");
    }

    #[test]
    fn missing_jwt_secret_is_an_error() {
        let result = ServerConfig::try_parse_from([
            "tienda-json",
            "--database-url",
            "postgresql://localhost/tienda",
        ]);

        assert!(result.is_err(), "expected missing JWT secret to fail");
    }
}
