//! Request logging settings fixed at startup.

use std::{sync::OnceLock, time::Duration};

use tracing::warn;

use crate::config::ServerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct RequestSettings {
    pub(super) slow_request_threshold: Duration,
    pub(super) propagate_parent: bool,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            slow_request_threshold: Duration::from_secs(1),
            propagate_parent: false,
        }
    }
}

impl RequestSettings {
    fn from_config(config: &ServerConfig) -> Self {
        Self {
            slow_request_threshold: Duration::from_millis(
                config.logging.slow_request_threshold_ms,
            ),
            propagate_parent: config.telemetry.propagates_parent(),
        }
    }
}

static REQUEST_SETTINGS: OnceLock<RequestSettings> = OnceLock::new();

pub(super) fn apply(config: &ServerConfig) {
    if REQUEST_SETTINGS
        .set(RequestSettings::from_config(config))
        .is_err()
    {
        warn!("request settings already applied, keeping the first");
    }
}

/// Settings applied at startup, or the defaults before then.
pub(super) fn current() -> RequestSettings {
    REQUEST_SETTINGS.get().copied().unwrap_or_default()
}
