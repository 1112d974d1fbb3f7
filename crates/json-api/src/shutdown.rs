//! Stop signals and graceful drain

use std::{io, time::Duration};

use salvo::server::ServerHandle;
use thiserror::Error;
use tokio::signal;
use tracing::info;

#[derive(Debug, Error)]
pub(crate) enum ShutdownSignalError {
    #[error("failed to listen for Ctrl+C: {0}")]
    Interrupt(#[source] io::Error),

    #[cfg(unix)]
    #[error("failed to listen for SIGTERM: {0}")]
    Terminate(#[source] io::Error),
}

#[derive(Debug, Clone, Copy)]
enum StopSignal {
    Interrupt,
    Terminate,
}

impl StopSignal {
    fn name(self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        }
    }
}

async fn interrupt() -> Result<StopSignal, ShutdownSignalError> {
    signal::ctrl_c()
        .await
        .map_err(ShutdownSignalError::Interrupt)?;

    Ok(StopSignal::Interrupt)
}

#[cfg(unix)]
async fn terminate() -> Result<StopSignal, ShutdownSignalError> {
    signal::unix::signal(signal::unix::SignalKind::terminate())
        .map_err(ShutdownSignalError::Terminate)?
        .recv()
        .await;

    Ok(StopSignal::Terminate)
}

// Only Ctrl+C stops the server off unix.
#[cfg(not(unix))]
async fn terminate() -> Result<StopSignal, ShutdownSignalError> {
    std::future::pending().await
}

/// Wait for a stop signal, then give in-flight requests `grace` to finish.
pub(crate) async fn listen(
    handle: ServerHandle,
    grace: Option<Duration>,
) -> Result<(), ShutdownSignalError> {
    let received = tokio::select! {
        signal = interrupt() => signal?,
        signal = terminate() => signal?,
    };

    match grace {
        Some(grace) => info!(
            signal = received.name(),
            grace_seconds = grace.as_secs(),
            "stop signal received, draining requests"
        ),
        None => info!(
            signal = received.name(),
            "stop signal received, draining requests without a deadline"
        ),
    }

    handle.stop_graceful(grace);

    Ok(())
}
