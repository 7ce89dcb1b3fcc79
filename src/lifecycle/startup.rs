//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the shared `WatchService` from configuration
//! - Spawn the wallet monitor
//! - Bind and serve the interactive API
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last, so requests only arrive once state exists

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::api;
use crate::config::WatchConfig;
use crate::lifecycle::shutdown::Shutdown;
use crate::notify::NotificationSink;
use crate::service::WatchService;
use crate::tracker::TrackerError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to initialize chain trackers: {0}")]
    Trackers(#[from] TrackerError),

    #[error("failed to bind API listener on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Handles to a started instance.
#[derive(Debug)]
pub struct Running {
    pub service: WatchService,
    /// Bound API address, if the API is enabled.
    pub api_addr: Option<SocketAddr>,
    shutdown: Shutdown,
    tasks: Vec<JoinHandle<()>>,
}

impl Running {
    /// Signal every task and wait for them to finish.
    pub async fn shutdown(self) {
        tracing::info!(tasks = self.tasks.len(), "Shutting down");
        self.shutdown.trigger();
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Task ended abnormally");
            }
        }
    }
}

pub async fn start(
    config: &WatchConfig,
    sink: Arc<dyn NotificationSink>,
) -> Result<Running, StartupError> {
    let service = WatchService::from_config(&config.trackers)?;
    let shutdown = Shutdown::new();
    let mut tasks = Vec::new();

    let monitor = service.monitor(config.monitor.clone(), sink);
    tasks.push(tokio::spawn(monitor.run(shutdown.subscribe())));

    let mut api_addr = None;
    if config.api.enabled {
        let listener = TcpListener::bind(&config.api.bind_address)
            .await
            .map_err(|source| StartupError::Bind {
                address: config.api.bind_address.clone(),
                source,
            })?;
        let addr = listener.local_addr().map_err(|source| StartupError::Bind {
            address: config.api.bind_address.clone(),
            source,
        })?;
        api_addr = Some(addr);

        let app = api::router(service.clone(), &config.api);
        let signalled = shutdown.signalled();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = api::serve(listener, app, signalled).await {
                tracing::error!(error = %e, "API server failed");
            }
        }));
    } else {
        tracing::info!("Interactive API disabled");
    }

    Ok(Running {
        service,
        api_addr,
        shutdown,
        tasks,
    })
}
