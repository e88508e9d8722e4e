//! # Service Bootstrap
//!
//! Builds every capability once at startup and wires them into the
//! coordinator and the web application. Handles are shared by `Arc` for the
//! life of the process.

use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::{AppConfig, ConfigLoader};
use crate::control_plane::{ControlPlane, OpenStackClient};
use crate::error::Result;
use crate::notifications::{self, NotificationSink};
use crate::orchestration::{Coordinator, CoordinatorSettings};
use crate::store::{self, TaskStore};
use crate::web::{create_app, AppState};

/// Running service components
#[derive(Debug)]
pub struct ServiceHandle {
    pub config: AppConfig,
    pub environment: String,
    pub coordinator: Arc<Coordinator>,
    pub app_state: Arc<AppState>,
}

pub struct ServiceBootstrap;

impl ServiceBootstrap {
    /// Load configuration for the detected environment and build the service
    pub async fn bootstrap() -> Result<ServiceHandle> {
        let loader = ConfigLoader::from_environment();
        let config = loader.load()?;
        Self::bootstrap_with_config(config, loader.environment()).await
    }

    /// Build the service from an already-loaded configuration
    pub async fn bootstrap_with_config(
        config: AppConfig,
        environment: &str,
    ) -> Result<ServiceHandle> {
        info!("🔧 BOOTSTRAP: Connecting task store...");
        let task_store: Arc<dyn TaskStore> = store::connect(&config.store).await?;

        let control_plane: Arc<dyn ControlPlane> =
            Arc::new(OpenStackClient::new(config.openstack.clone())?);
        let notifier: Arc<dyn NotificationSink> = notifications::from_config(&config.notifications)?;

        Ok(Self::assemble(
            config,
            environment,
            task_store,
            control_plane,
            notifier,
        ))
    }

    /// Wire pre-built capabilities together
    pub fn assemble(
        config: AppConfig,
        environment: &str,
        task_store: Arc<dyn TaskStore>,
        control_plane: Arc<dyn ControlPlane>,
        notifier: Arc<dyn NotificationSink>,
    ) -> ServiceHandle {
        let settings = CoordinatorSettings::from_config(&config.store, &config.execution);
        let coordinator = Arc::new(Coordinator::new(
            task_store,
            control_plane,
            notifier,
            settings,
        ));
        let app_state = Arc::new(AppState::new(
            Arc::clone(&coordinator),
            environment,
            config.server.request_timeout(),
        ));

        info!(
            environment = environment,
            store = coordinator.store().provider_name(),
            "✅ BOOTSTRAP: Service components ready"
        );

        ServiceHandle {
            config,
            environment: environment.to_string(),
            coordinator,
            app_state,
        }
    }
}

impl ServiceHandle {
    /// Bind and serve until `shutdown` resolves, then drain in-flight requests.
    ///
    /// Execution units already running are not awaited; their records
    /// expire through the store TTL if the process exits first.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(&self.config.server.bind_address).await?;
        let local_addr = listener.local_addr()?;
        let app = create_app(Arc::clone(&self.app_state));

        info!(address = %local_addr, "🚀 SERVER: Listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("✅ SERVER: HTTP server stopped");
        self.shutdown();
        Ok(())
    }

    /// Release the coordinator and with it this handle's share of the task
    /// store. Running execution units keep their own handles until they finish.
    pub fn shutdown(self) {
        let provider = self.coordinator.store().provider_name();
        let in_flight = self.coordinator.active_units();
        if in_flight > 0 {
            info!(
                active_units = in_flight,
                "Shutting down with execution units still running"
            );
        }

        let ServiceHandle {
            coordinator,
            app_state,
            ..
        } = self;
        drop(app_state);
        drop(coordinator);
        info!(store = provider, "🛑 BOOTSTRAP: Task store handle released");
    }
}
