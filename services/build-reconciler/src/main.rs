pub mod app;
pub mod config;
pub mod error;
pub mod implementations;
pub mod services;
pub mod utilities;

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::anyhow;
use build_core::crds::{CustomNBImage, CustomRuntimeEnvironment};
use factory::factories::{kubernetes::Kubernetes, observability::Observability};
use http_common::handlers::HealthState;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use utility::{load_env::load_env, shutdown_signal::shutdown_signal};

use crate::{
    config::Config,
    error::AppError,
    services::controller::{Context, StartupGate, start_controller},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install rustls crypto provider"))?;

    // These are baked at COMPILE time
    let cargo_manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let cargo_crate_name = env!("CARGO_CRATE_NAME");
    let cargo_pkg_name = env!("CARGO_PKG_NAME");
    let cargo_pkg_version = env!("CARGO_PKG_VERSION");

    load_env(&cargo_manifest_dir);

    let path = env::var("CONFIG").unwrap_or("config.json".to_string());
    let cfg = Config::init(cargo_manifest_dir.join(path)).await?;

    let _guard = Observability::init(cargo_crate_name, cargo_pkg_version, &cfg.observability).await?;

    let kubernetes = Kubernetes::new(&cfg.kubernetes).await?;
    let health = HealthState::new(cargo_pkg_name, cargo_pkg_version);
    let controllers = [
        cfg.controller.custom_nb_image,
        cfg.controller.custom_runtime_environment,
    ]
    .into_iter()
    .filter(|enabled| *enabled)
    .count();
    let startup = StartupGate::new(health.clone(), controllers);
    let ctx = Arc::new(Context::new(kubernetes.client.clone(), &cfg, startup));

    let mut set = JoinSet::new();

    if cfg.controller.custom_nb_image {
        set.spawn(start_controller::<CustomNBImage>(
            kubernetes.client.clone(),
            ctx.clone(),
        ));
    }
    if cfg.controller.custom_runtime_environment {
        set.spawn(start_controller::<CustomRuntimeEnvironment>(
            kubernetes.client.clone(),
            ctx.clone(),
        ));
    }
    if set.is_empty() {
        warn!("⚠️ No controller enabled, only serving probes");
    }
    set.spawn(start_health_server(health.clone(), cfg.server_address));

    info!("✅ All background tasks started");

    // Unified shutdown logic
    tokio::select! {
        _ = shutdown_signal() => {
            info!("🛑 Shutdown signal received");
            set.shutdown().await;
        }
        Some(result) = set.join_next() => {
            match result {
                Ok(Ok(())) => error!("A background task exited unexpectedly!"),
                Ok(Err(e)) => error!(error = %e, "❌ Task failed"),
                Err(e) => error!(error = %e, "❌ Task panic"),
            }
            set.shutdown().await;
        }
    }

    info!("👋 Shutting down gracefully...");

    Ok(())
}

async fn start_health_server(health: HealthState, addr: SocketAddr) -> Result<(), AppError> {
    let name = health.service;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("🚀 {} probes listening at {}", name, addr);
    axum::serve(listener, app::app(health))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
