use std::{net::SocketAddr, path::PathBuf};

use build_core::configs::PipelineConfig;
use config::{ConfigBuilder, ConfigError, Environment, File, Source, builder::AsyncState};
use factory::factories::{kubernetes::KubernetesConfig, observability::ObservabilityConfig};
use serde::Deserialize;

use crate::utilities::retry::RetryPolicy;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server_address: SocketAddr,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub kubernetes: KubernetesConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ControllerConfig {
    #[serde(default = "requeue_after_secs_default")]
    pub requeue_after_secs: u64,
    #[serde(default = "error_requeue_secs_default")]
    pub error_requeue_secs: u64,
    #[serde(default = "enabled_default")]
    pub custom_nb_image: bool,
    #[serde(default = "enabled_default")]
    pub custom_runtime_environment: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            requeue_after_secs: requeue_after_secs_default(),
            error_requeue_secs: error_requeue_secs_default(),
            custom_nb_image: enabled_default(),
            custom_runtime_environment: enabled_default(),
        }
    }
}

fn requeue_after_secs_default() -> u64 {
    300
}

fn error_requeue_secs_default() -> u64 {
    30
}

fn enabled_default() -> bool {
    true
}

impl Config {
    pub async fn init(path: PathBuf) -> Result<Self, ConfigError> {
        Self::from_source(File::from(path)).await
    }

    /// `source` overlaid by environment variables, `__` separating sections
    /// (e.g. `RETRY__MAX_ATTEMPTS=3`).
    async fn from_source<T>(source: T) -> Result<Self, ConfigError>
    where
        T: Source + Send + Sync + 'static,
    {
        let cfg = ConfigBuilder::<AsyncState>::default()
            .add_source(source)
            .add_source(
                Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .await?;

        cfg.try_deserialize()
    }
}
