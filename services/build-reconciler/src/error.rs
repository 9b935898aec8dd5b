use factory::factories::{
    kubernetes::error::KubernetesError, observability::error::ObservabilityError,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Kube error, {0}")]
    KubeError(#[from] kube::Error),

    #[error("Kubernetes client error, {0}")]
    KubernetesError(#[from] KubernetesError),

    #[error("Observability error, {0}")]
    ObservabilityError(#[from] ObservabilityError),

    #[error("Config error, {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Serde json error")]
    SerdejsonError(#[from] serde_json::Error),

    #[error("IO error, {0}")]
    IoError(#[from] std::io::Error),

    // Optimistic-concurrency rejection (409) of a write
    #[error("Conflict, {0}")]
    Conflict(String),

    #[error("Status update still conflicting after {attempts} attempts")]
    StatusUpdateConflict { attempts: u32 },

    #[error("Missing namespace on {0}")]
    MissingNamespace(String),

    #[error("Internal server error, {0}")]
    InternalServerError(String),
}
