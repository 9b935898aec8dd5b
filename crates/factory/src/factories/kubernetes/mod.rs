pub mod error;
pub mod implementation;

use kube::Client;
use serde::Deserialize;

#[derive(Clone)]
pub struct Kubernetes {
    pub client: Client,
}

/// Where the controller finds its cluster credentials.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct KubernetesConfig {
    /// Use the pod's service account instead of a kubeconfig.
    #[serde(default)]
    pub in_cluster: bool,
    /// Explicit kubeconfig path; when absent the usual inference applies.
    pub kubeconfig: Option<String>,
    /// Kubeconfig context to select, defaults to the current one.
    pub context: Option<String>,
}
