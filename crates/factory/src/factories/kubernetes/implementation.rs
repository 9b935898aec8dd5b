use kube::{
    Client, Config,
    config::{KubeConfigOptions, Kubeconfig},
};
use tracing::info;

use crate::factories::kubernetes::{Kubernetes, KubernetesConfig, error::KubernetesError};

impl Kubernetes {
    pub async fn new(config: &KubernetesConfig) -> Result<Self, KubernetesError> {
        let kube_config = if config.in_cluster {
            let kube_config = Config::incluster()?;
            info!("✅ Using in-cluster service account");
            kube_config
        } else if let Some(path) = &config.kubeconfig {
            let kubeconfig = Kubeconfig::read_from(path)?;
            let options = KubeConfigOptions {
                context: config.context.clone(),
                ..Default::default()
            };
            let kube_config = Config::from_custom_kubeconfig(kubeconfig, &options).await?;
            info!(path = %path, "✅ Using kubeconfig file");
            kube_config
        } else {
            let kube_config = Config::infer().await?;
            info!("✅ Using inferred kubeconfig");
            kube_config
        };

        let cluster_url = kube_config.cluster_url.clone();
        let client = Client::try_from(kube_config)?;
        info!(cluster = %cluster_url, "✅ Connected to Kubernetes");

        Ok(Self { client })
    }
}
