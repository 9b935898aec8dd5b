use serde::Deserialize;

/// Fixed resource footprint of every submitted pipeline run.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    #[serde(default = "workspace_storage_default")]
    pub workspace_storage: String,
    #[serde(default = "ca_bundle_config_map_default")]
    pub ca_bundle_config_map: String,
    #[serde(default = "ca_bundle_key_default")]
    pub ca_bundle_key: String,
    #[serde(default = "ca_bundle_path_default")]
    pub ca_bundle_path: String,
    #[serde(default = "ca_bundle_mode_default")]
    pub ca_bundle_mode: i32,
    #[serde(default = "managed_by_default")]
    pub managed_by: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workspace_storage: workspace_storage_default(),
            ca_bundle_config_map: ca_bundle_config_map_default(),
            ca_bundle_key: ca_bundle_key_default(),
            ca_bundle_path: ca_bundle_path_default(),
            ca_bundle_mode: ca_bundle_mode_default(),
            managed_by: managed_by_default(),
        }
    }
}

fn workspace_storage_default() -> String {
    String::from("500Mi")
}

fn ca_bundle_config_map_default() -> String {
    String::from("openshift-service-ca.crt")
}

fn ca_bundle_key_default() -> String {
    String::from("service-ca.crt")
}

fn ca_bundle_path_default() -> String {
    String::from("ca.crt")
}

// 0644
fn ca_bundle_mode_default() -> i32 {
    420
}

fn managed_by_default() -> String {
    String::from("build-reconciler")
}
