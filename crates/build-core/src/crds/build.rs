use kube::CustomResource;
use serde::{Deserialize, Serialize};

use crate::{
    conditions::{Condition, HasConditions},
    models::{BuildStrategy, ConditionStatus, Phase, Stage},
};

// -----------------------------------------------------------------------------
// CustomNBImage (legacy variant, prepares a repository before building)
// -----------------------------------------------------------------------------
#[derive(CustomResource, Deserialize, Serialize, Clone, Default, Debug)]
#[kube(
    group = "meteor.zone",
    version = "v1alpha1",
    kind = "CustomNBImage",
    plural = "customnbimages",
    shortname = "cnbi",
    namespaced,
    schema = "disabled",
    status = "BuildStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct CustomNBImageSpec {
    #[serde(flatten)]
    pub build: BuildSpec,
}

// -----------------------------------------------------------------------------
// CustomRuntimeEnvironment
// -----------------------------------------------------------------------------
#[derive(CustomResource, Deserialize, Serialize, Clone, Default, Debug)]
#[kube(
    group = "meteor.zone",
    version = "v1alpha1",
    kind = "CustomRuntimeEnvironment",
    plural = "customruntimeenvironments",
    shortname = "cre",
    namespaced,
    schema = "disabled",
    status = "BuildStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct CustomRuntimeEnvironmentSpec {
    #[serde(flatten)]
    pub build: BuildSpec,
}

// -----------------------------------------------------------------------------
// Shared Sub-Types
// -----------------------------------------------------------------------------
#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildSpec {
    #[serde(default)]
    pub build_type: BuildStrategy,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub from_image: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub base_image: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repository: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub git_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secret: Option<ImagePullSecret>,
    #[serde(default)]
    pub runtime_environment: RuntimeEnvironment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub package_versions: Vec<String>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImagePullSecret {
    pub name: String,
}

/// Python runtime to build on. Admission guarantees all three fields are
/// set or none of them is.
#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeEnvironment {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub python_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub os_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub os_version: String,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(default)]
    pub phase: Phase,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub pipelines: Vec<PipelineResult>,
}

impl BuildStatus {
    pub fn pipeline_result(&self, stage: Stage) -> Option<&PipelineResult> {
        self.pipelines.iter().find(|p| p.stage == stage)
    }

    /// Returns the entry for `stage`, adding it the first time the stage is seen.
    pub fn ensure_pipeline_result(&mut self, stage: Stage, run_name: &str) -> &mut PipelineResult {
        let index = match self.pipelines.iter().position(|p| p.stage == stage) {
            Some(index) => index,
            None => {
                self.pipelines.push(PipelineResult {
                    stage,
                    pipeline_run_name: run_name.to_string(),
                    ready: ConditionStatus::Unknown,
                    url: None,
                });
                self.pipelines.len() - 1
            }
        };
        &mut self.pipelines[index]
    }
}

impl HasConditions for BuildStatus {
    fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.conditions
    }
}

/// Per-stage record of the external run and what it produced.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    #[serde(rename = "name")]
    pub stage: Stage,
    pub pipeline_run_name: String,
    pub ready: ConditionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
