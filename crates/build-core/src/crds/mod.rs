pub mod build;
pub mod pipeline_run;

use std::fmt::Debug;

use k8s_openapi::NamespaceResourceScope;
use kube::Resource;
use serde::{Serialize, de::DeserializeOwned};

pub use build::{
    BuildSpec, BuildStatus, CustomNBImage, CustomNBImageSpec, CustomRuntimeEnvironment,
    CustomRuntimeEnvironmentSpec, ImagePullSecret, PipelineResult, RuntimeEnvironment,
};
pub use pipeline_run::{
    ConfigMapWorkspace, Param, ParamValue, PipelineRef, PipelineRun, PipelineRunSpec,
    PipelineRunStatus, RunCondition, RunResult, WorkspaceBinding,
};

use crate::{
    conditions::{Condition, HasConditions},
    models::Stage,
};

/// A namespaced kind whose image is produced by one or more pipeline stages.
pub trait BuildResource:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + HasConditions
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Short kind name used in run names, pipeline references and labels.
    const PREFIX: &'static str;

    fn build_spec(&self) -> &BuildSpec;
    fn build_status(&self) -> Option<&BuildStatus>;
    fn set_build_status(&mut self, status: BuildStatus);

    /// Stages in execution order. A stage only runs once the previous one succeeded.
    fn stages(&self) -> Vec<Stage>;
}

impl BuildResource for CustomNBImage {
    const PREFIX: &'static str = "cnbi";

    fn build_spec(&self) -> &BuildSpec {
        &self.spec.build
    }

    fn build_status(&self) -> Option<&BuildStatus> {
        self.status.as_ref()
    }

    fn set_build_status(&mut self, status: BuildStatus) {
        self.status = Some(status);
    }

    fn stages(&self) -> Vec<Stage> {
        vec![
            Stage::Prepare,
            Stage::for_strategy(self.spec.build.build_type),
        ]
    }
}

impl HasConditions for CustomNBImage {
    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.status.get_or_insert_with(BuildStatus::default).conditions
    }
}

impl BuildResource for CustomRuntimeEnvironment {
    const PREFIX: &'static str = "cre";

    fn build_spec(&self) -> &BuildSpec {
        &self.spec.build
    }

    fn build_status(&self) -> Option<&BuildStatus> {
        self.status.as_ref()
    }

    fn set_build_status(&mut self, status: BuildStatus) {
        self.status = Some(status);
    }

    fn stages(&self) -> Vec<Stage> {
        vec![Stage::for_strategy(self.spec.build.build_type)]
    }
}

impl HasConditions for CustomRuntimeEnvironment {
    fn conditions(&self) -> &[Condition] {
        self.status
            .as_ref()
            .map(|s| s.conditions.as_slice())
            .unwrap_or_default()
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.status.get_or_insert_with(BuildStatus::default).conditions
    }
}
