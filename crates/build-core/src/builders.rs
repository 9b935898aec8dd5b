use std::collections::BTreeMap;

use k8s_openapi::{
    api::core::v1::{
        KeyToPath, PersistentVolumeClaim, PersistentVolumeClaimSpec, VolumeResourceRequirements,
    },
    apimachinery::pkg::api::resource::Quantity,
};
use kube::{Resource, ResourceExt, api::ObjectMeta};

use crate::{
    configs::PipelineConfig,
    crds::{
        BuildResource, ConfigMapWorkspace, PipelineRef, PipelineRun, PipelineRunSpec,
        WorkspaceBinding,
    },
    formatters::{
        KIND_LABEL, MANAGED_BY_LABEL, STAGE_LABEL, format_pipeline_ref, format_run_name,
    },
    models::Stage,
    params::build_parameters,
};

/// Desired pipeline run for one stage of a build resource, owned by it.
pub fn build_pipeline_run<K: BuildResource>(
    resource: &K,
    stage: Stage,
    config: &PipelineConfig,
) -> PipelineRun {
    let name = resource.name_any();

    let labels = BTreeMap::from([
        (STAGE_LABEL.to_string(), stage.as_str().to_string()),
        (KIND_LABEL.to_string(), K::PREFIX.to_string()),
        (MANAGED_BY_LABEL.to_string(), config.managed_by.clone()),
    ]);

    let metadata = ObjectMeta {
        name: Some(format_run_name(K::PREFIX, &name, stage)),
        namespace: resource.namespace(),
        labels: Some(labels),
        owner_references: resource.controller_owner_ref(&()).map(|owner| vec![owner]),
        ..Default::default()
    };

    let spec = PipelineRunSpec {
        pipeline_ref: Some(PipelineRef {
            name: format_pipeline_ref(K::PREFIX, stage),
        }),
        params: build_parameters(resource.build_spec(), resource.annotations()),
        workspaces: vec![data_workspace(config), ca_bundle_workspace(config)],
        ..Default::default()
    };

    PipelineRun {
        metadata,
        spec,
        status: None,
    }
}

fn data_workspace(config: &PipelineConfig) -> WorkspaceBinding {
    let requests = BTreeMap::from([(
        "storage".to_string(),
        Quantity(config.workspace_storage.clone()),
    )]);

    WorkspaceBinding {
        name: "data".to_string(),
        volume_claim_template: Some(PersistentVolumeClaim {
            spec: Some(PersistentVolumeClaimSpec {
                access_modes: Some(vec!["ReadWriteOnce".to_string()]),
                resources: Some(VolumeResourceRequirements {
                    requests: Some(requests),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }),
        config_map: None,
    }
}

fn ca_bundle_workspace(config: &PipelineConfig) -> WorkspaceBinding {
    WorkspaceBinding {
        name: "sslcertdir".to_string(),
        volume_claim_template: None,
        config_map: Some(ConfigMapWorkspace {
            name: config.ca_bundle_config_map.clone(),
            items: vec![KeyToPath {
                key: config.ca_bundle_key.clone(),
                path: config.ca_bundle_path.clone(),
                mode: None,
            }],
            default_mode: Some(config.ca_bundle_mode),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        crds::{BuildSpec, CustomRuntimeEnvironment, CustomRuntimeEnvironmentSpec},
        models::BuildStrategy,
        params::NAME_ANNOTATION,
    };

    fn resource() -> CustomRuntimeEnvironment {
        let mut cre = CustomRuntimeEnvironment::new(
            "demo",
            CustomRuntimeEnvironmentSpec {
                build: BuildSpec {
                    build_type: BuildStrategy::ImportImage,
                    from_image: "quay.io/demo:latest".into(),
                    ..Default::default()
                },
            },
        );
        cre.metadata.namespace = Some("aicoe".into());
        cre.metadata.uid = Some("0b8a6f0e-0000-4000-8000-000000000001".into());
        cre.annotations_mut()
            .insert(NAME_ANNOTATION.to_string(), "Demo".to_string());
        cre
    }

    #[test]
    fn test_pipeline_run_shape() {
        let run = build_pipeline_run(&resource(), Stage::Import, &PipelineConfig::default());

        assert_eq!(run.metadata.name.as_deref(), Some("cre-demo-import"));
        assert_eq!(run.metadata.namespace.as_deref(), Some("aicoe"));
        assert_eq!(run.labels().get(STAGE_LABEL).map(String::as_str), Some("import"));
        assert_eq!(run.labels().get(KIND_LABEL).map(String::as_str), Some("cre"));
        assert_eq!(run.spec.pipeline_ref.as_ref().unwrap().name, "cre-import");
        assert_eq!(run.spec.params.len(), 4);

        let owner = &run.metadata.owner_references.as_ref().unwrap()[0];
        assert_eq!(owner.kind, "CustomRuntimeEnvironment");
        assert_eq!(owner.controller, Some(true));
    }

    #[test]
    fn test_pipeline_run_workspaces() {
        let run = build_pipeline_run(&resource(), Stage::Import, &PipelineConfig::default());
        let value = serde_json::to_value(&run.spec.workspaces).unwrap();

        assert_eq!(value[0]["name"], "data");
        assert_eq!(
            value[0]["volumeClaimTemplate"]["spec"]["accessModes"][0],
            "ReadWriteOnce"
        );
        assert_eq!(
            value[0]["volumeClaimTemplate"]["spec"]["resources"]["requests"]["storage"],
            "500Mi"
        );
        assert_eq!(value[1]["name"], "sslcertdir");
        assert_eq!(value[1]["configMap"]["name"], "openshift-service-ca.crt");
        assert_eq!(value[1]["configMap"]["items"][0]["key"], "service-ca.crt");
        assert_eq!(value[1]["configMap"]["items"][0]["path"], "ca.crt");
        assert_eq!(value[1]["configMap"]["defaultMode"], 420);
    }

    #[test]
    fn test_resource_without_uid_has_no_owner() {
        let mut cre = resource();
        cre.metadata.uid = None;

        let run = build_pipeline_run(&cre, Stage::Import, &PipelineConfig::default());

        assert!(run.metadata.owner_references.is_none());
    }
}
