use crate::models::Stage;

pub const STAGE_LABEL: &str = "meteor.zone/stage";
pub const KIND_LABEL: &str = "meteor.zone/kind";
pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";

/// generate run name like `{prefix}-{name}-{stage}`
pub fn format_run_name(prefix: &str, name: &str, stage: Stage) -> String {
    format!("{}-{}-{}", prefix, name, stage.as_str())
}

/// generate pipeline reference like `{prefix}-{stage}`
pub fn format_pipeline_ref(prefix: &str, stage: Stage) -> String {
    format!("{}-{}", prefix, stage.as_str())
}

pub fn format_created_reason(stage: Stage) -> String {
    format!("{}PipelineRunCreated", stage.reason_prefix())
}
