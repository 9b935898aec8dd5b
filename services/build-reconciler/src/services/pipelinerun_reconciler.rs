use build_core::{
    builders::build_pipeline_run,
    configs::PipelineConfig,
    crds::{BuildResource, BuildStatus, PipelineRun},
    formatters::{STAGE_LABEL, format_run_name},
    models::{ConditionStatus, Stage},
    transitions::{
        record_create_failed, record_lookup_failed, record_lookup_succeeded, record_run_created,
        record_run_failed, record_run_observed, record_run_succeeded,
    },
};
use kube::ResourceExt;
use tracing::{debug, error, info, warn};

use crate::services::traits::PipelineExecutor;

/// Where a stage stands after one reconcile pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Submitted or still executing.
    Running,
    Succeeded,
    Failed,
    /// A transient error was recorded; retry on the next cycle.
    Aborted,
}

/// Drives the single external run backing one stage of a build resource.
pub struct PipelineRunReconciler<E> {
    executor: E,
    config: PipelineConfig,
}

impl<E: PipelineExecutor> PipelineRunReconciler<E> {
    pub fn new(executor: E, config: PipelineConfig) -> Self {
        Self { executor, config }
    }

    /// Creates the stage's run when missing, otherwise translates its reported
    /// state into `status`. Only `status` is mutated; persisting it is up to
    /// the caller.
    #[tracing::instrument("reconcile_stage", skip_all, fields(stage = %stage))]
    pub async fn reconcile<K: BuildResource>(
        &self,
        resource: &K,
        namespace: &str,
        status: &mut BuildStatus,
        stage: Stage,
    ) -> StageOutcome {
        let run_name = format_run_name(K::PREFIX, &resource.name_any(), stage);
        let generation = resource.meta().generation;

        let existing = match self.executor.get(namespace, &run_name).await {
            Ok(existing) => {
                record_lookup_succeeded(status, stage);
                existing
            }
            Err(e) => {
                warn!(run = %run_name, error = %e, "⚠️ PipelineRun lookup failed");
                record_lookup_failed(status, stage, generation, &e.to_string());
                return StageOutcome::Aborted;
            }
        };

        match existing {
            Some(run) => {
                record_run_observed(status, stage);
                status.ensure_pipeline_result(stage, &run_name);
                observe_run(status, &run, stage, generation)
            }
            None => match status.pipeline_result(stage).map(|p| p.ready) {
                // finished earlier and cleaned up since; never resubmit
                Some(ConditionStatus::True) => StageOutcome::Succeeded,
                Some(ConditionStatus::False) => StageOutcome::Failed,
                _ => self.submit(resource, status, stage, &run_name).await,
            },
        }
    }

    async fn submit<K: BuildResource>(
        &self,
        resource: &K,
        status: &mut BuildStatus,
        stage: Stage,
        run_name: &str,
    ) -> StageOutcome {
        let generation = resource.meta().generation;
        let run = build_pipeline_run(resource, stage, &self.config);

        match self.executor.create(&run).await {
            Ok(_) => {
                info!(run = %run_name, "🚀 PipelineRun created");
                record_run_created(status, stage, generation);
                status.ensure_pipeline_result(stage, run_name);
                StageOutcome::Running
            }
            Err(e) => {
                error!(run = %run_name, error = %e, "❌ PipelineRun creation failed");
                record_create_failed(status, stage, generation, &e.to_string());
                StageOutcome::Aborted
            }
        }
    }
}

/// Translates the engine-reported state of `run` into conditions and the
/// stage's pipeline result.
fn observe_run(
    status: &mut BuildStatus,
    run: &PipelineRun,
    stage: Stage,
    generation: Option<i64>,
) -> StageOutcome {
    if let Some(labeled) = run.labels().get(STAGE_LABEL)
        && labeled != stage.as_str()
    {
        warn!(run = %run.name_any(), label = %labeled, "⚠️ PipelineRun stage label does not match");
    }

    let Some(run_status) = run.status.as_ref() else {
        debug!(run = %run.name_any(), "PipelineRun has no status yet");
        return StageOutcome::Running;
    };

    if run_status.conditions.len() > 1 {
        warn!(
            run = %run.name_any(),
            count = run_status.conditions.len(),
            "⚠️ PipelineRun reported more than one condition, using the first"
        );
    }

    let Some(reported) = run_status.conditions.first() else {
        return StageOutcome::Running;
    };

    let outcome = match (reported.r#type.as_str(), reported.status.as_str()) {
        ("Succeeded", "True") => {
            record_run_succeeded(status, stage, generation);
            StageOutcome::Succeeded
        }
        ("Succeeded", "False") => {
            let message = reported.message.as_deref().unwrap_or("PipelineRun failed");
            record_run_failed(status, stage, generation, message);
            StageOutcome::Failed
        }
        _ => StageOutcome::Running,
    };

    if run_status.completion_time.is_some() {
        let result = status.ensure_pipeline_result(stage, &run.name_any());
        match reported.reason.as_deref() {
            Some("Succeeded") | Some("Completed") => {
                result.ready = ConditionStatus::True;
                if let Some(url) = run_status
                    .pipeline_results
                    .first()
                    .and_then(|r| r.value.as_str())
                {
                    result.url = Some(url.to_string());
                }
            }
            _ => result.ready = ConditionStatus::False,
        }
    }

    outcome
}
