//! Condition writes for each observable event of a stage's pipeline run.
//!
//! Every function is idempotent: replaying an event against a status that
//! already reflects it changes nothing. Transient errors are owned by the
//! stage that raised them and keep their first timestamp while they persist.

use crate::{
    conditions::{Condition, HasConditions},
    formatters::format_created_reason,
    models::{ConditionStatus, ConditionType, Stage},
};

pub const REASON_CREATE_FAILED: &str = "PipelineRunCreateFailed";
pub const REASON_GENERIC_ERROR: &str = "PipelineRunGenericError";
pub const REASON_COMPLETED: &str = "PipelineRunCompleted";

fn condition(
    r#type: ConditionType,
    status: ConditionStatus,
    reason: &str,
    message: impl Into<String>,
    stage: Stage,
    generation: Option<i64>,
) -> Condition {
    Condition::new(r#type, status, reason, message)
        .for_stage(stage)
        .observed(generation)
}

/// Drops a transient error of `r#type` unless another stage raised it.
fn clear_error<C: HasConditions>(target: &mut C, r#type: ConditionType, stage: Stage) {
    let owned = target
        .find_condition(r#type.clone())
        .is_some_and(|c| c.stage.is_none_or(|raised_by| raised_by == stage));
    if owned {
        target.remove_condition(r#type);
    }
}

pub fn record_run_created<C: HasConditions>(target: &mut C, stage: Stage, generation: Option<i64>) {
    clear_error(target, ConditionType::ErrorPipelineRunCreate, stage);

    let r#type = match stage {
        Stage::Prepare => ConditionType::PreparingImageBuild,
        _ => ConditionType::PipelineRunCreated,
    };
    target.set_condition(condition(
        r#type,
        ConditionStatus::True,
        &format_created_reason(stage),
        format!("{} PipelineRun created successfully", stage),
        stage,
        generation,
    ));
}

pub fn record_create_failed<C: HasConditions>(
    target: &mut C,
    stage: Stage,
    generation: Option<i64>,
    error: &str,
) {
    if target.contains_condition(REASON_CREATE_FAILED) {
        return;
    }
    target.set_condition(condition(
        ConditionType::ErrorPipelineRunCreate,
        ConditionStatus::True,
        REASON_CREATE_FAILED,
        error,
        stage,
        generation,
    ));
}

pub fn record_lookup_failed<C: HasConditions>(
    target: &mut C,
    stage: Stage,
    generation: Option<i64>,
    error: &str,
) {
    if target.contains_condition(REASON_GENERIC_ERROR) {
        return;
    }
    target.set_condition(condition(
        ConditionType::GenericPipelineError,
        ConditionStatus::True,
        REASON_GENERIC_ERROR,
        error,
        stage,
        generation,
    ));
}

pub fn record_lookup_succeeded<C: HasConditions>(target: &mut C, stage: Stage) {
    clear_error(target, ConditionType::GenericPipelineError, stage);
}

/// The stage's run exists, whatever the outcome of an earlier create call.
pub fn record_run_observed<C: HasConditions>(target: &mut C, stage: Stage) {
    clear_error(target, ConditionType::ErrorPipelineRunCreate, stage);
}

pub fn record_run_succeeded<C: HasConditions>(
    target: &mut C,
    stage: Stage,
    generation: Option<i64>,
) {
    let (r#type, reason, message) = match stage {
        Stage::Prepare => {
            target.set_condition(condition(
                ConditionType::PreparingImageBuild,
                ConditionStatus::False,
                "ImageBuildPrepared",
                "prepare PipelineRun completed, the image build can start",
                stage,
                generation,
            ));
            return;
        }
        Stage::Import => (
            ConditionType::ImageImportReady,
            "ImageImportReady",
            "Import succeeded, the image is ready to be used",
        ),
        Stage::PackageList => (
            ConditionType::PackageListBuildCompleted,
            "PackageListBuildCompleted",
            "Package list build succeeded, the image is ready to be used",
        ),
        Stage::GitRepo => (
            ConditionType::GitRepositoryBuildCompleted,
            "GitRepositoryBuildCompleted",
            "Git repository build succeeded, the image is ready to be used",
        ),
    };

    record_completed(target, stage, generation);
    target.set_condition(condition(
        r#type,
        ConditionStatus::True,
        reason,
        message,
        stage,
        generation,
    ));
}

pub fn record_run_failed<C: HasConditions>(
    target: &mut C,
    stage: Stage,
    generation: Option<i64>,
    message: &str,
) {
    let (r#type, status, reason) = match stage {
        Stage::Prepare => {
            target.set_condition(condition(
                ConditionType::PreparingImageBuild,
                ConditionStatus::False,
                "ImageBuildPreparationFailed",
                message,
                stage,
                generation,
            ));
            target.set_condition(condition(
                ConditionType::ErrorPreparingImageBuild,
                ConditionStatus::True,
                "ImageBuildPreparationFailed",
                message,
                stage,
                generation,
            ));
            return;
        }
        Stage::Import => (
            ConditionType::ImageImportReady,
            ConditionStatus::False,
            "ImageImportNotReady",
        ),
        Stage::PackageList => (
            ConditionType::PackageListBuildCompleted,
            ConditionStatus::False,
            "PackageListBuildFailed",
        ),
        Stage::GitRepo => (
            ConditionType::ErrorBuildingImage,
            ConditionStatus::True,
            "GitRepositoryBuildFailed",
        ),
    };

    record_completed(target, stage, generation);
    target.set_condition(condition(r#type, status, reason, message, stage, generation));
}

fn record_completed<C: HasConditions>(target: &mut C, stage: Stage, generation: Option<i64>) {
    target.remove_condition(ConditionType::PipelineRunCreated);
    target.set_condition(condition(
        ConditionType::PipelineRunCompleted,
        ConditionStatus::True,
        REASON_COMPLETED,
        format!("{} PipelineRun completed", stage),
        stage,
        generation,
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        crds::{BuildSpec, BuildStatus},
        determiners::aggregate_phase,
        models::{BuildStrategy, Phase},
    };

    fn phase(status: &BuildStatus, strategy: BuildStrategy) -> Phase {
        let spec = BuildSpec {
            build_type: strategy,
            ..Default::default()
        };
        aggregate_phase(&status.conditions, &spec)
    }

    #[test]
    fn test_import_lifecycle() {
        let mut status = BuildStatus::default();

        record_run_created(&mut status, Stage::Import, Some(1));
        assert_eq!(phase(&status, BuildStrategy::ImportImage), Phase::Importing);
        assert!(status.contains_condition("ImportPipelineRunCreated"));

        record_run_succeeded(&mut status, Stage::Import, Some(1));
        assert_eq!(phase(&status, BuildStrategy::ImportImage), Phase::Succeeded);
        assert!(status.find_condition(ConditionType::PipelineRunCreated).is_none());

        let snapshot = status.clone();
        record_run_succeeded(&mut status, Stage::Import, Some(1));
        assert_eq!(status, snapshot);
    }

    #[test]
    fn test_failed_runs_are_failed_for_every_stage() {
        for (stage, strategy) in [
            (Stage::Import, BuildStrategy::ImportImage),
            (Stage::PackageList, BuildStrategy::PackageList),
            (Stage::GitRepo, BuildStrategy::GitRepository),
            (Stage::Prepare, BuildStrategy::ImportImage),
        ] {
            let mut status = BuildStatus::default();
            record_run_created(&mut status, stage, None);
            assert_eq!(phase(&status, strategy), stage.running_phase());

            record_run_failed(&mut status, stage, None, "task build failed");
            assert_eq!(phase(&status, strategy), Phase::Failed, "stage {stage}");
        }
    }

    #[test]
    fn test_gitrepo_failure_sets_error_building_image() {
        let mut status = BuildStatus::default();

        record_run_failed(&mut status, Stage::GitRepo, Some(2), "clone failed");

        let error = status.find_condition(ConditionType::ErrorBuildingImage).unwrap();
        assert!(error.is_true());
        assert_eq!(error.message, "clone failed");
        assert_eq!(error.observed_generation, Some(2));
    }

    #[test]
    fn test_prepare_success_leaves_pending_until_next_stage() {
        let mut status = BuildStatus::default();

        record_run_created(&mut status, Stage::Prepare, None);
        record_run_succeeded(&mut status, Stage::Prepare, None);
        assert_eq!(phase(&status, BuildStrategy::ImportImage), Phase::Pending);

        record_run_created(&mut status, Stage::Import, None);
        assert_eq!(phase(&status, BuildStrategy::ImportImage), Phase::Importing);
    }

    #[test]
    fn test_transient_errors_clear_on_recovery() {
        let mut status = BuildStatus::default();

        record_create_failed(&mut status, Stage::Import, None, "admission webhook denied");
        record_lookup_failed(&mut status, Stage::Import, None, "connection refused");
        assert_eq!(phase(&status, BuildStrategy::ImportImage), Phase::Failed);

        record_lookup_succeeded(&mut status, Stage::Import);
        record_run_created(&mut status, Stage::Import, None);
        assert_eq!(phase(&status, BuildStrategy::ImportImage), Phase::Importing);
    }

    #[test]
    fn test_errors_of_another_stage_are_kept() {
        let mut status = BuildStatus::default();

        record_lookup_failed(&mut status, Stage::Import, None, "connection refused");
        record_create_failed(&mut status, Stage::Import, None, "quota exceeded");
        record_lookup_succeeded(&mut status, Stage::Prepare);
        record_run_observed(&mut status, Stage::Prepare);

        assert!(status.find_condition(ConditionType::GenericPipelineError).is_some());
        assert!(status.find_condition(ConditionType::ErrorPipelineRunCreate).is_some());

        record_run_observed(&mut status, Stage::Import);
        assert!(status.find_condition(ConditionType::ErrorPipelineRunCreate).is_none());
    }

    #[test]
    fn test_repeated_error_keeps_its_first_timestamp() {
        let mut status = BuildStatus::default();
        record_lookup_failed(&mut status, Stage::Import, Some(1), "dial tcp 10.0.0.1:443");
        let first = status
            .find_condition(ConditionType::GenericPipelineError)
            .unwrap()
            .clone();

        let mut aged = first.clone();
        aged.last_transition_time -= chrono::Duration::minutes(5);
        status.conditions = vec![aged.clone()];
        record_lookup_failed(&mut status, Stage::Import, Some(1), "dial tcp 10.0.0.2:443");

        assert_eq!(status.conditions, vec![aged]);
    }
}
