use crate::{
    conditions::{Condition, find_condition, is_condition_true},
    crds::BuildSpec,
    models::{ConditionType, Phase, Stage},
};

/// Derives the phase of a build resource from its conditions. Pure and
/// independent of the order of the list.
pub fn aggregate_phase(conditions: &[Condition], spec: &BuildSpec) -> Phase {
    if conditions.is_empty() {
        return Phase::Pending;
    }

    if conditions
        .iter()
        .any(|c| c.is_true() && ConditionType::FAILURES.contains(&c.r#type))
    {
        return Phase::Failed;
    }

    if is_condition_true(conditions, ConditionType::PipelineRunCompleted) {
        let succeeded = conditions
            .iter()
            .any(|c| c.is_true() && ConditionType::SUCCESSES.contains(&c.r#type));

        return if succeeded {
            Phase::Succeeded
        } else {
            Phase::Failed
        };
    }

    if let Some(created) = find_condition(conditions, ConditionType::PipelineRunCreated)
        && created.is_true()
    {
        return running_stage(created, spec).running_phase();
    }

    if is_condition_true(conditions, ConditionType::PreparingImageBuild) {
        return Phase::Preparing;
    }

    Phase::Pending
}

fn running_stage(created: &Condition, spec: &BuildSpec) -> Stage {
    created
        .stage
        .or_else(|| Stage::from_reason_prefix(&created.reason))
        .unwrap_or_else(|| Stage::for_strategy(spec.build_type))
}
