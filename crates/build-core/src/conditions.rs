use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ConditionStatus, ConditionType, Stage};

/// One observed fact about a build resource. At most one per `type`.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub r#type: ConditionType,
    pub status: ConditionStatus,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub message: String,
    pub last_transition_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
}

impl Condition {
    pub fn new(
        r#type: ConditionType,
        status: ConditionStatus,
        reason: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            r#type,
            status,
            reason: reason.into(),
            message: message.into(),
            // metav1.Time has second precision
            last_transition_time: Utc::now().trunc_subsecs(0),
            observed_generation: None,
            stage: None,
        }
    }

    pub fn for_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn observed(mut self, generation: Option<i64>) -> Self {
        self.observed_generation = generation;
        self
    }

    pub fn is_true(&self) -> bool {
        self.status.is_true()
    }

    fn same_observation(&self, other: &Condition) -> bool {
        self.status == other.status && self.reason == other.reason && self.message == other.message
    }
}

/// Inserts `condition`, or overwrites the existing entry of the same type when
/// its status, reason or message differ. Returns whether anything changed.
pub fn set_condition(conditions: &mut Vec<Condition>, condition: Condition) -> bool {
    match conditions.iter_mut().find(|c| c.r#type == condition.r#type) {
        Some(existing) if existing.same_observation(&condition) => false,
        Some(existing) => {
            *existing = condition;
            true
        }
        None => {
            conditions.push(condition);
            true
        }
    }
}

/// Drops every condition of the given type. Returns whether one was removed.
pub fn remove_condition(conditions: &mut Vec<Condition>, r#type: ConditionType) -> bool {
    let before = conditions.len();
    conditions.retain(|c| c.r#type != r#type);
    conditions.len() != before
}

/// Membership test by reason.
pub fn contains_condition(conditions: &[Condition], reason: &str) -> bool {
    conditions.iter().any(|c| c.reason == reason)
}

pub fn find_condition(conditions: &[Condition], r#type: ConditionType) -> Option<&Condition> {
    conditions.iter().find(|c| c.r#type == r#type)
}

pub fn is_condition_true(conditions: &[Condition], r#type: ConditionType) -> bool {
    find_condition(conditions, r#type).is_some_and(Condition::is_true)
}

/// Read/write access to the condition list of anything carrying one.
pub trait HasConditions {
    fn conditions(&self) -> &[Condition];
    fn conditions_mut(&mut self) -> &mut Vec<Condition>;

    fn set_condition(&mut self, condition: Condition) -> bool {
        set_condition(self.conditions_mut(), condition)
    }

    fn remove_condition(&mut self, r#type: ConditionType) -> bool {
        remove_condition(self.conditions_mut(), r#type)
    }

    fn contains_condition(&self, reason: &str) -> bool {
        contains_condition(self.conditions(), reason)
    }

    fn find_condition(&self, r#type: ConditionType) -> Option<&Condition> {
        find_condition(self.conditions(), r#type)
    }
}
