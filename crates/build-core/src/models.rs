use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle summary of a build resource, always derived from its conditions.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    #[default]
    Pending,
    Preparing,
    Importing,
    Building,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Preparing => write!(f, "Preparing"),
            Self::Importing => write!(f, "Importing"),
            Self::Building => write!(f, "Building"),
            Self::Succeeded => write!(f, "Succeeded"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

impl ConditionStatus {
    pub fn is_true(&self) -> bool {
        matches!(self, Self::True)
    }
}

impl From<bool> for ConditionStatus {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}

/// Condition types this controller reads or writes. Types set by other
/// writers round-trip through `Unrecognized` unchanged.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum ConditionType {
    PipelineRunCreated,
    PipelineRunCompleted,
    ErrorPipelineRunCreate,
    GenericPipelineError,
    ImageImportReady,
    ImageImportInvalid,
    PackageListBuildCompleted,
    GitRepositoryBuildCompleted,
    ErrorBuildingImage,
    PreparingImageBuild,
    ErrorPreparingImageBuild,
    ErrorResolvingDependencies,
    RequiredSecretMissing,
    ValidatingImportedImage,
    ImportingImage,
    BuildingImage,
    Unrecognized(String),
}

impl ConditionType {
    /// Conditions that put the resource in `Failed` as soon as they are `True`.
    pub const FAILURES: [ConditionType; 6] = [
        Self::ErrorPipelineRunCreate,
        Self::GenericPipelineError,
        Self::ImageImportInvalid,
        Self::ErrorBuildingImage,
        Self::ErrorPreparingImageBuild,
        Self::ErrorResolvingDependencies,
    ];

    /// Stage-specific success signals.
    pub const SUCCESSES: [ConditionType; 3] = [
        Self::ImageImportReady,
        Self::PackageListBuildCompleted,
        Self::GitRepositoryBuildCompleted,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::PipelineRunCreated => "PipelineRunCreated",
            Self::PipelineRunCompleted => "PipelineRunCompleted",
            Self::ErrorPipelineRunCreate => "ErrorPipelineRunCreate",
            Self::GenericPipelineError => "GenericPipelineError",
            Self::ImageImportReady => "ImageImportReady",
            Self::ImageImportInvalid => "ImageImportInvalid",
            Self::PackageListBuildCompleted => "PackageListBuildCompleted",
            Self::GitRepositoryBuildCompleted => "GitRepositoryBuildCompleted",
            Self::ErrorBuildingImage => "ErrorBuildingImage",
            Self::PreparingImageBuild => "PreparingImageBuild",
            Self::ErrorPreparingImageBuild => "ErrorPreparingImageBuild",
            Self::ErrorResolvingDependencies => "ErrorResolvingDependencies",
            Self::RequiredSecretMissing => "RequiredSecretMissing",
            Self::ValidatingImportedImage => "ValidatingImportedImage",
            Self::ImportingImage => "ImportingImage",
            Self::BuildingImage => "BuildingImage",
            Self::Unrecognized(other) => other,
        }
    }
}

impl From<String> for ConditionType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PipelineRunCreated" => Self::PipelineRunCreated,
            "PipelineRunCompleted" => Self::PipelineRunCompleted,
            "ErrorPipelineRunCreate" => Self::ErrorPipelineRunCreate,
            "GenericPipelineError" => Self::GenericPipelineError,
            "ImageImportReady" => Self::ImageImportReady,
            "ImageImportInvalid" => Self::ImageImportInvalid,
            "PackageListBuildCompleted" => Self::PackageListBuildCompleted,
            "GitRepositoryBuildCompleted" => Self::GitRepositoryBuildCompleted,
            "ErrorBuildingImage" => Self::ErrorBuildingImage,
            "PreparingImageBuild" => Self::PreparingImageBuild,
            "ErrorPreparingImageBuild" => Self::ErrorPreparingImageBuild,
            "ErrorResolvingDependencies" => Self::ErrorResolvingDependencies,
            "RequiredSecretMissing" => Self::RequiredSecretMissing,
            "ValidatingImportedImage" => Self::ValidatingImportedImage,
            "ImportingImage" => Self::ImportingImage,
            "BuildingImage" => Self::BuildingImage,
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<ConditionType> for String {
    fn from(value: ConditionType) -> Self {
        match value {
            ConditionType::Unrecognized(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for ConditionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the image of a build resource is produced.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BuildStrategy {
    #[default]
    #[serde(rename = "ImageImport")]
    ImportImage,
    PackageList,
    GitRepository,
}

impl BuildStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImportImage => "ImageImport",
            Self::PackageList => "PackageList",
            Self::GitRepository => "GitRepository",
        }
    }
}

/// Named step of a build, each backed by exactly one external pipeline run.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Prepare,
    Import,
    PackageList,
    #[serde(rename = "gitrepo")]
    GitRepo,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Import => "import",
            Self::PackageList => "package-list",
            Self::GitRepo => "gitrepo",
        }
    }

    /// Prefix used in condition reasons, e.g. `ImportPipelineRunCreated`.
    pub fn reason_prefix(&self) -> &'static str {
        match self {
            Self::Prepare => "Prepare",
            Self::Import => "Import",
            Self::PackageList => "PackageList",
            Self::GitRepo => "GitRepo",
        }
    }

    pub fn for_strategy(strategy: BuildStrategy) -> Self {
        match strategy {
            BuildStrategy::ImportImage => Self::Import,
            BuildStrategy::PackageList => Self::PackageList,
            BuildStrategy::GitRepository => Self::GitRepo,
        }
    }

    /// Phase reported while this stage's run is in flight.
    pub fn running_phase(&self) -> Phase {
        match self {
            Self::Prepare => Phase::Preparing,
            Self::Import => Phase::Importing,
            Self::PackageList | Self::GitRepo => Phase::Building,
        }
    }

    /// Recovers the stage from a reason written without an explicit stage.
    pub fn from_reason_prefix(reason: &str) -> Option<Self> {
        [Self::Prepare, Self::Import, Self::PackageList, Self::GitRepo]
            .into_iter()
            .find(|stage| reason.starts_with(stage.reason_prefix()))
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown stage: {0}")]
pub struct ParseStageError(pub String);

impl FromStr for Stage {
    type Err = ParseStageError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "prepare" => Ok(Self::Prepare),
            "import" => Ok(Self::Import),
            "package-list" => Ok(Self::PackageList),
            "gitrepo" => Ok(Self::GitRepo),
            other => Err(ParseStageError(other.to_string())),
        }
    }
}
