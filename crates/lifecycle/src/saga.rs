use pagesmith_protocol::{ErrorKind, ResultEnvelope};
use serde::Serialize;
use std::fmt;

/// Steps of a component teardown, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteStep {
    ManifestWrapper,
    ManifestImport,
    ComponentFile,
}

impl DeleteStep {
    pub const SAGA: [DeleteStep; 3] = [
        DeleteStep::ManifestWrapper,
        DeleteStep::ManifestImport,
        DeleteStep::ComponentFile,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ManifestWrapper => "manifest wrapper",
            Self::ManifestImport => "manifest import",
            Self::ComponentFile => "component file",
        }
    }
}

impl fmt::Display for DeleteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum StepStatus {
    Applied,
    AlreadyAbsent,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub step: DeleteStep,
    pub status: StepStatus,
}

/// Outcome of a delete. Success is decided by what is observable afterwards
/// (`converged`), not by whether each step did work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub component: String,
    pub file_path: String,
    pub steps: Vec<StepReport>,
    pub converged: bool,
}

impl DeleteReport {
    pub fn success(&self) -> bool {
        self.converged
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|report| matches!(report.status, StepStatus::Failed(_)))
    }

    pub fn summary(&self) -> String {
        self.steps
            .iter()
            .map(|report| match &report.status {
                StepStatus::Applied => format!("{}: removed", report.step),
                StepStatus::AlreadyAbsent => format!("{}: already absent", report.step),
                StepStatus::Failed(reason) => format!("{}: failed ({reason})", report.step),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn envelope(&self) -> ResultEnvelope {
        if self.converged {
            let applied: Vec<String> = self
                .steps
                .iter()
                .filter(|report| report.status == StepStatus::Applied)
                .map(|report| report.step.to_string())
                .collect();
            let count = applied.len();
            ResultEnvelope::applied(&self.file_path, applied, count)
        } else {
            ResultEnvelope::failed(
                &self.file_path,
                ErrorKind::PartialLifecycleError,
                format!("{} was not fully removed", self.component),
                Some(self.summary()),
            )
        }
    }
}
