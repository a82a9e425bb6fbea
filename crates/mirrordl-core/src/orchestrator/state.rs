use std::fmt;

/// Where an orchestrator is in handling the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrchestratorState {
    #[default]
    Idle,
    Validating,
    Rejected,
    Probing,
    Downloading,
    Succeeded,
    Failed,
}

impl OrchestratorState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrchestratorState::Rejected | OrchestratorState::Succeeded | OrchestratorState::Failed
        )
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrchestratorState::Idle => "idle",
            OrchestratorState::Validating => "validating",
            OrchestratorState::Rejected => "rejected",
            OrchestratorState::Probing => "probing",
            OrchestratorState::Downloading => "downloading",
            OrchestratorState::Succeeded => "succeeded",
            OrchestratorState::Failed => "failed",
        };
        f.write_str(s)
    }
}
