use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a job as reported by the server.
///
/// Jobs move through:
///
/// ```text
/// CREATED -> PENDING -> STARTING -> RUNNING
///                                     |
///                                  STOPPING -> STOPPED
///                                     |
///                      UPDATING / ROLLING_BACK -> RUNNING / STOPPED
///                                     |
///                      FINISHED / FAILED / CANCELLED / DELETED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Created,
    Pending,
    Starting,
    Stopping,
    Updating,
    RollingBack,
    InfraUpdate,
    InfraUpdateWait,
    Verifying,
    Waiting,
    Running,
    Stopped,
    Finished,
    Failed,
    Cancelled,
    Deleted,
    /// A state this client does not know about yet. Neither stable nor terminal.
    #[serde(other)]
    Unknown,
}

impl JobState {
    /// Wire name of the state, e.g. `"ROLLING_BACK"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Created => "CREATED",
            JobState::Pending => "PENDING",
            JobState::Starting => "STARTING",
            JobState::Stopping => "STOPPING",
            JobState::Updating => "UPDATING",
            JobState::RollingBack => "ROLLING_BACK",
            JobState::InfraUpdate => "INFRA_UPDATE",
            JobState::InfraUpdateWait => "INFRA_UPDATE_WAIT",
            JobState::Verifying => "VERIFYING",
            JobState::Waiting => "WAITING",
            JobState::Running => "RUNNING",
            JobState::Stopped => "STOPPED",
            JobState::Finished => "FINISHED",
            JobState::Failed => "FAILED",
            JobState::Cancelled => "CANCELLED",
            JobState::Deleted => "DELETED",
            JobState::Unknown => "UNKNOWN",
        }
    }

    /// The job was accepted but has not started transitioning yet.
    pub fn is_initial(&self) -> bool {
        matches!(self, JobState::Created | JobState::Pending)
    }

    /// The job is actively moving between stable states.
    pub fn is_transitional(&self) -> bool {
        matches!(
            self,
            JobState::Starting
                | JobState::Stopping
                | JobState::Updating
                | JobState::RollingBack
                | JobState::InfraUpdate
                | JobState::InfraUpdateWait
                | JobState::Verifying
                | JobState::Waiting
        )
    }

    /// No further transitions happen once a job is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Finished | JobState::Failed | JobState::Cancelled | JobState::Deleted
        )
    }

    /// Running, stopped, or terminal: the job accepts new operations.
    pub fn is_stable(&self) -> bool {
        matches!(self, JobState::Running | JobState::Stopped) || self.is_terminal()
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target state a caller may request on update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DesiredState {
    Running,
    Stopped,
}

impl From<DesiredState> for JobState {
    fn from(state: DesiredState) -> Self {
        match state {
            DesiredState::Running => JobState::Running,
            DesiredState::Stopped => JobState::Stopped,
        }
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&JobState::from(*self), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [JobState; 16] = [
        JobState::Created,
        JobState::Pending,
        JobState::Starting,
        JobState::Stopping,
        JobState::Updating,
        JobState::RollingBack,
        JobState::InfraUpdate,
        JobState::InfraUpdateWait,
        JobState::Verifying,
        JobState::Waiting,
        JobState::Running,
        JobState::Stopped,
        JobState::Finished,
        JobState::Failed,
        JobState::Cancelled,
        JobState::Deleted,
    ];

    #[test]
    fn terminal_states() {
        for state in [
            JobState::Finished,
            JobState::Failed,
            JobState::Cancelled,
            JobState::Deleted,
        ] {
            assert!(state.is_terminal(), "{state} should be terminal");
        }
        for state in [
            JobState::Running,
            JobState::Stopped,
            JobState::Pending,
            JobState::Starting,
            JobState::Updating,
        ] {
            assert!(!state.is_terminal(), "{state} should not be terminal");
        }
    }

    #[test]
    fn stable_states_include_terminal() {
        for state in ALL {
            if state.is_terminal() {
                assert!(state.is_stable(), "terminal {state} must be stable");
            }
        }
        assert!(JobState::Running.is_stable());
        assert!(JobState::Stopped.is_stable());
        assert!(!JobState::Pending.is_stable());
        assert!(!JobState::Starting.is_stable());
        assert!(!JobState::Updating.is_stable());
        assert!(!JobState::Stopping.is_stable());
    }

    #[test]
    fn every_known_state_is_in_exactly_one_partition() {
        for state in ALL {
            let initial = state.is_initial();
            let transitional = state.is_transitional();
            let stable = state.is_stable();
            let count = [initial, transitional, stable].iter().filter(|b| **b).count();
            assert_eq!(count, 1, "{state} belongs to {count} partitions");
        }
    }

    #[test]
    fn unknown_state_is_neither_stable_nor_terminal() {
        let state: JobState = serde_json::from_str(r#""HIBERNATING""#).unwrap();
        assert_eq!(state, JobState::Unknown);
        assert!(!state.is_stable());
        assert!(!state.is_terminal());
    }

    #[test]
    fn wire_names_match_display() {
        for state in ALL {
            let json = serde_json::to_string(&state).unwrap();
            assert_eq!(json, format!("\"{state}\""));
        }
        assert_eq!(JobState::InfraUpdateWait.to_string(), "INFRA_UPDATE_WAIT");
        assert_eq!(JobState::RollingBack.to_string(), "ROLLING_BACK");
    }

    #[test]
    fn desired_state_maps_to_job_state() {
        assert_eq!(JobState::from(DesiredState::Running), JobState::Running);
        assert_eq!(JobState::from(DesiredState::Stopped), JobState::Stopped);
        assert_eq!(DesiredState::Stopped.to_string(), "STOPPED");
    }
}
