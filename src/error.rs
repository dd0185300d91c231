//! Error types for the scheduling engine
//!
//! Malformed schedule data never produces an error: dangling relationships,
//! missing dates and absent resource data are excluded from the affected
//! computation instead. Errors are reserved for queries that cannot be
//! answered and for engine-state misuse.

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Queried activity id is not part of the network
    #[error("activity not found: {0}")]
    ActivityNotFound(String),

    /// Cycle detected while strict cycle rejection is enabled
    #[error("cyclic dependency among {} activities: {ids:?}", ids.len())]
    CyclicDependency { ids: Vec<String> },

    /// No current network has been loaded
    #[error("engine not initialized")]
    NotInitialized,

    /// Comparison requested without a baseline network
    #[error("baseline schedule not loaded")]
    BaselineNotLoaded,

    /// Date-sensitive checks were requested without a data date
    #[error("data date required for missed-task and execution-index checks")]
    DataDateRequired,

    /// Configuration could not be parsed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON (de)serialization failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a configuration file failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScheduleError {
    /// Check if the error was caused by a missing activity
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ActivityNotFound(_))
    }
}

/// Engine result alias
pub type Result<T> = std::result::Result<T, ScheduleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ScheduleError::ActivityNotFound("A1010".to_string());
        assert_eq!(err.to_string(), "activity not found: A1010");

        let err = ScheduleError::CyclicDependency {
            ids: vec!["A".to_string(), "B".to_string()],
        };
        assert!(err.to_string().contains("2 activities"));
    }

    #[test]
    fn error_is_not_found() {
        assert!(ScheduleError::ActivityNotFound("X".to_string()).is_not_found());
        assert!(!ScheduleError::NotInitialized.is_not_found());
    }

    #[test]
    fn json_error_converts() {
        let err: ScheduleError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ScheduleError::Json(_)));
    }
}
