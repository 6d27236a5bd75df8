use chrono::NaiveDate;
use thiserror::Error;

use crate::habit::{HabitId, OwnerId};

pub type Result<T> = std::result::Result<T, HabitError>;

#[derive(Debug, Error)]
pub enum HabitError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("{kind} `{id}` not found")]
    NotFound { kind: &'static str, id: String },

    #[error("`{caller}` may not modify habits owned by `{owner}`")]
    Permission { caller: OwnerId, owner: OwnerId },

    #[error("persistence failure: {0}")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Precondition violations raised before any change is applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("at least one weekday must be scheduled")]
    EmptyFrequency,

    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("habit name must not be blank")]
    BlankName,

    #[error("habit `{0}` is locked and cannot be deleted")]
    Locked(HabitId),

    #[error("habit `{0}` is already locked")]
    AlreadyLocked(HabitId),
}

impl HabitError {
    pub fn habit_not_found(id: HabitId) -> Self {
        Self::NotFound {
            kind: "habit",
            id: id.to_string(),
        }
    }

    pub fn persistence<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self::Persistence(err.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_permission(&self) -> bool {
        matches!(self, Self::Permission { .. })
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_convert_into_habit_errors() {
        let err: HabitError = ValidationFailure::EmptyFrequency.into();
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "validation failed: at least one weekday must be scheduled"
        );
    }

    #[test]
    fn persistence_errors_keep_their_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = HabitError::persistence(io);
        assert!(err.is_persistence());
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("disk full"));
    }
}
