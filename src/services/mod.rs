//! Service layer: business rules on top of the repository traits.
//!
//! Services are plain async functions generic over the narrowest repository
//! trait they need, so they accept both `&dyn FullRepository` and concrete
//! repositories. They validate input, enforce ownership and role checks, and
//! translate repository failures into [`ServiceError`].

pub mod accounts;
pub mod availability;
pub mod courts;
pub mod posts;
pub mod profiles;
pub mod reservations;

use chrono::Duration;
use thiserror::Error;

use crate::db::repo_config::RepositoryConfig;
use crate::db::repository::RepositoryError;

pub const CANCELLATION_NOTICE_ENV: &str = "CANCELLATION_NOTICE_MINUTES";

/// Minimum notice before a reservation may be cancelled, in minutes.
pub const DEFAULT_CANCELLATION_NOTICE_MINUTES: i64 = 120;
pub const MAX_CANCELLATION_NOTICE_MINUTES: i64 = 365 * 24 * 60;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { message, .. } => Self::NotFound(message),
            RepositoryError::ConflictError { message, .. } => Self::Conflict(message),
            RepositoryError::ValidationError { message, .. } => Self::Validation(message),
            other => Self::Repository(other),
        }
    }
}

/// Tunable booking rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    pub min_cancellation_notice: Duration,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            min_cancellation_notice: Duration::minutes(DEFAULT_CANCELLATION_NOTICE_MINUTES),
        }
    }
}

impl BookingPolicy {
    /// Negative values mean no notice; values above one year are capped.
    pub fn with_notice_minutes(minutes: i64) -> Self {
        if minutes > MAX_CANCELLATION_NOTICE_MINUTES {
            log::warn!(
                "Cancellation notice of {} minutes capped at {}",
                minutes,
                MAX_CANCELLATION_NOTICE_MINUTES
            );
        }
        let minutes = minutes.clamp(0, MAX_CANCELLATION_NOTICE_MINUTES);
        Self {
            min_cancellation_notice: Duration::minutes(minutes),
        }
    }

    /// Reads `CANCELLATION_NOTICE_MINUTES`; unset or unparsable values keep the default.
    pub fn from_env() -> Self {
        match std::env::var(CANCELLATION_NOTICE_ENV) {
            Ok(raw) => match raw.trim().parse::<i64>() {
                Ok(minutes) => Self::with_notice_minutes(minutes),
                Err(_) => {
                    log::warn!(
                        "Ignoring {}={:?}: not a number of minutes",
                        CANCELLATION_NOTICE_ENV,
                        raw
                    );
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Environment first, then the `[booking]` section of `repository.toml`.
    pub fn resolve(config: Option<&RepositoryConfig>) -> Self {
        let policy = Self::from_env();
        match config.and_then(|c| c.booking.min_cancellation_notice_minutes) {
            Some(minutes) if std::env::var(CANCELLATION_NOTICE_ENV).is_err() => {
                Self::with_notice_minutes(minutes)
            }
            _ => policy,
        }
    }

    pub fn notice_minutes(&self) -> i64 {
        self.min_cancellation_notice.num_minutes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::ErrorContext;

    #[test]
    fn test_repository_errors_map_to_service_kinds() {
        let err: ServiceError = RepositoryError::not_found("Court 9 not found").into();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Court 9 not found"));

        let err: ServiceError =
            RepositoryError::conflict_with_context("taken", ErrorContext::new("create")).into();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let err: ServiceError = RepositoryError::connection("down").into();
        assert!(matches!(err, ServiceError::Repository(_)));
    }

    #[test]
    fn test_default_policy_is_two_hours() {
        assert_eq!(BookingPolicy::default().notice_minutes(), 120);
        assert_eq!(BookingPolicy::with_notice_minutes(-5).notice_minutes(), 0);
    }

    #[test]
    fn test_huge_notice_is_capped_at_one_year() {
        let policy = BookingPolicy::with_notice_minutes(i64::MAX);
        assert_eq!(policy.notice_minutes(), MAX_CANCELLATION_NOTICE_MINUTES);
        assert_eq!(policy.min_cancellation_notice, Duration::days(365));
    }
}
