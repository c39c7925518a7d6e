//! Error types shared by every repository backend.

use std::fmt;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Where a repository error happened and whether trying again may help.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Repository method, e.g. "create_reservation"
    pub operation: Option<String>,
    /// Entity kind, e.g. "court"
    pub entity: Option<String>,
    pub entity_id: Option<String>,
    pub details: Option<String>,
    pub retryable: bool,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Default::default()
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(ref op) = self.operation {
            parts.push(format!("operation={}", op));
        }
        if let Some(ref entity) = self.entity {
            parts.push(format!("entity={}", entity));
        }
        if let Some(ref id) = self.entity_id {
            parts.push(format!("id={}", id));
        }
        if let Some(ref details) = self.details {
            parts.push(format!("details={}", details));
        }
        if self.retryable {
            parts.push("retryable=true".to_string());
        }
        if parts.is_empty() {
            return Ok(());
        }
        write!(f, "[{}]", parts.join(", "))
    }
}

#[derive(Debug, thiserror::Error)]
#[allow(clippy::result_large_err)]
pub enum RepositoryError {
    /// Pool checkout or connection failure; usually transient.
    #[error("Connection error: {message} {context}")]
    ConnectionError {
        message: String,
        context: ErrorContext,
    },

    #[error("Query error: {message} {context}")]
    QueryError {
        message: String,
        context: ErrorContext,
    },

    #[error("Not found: {message} {context}")]
    NotFound {
        message: String,
        context: ErrorContext,
    },

    /// A stored-data constraint rejected the write (check or not-null).
    #[error("Data validation error: {message} {context}")]
    ValidationError {
        message: String,
        context: ErrorContext,
    },

    /// A uniqueness rule was violated (taken email, held slot, duplicate holiday).
    #[error("Conflict: {message} {context}")]
    ConflictError {
        message: String,
        context: ErrorContext,
    },

    #[error("Configuration error: {message} {context}")]
    ConfigurationError {
        message: String,
        context: ErrorContext,
    },

    #[error("Internal error: {message} {context}")]
    InternalError {
        message: String,
        context: ErrorContext,
    },
}

impl RepositoryError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context: ErrorContext::default().retryable(),
        }
    }

    pub fn connection_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ConnectionError {
            message: message.into(),
            context: context.retryable(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::QueryError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn not_found_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::NotFound {
            message: message.into(),
            context,
        }
    }

    pub fn validation_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ValidationError {
            message: message.into(),
            context,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::ConflictError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn conflict_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::ConflictError {
            message: message.into(),
            context,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn internal_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::InternalError {
            message: message.into(),
            context,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError { context, .. } | Self::QueryError { context, .. } => {
                context.retryable
            }
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ConflictError { .. })
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::ConnectionError { context, .. }
            | Self::QueryError { context, .. }
            | Self::NotFound { context, .. }
            | Self::ValidationError { context, .. }
            | Self::ConflictError { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::InternalError { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::ConnectionError { context, .. }
            | Self::QueryError { context, .. }
            | Self::NotFound { context, .. }
            | Self::ValidationError { context, .. }
            | Self::ConflictError { context, .. }
            | Self::ConfigurationError { context, .. }
            | Self::InternalError { context, .. } => context,
        }
    }

    /// Tag the error with the repository method that produced it.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::result::Error> for RepositoryError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::DatabaseErrorKind;

        match err {
            diesel::result::Error::NotFound => RepositoryError::not_found("Record not found"),
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                let context = ErrorContext::default().with_details(
                    info.constraint_name()
                        .map(|name| format!("constraint={}", name))
                        .unwrap_or_else(|| "unique_violation".to_string()),
                );
                RepositoryError::conflict_with_context(info.message().to_string(), context)
            }
            diesel::result::Error::DatabaseError(
                kind @ (DatabaseErrorKind::CheckViolation | DatabaseErrorKind::NotNullViolation),
                info,
            ) => {
                let mut context =
                    ErrorContext::default().with_details(format!("db_error_kind={:?}", kind));
                if let Some(table) = info.table_name() {
                    context = context.with_entity(table);
                }
                RepositoryError::validation_with_context(info.message().to_string(), context)
            }
            diesel::result::Error::DatabaseError(kind, info) => {
                let message = info.message().to_string();
                let context =
                    ErrorContext::default().with_details(format!("db_error_kind={:?}", kind));
                let context = if matches!(kind, DatabaseErrorKind::SerializationFailure) {
                    context.retryable()
                } else {
                    context
                };
                RepositoryError::QueryError { message, context }
            }
            diesel::result::Error::QueryBuilderError(e) => {
                RepositoryError::query(format!("Query builder error: {}", e))
            }
            diesel::result::Error::DeserializationError(e) => {
                RepositoryError::internal(format!("Deserialization error: {}", e))
            }
            diesel::result::Error::SerializationError(e) => {
                RepositoryError::internal(format!("Serialization error: {}", e))
            }
            other => RepositoryError::query(other.to_string()),
        }
    }
}

#[cfg(feature = "postgres-repo")]
impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        RepositoryError::connection_with_context(
            err.to_string(),
            ErrorContext::default().with_details("pool_error"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_errors_are_retryable() {
        assert!(RepositoryError::connection("pool exhausted").is_retryable());
        assert!(!RepositoryError::not_found("court 3").is_retryable());
        assert!(!RepositoryError::conflict("slot held").is_retryable());
    }

    #[test]
    fn test_with_operation_sets_context() {
        let err = RepositoryError::conflict_with_context(
            "slot already booked",
            ErrorContext::default()
                .with_entity("reservation")
                .with_entity_id(12),
        )
        .with_operation("create_reservation");

        let ctx = err.context();
        assert_eq!(ctx.operation.as_deref(), Some("create_reservation"));
        assert_eq!(ctx.entity_id.as_deref(), Some("12"));
        assert!(err.is_conflict());
        assert!(err.to_string().contains("entity=reservation"));
    }

    #[test]
    fn test_empty_context_displays_nothing() {
        assert_eq!(ErrorContext::default().to_string(), "");
    }

    #[cfg(feature = "postgres-repo")]
    #[test]
    fn test_diesel_constraint_kinds() {
        use diesel::result::{DatabaseErrorKind, Error};

        let unique = Error::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value".to_string()),
        );
        assert!(RepositoryError::from(unique).is_conflict());

        let check = Error::DatabaseError(
            DatabaseErrorKind::CheckViolation,
            Box::new("violates check constraint".to_string()),
        );
        assert!(matches!(
            RepositoryError::from(check),
            RepositoryError::ValidationError { .. }
        ));

        let serialization = Error::DatabaseError(
            DatabaseErrorKind::SerializationFailure,
            Box::new("could not serialize access".to_string()),
        );
        assert!(RepositoryError::from(serialization).is_retryable());
        assert!(RepositoryError::from(Error::NotFound).is_not_found());
    }
}
