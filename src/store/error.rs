use std::fmt;

/// Result type for persistence operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for persistence gateway operations
#[derive(Debug)]
pub enum Error {
    /// Validation error - invalid input data
    ValidationError(String),

    /// Connection error - database unreachable or authentication failure
    ConnectionError(String),

    /// Foreign key violation - a referenced user or chat doesn't exist
    ForeignKeyViolation(String),

    /// Unique violation - e.g. a second user with the same email
    UniqueViolation(String),

    /// Database error - SQL errors, other constraint violations
    DatabaseError(String),

    /// Pool error - connection pool issues
    PoolError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Error::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
            Error::ForeignKeyViolation(msg) => write!(f, "Foreign key violation: {}", msg),
            Error::UniqueViolation(msg) => write!(f, "Unique violation: {}", msg),
            Error::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            Error::PoolError(msg) => write!(f, "Pool error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Convert tokio-postgres errors, classifying constraint violations by SQLSTATE
impl From<tokio_postgres::Error> for Error {
    fn from(err: tokio_postgres::Error) -> Self {
        if let Some(db_error) = err.as_db_error() {
            let message = db_error.message().to_string();

            return match db_error.code().code() {
                "23503" => Error::ForeignKeyViolation(message),
                "23505" => Error::UniqueViolation(message),
                code => Error::DatabaseError(format!("{}: {}", code, message)),
            };
        }

        if err.is_closed() {
            return Error::ConnectionError(err.to_string());
        }

        Error::DatabaseError(format!("{:?}", err))
    }
}

/// Convert deadpool errors
impl From<deadpool_postgres::PoolError> for Error {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Error::PoolError(err.to_string())
    }
}

/// Convert deadpool build errors
impl From<deadpool_postgres::BuildError> for Error {
    fn from(err: deadpool_postgres::BuildError) -> Self {
        Error::ConnectionError(err.to_string())
    }
}

/// Convert UUID parse errors
impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Self {
        Error::ValidationError(format!("Invalid UUID: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message() {
        let err = Error::ForeignKeyViolation("chat does not exist".to_string());
        assert_eq!(err.to_string(), "Foreign key violation: chat does not exist");

        let err = Error::PoolError("timed out".to_string());
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_from_uuid_error() {
        let uuid_err = uuid::Uuid::parse_str("not-a-uuid").unwrap_err();
        let err: Error = uuid_err.into();
        assert!(matches!(err, Error::ValidationError(_)));
    }
}
