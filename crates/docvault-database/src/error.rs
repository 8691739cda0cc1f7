//! Classification of `sqlx` errors into application errors.
//!
//! SQLite reports both a lost uniqueness race and a stale write snapshot as
//! plain database errors. Both mean "another writer got there first", so
//! they map to [`ErrorKind::Conflict`] and the upload engine retries them.

use docvault_core::error::{AppError, ErrorKind};

/// SQLite result codes that signal lock contention (`SQLITE_BUSY`,
/// `SQLITE_LOCKED` and their extended variants).
const BUSY_CODES: &[&str] = &["5", "6", "261", "262", "517"];

/// Whether the error is a unique or primary key constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err)
            if db_err.is_unique_violation()
                || db_err.message().to_ascii_lowercase().contains("unique")
    )
}

/// Whether the error reports a locked or busy database.
pub fn is_busy(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err
                .code()
                .is_some_and(|code| BUSY_CODES.contains(&&*code))
                || db_err.message().contains("database is locked")
        }
        _ => false,
    }
}

/// Map an error from a statement that participates in chain mutation.
pub fn classify(err: sqlx::Error, context: &str) -> AppError {
    if is_unique_violation(&err) || is_busy(&err) {
        AppError::with_source(ErrorKind::Conflict, format!("{context}: concurrent update"), err)
    } else {
        AppError::with_source(ErrorKind::Database, context.to_string(), err)
    }
}

/// Map an error from a read or a statement with no race semantics.
pub fn database(err: sqlx::Error, context: &str) -> AppError {
    AppError::with_source(ErrorKind::Database, context.to_string(), err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_not_conflicts() {
        let err = classify(sqlx::Error::RowNotFound, "Failed to insert node");
        assert_eq!(err.kind, ErrorKind::Database);
        assert!(!is_busy(&sqlx::Error::PoolTimedOut));
    }
}
