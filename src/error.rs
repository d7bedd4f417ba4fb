//! # Error Handling
//!
//! Error kinds surfaced by brand resolution and newsletter ingestion, plus
//! classification of raw store errors into them.

use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

/// Returns true when the store rejected a write because of a unique index.
pub fn is_unique_violation(error: &DbErr) -> bool {
    const PG_UNIQUE: &str = "23505";
    const MYSQL_DUPLICATE_CODES: &[&str] = &["1022", "1062", "1169", "1586"];
    const SQLITE_DUPLICATE_CODES: &[&str] = &["1555", "2067"];

    if matches!(error.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }

    let runtime_err = match error {
        DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err,
        _ => return false,
    };

    let Some(db_error) = runtime_err.as_database_error() else {
        return false;
    };

    if db_error.is_unique_violation() {
        return true;
    }

    if let Some(code) = db_error.code() {
        let code_str = code.as_ref();
        if code_str == PG_UNIQUE
            || MYSQL_DUPLICATE_CODES.contains(&code_str)
            || SQLITE_DUPLICATE_CODES.contains(&code_str)
        {
            return true;
        }
    }

    false
}

/// Returns true when the store could not be reached at all.
pub fn is_unavailable(error: &DbErr) -> bool {
    matches!(error, DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
}

/// Failure modes of brand resolution.
///
/// A malformed sender is not among them: it degrades to "no domain".
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The store could not be reached (connection refused, pool exhausted).
    #[error("store unavailable during {operation}: {source}")]
    StoreUnavailable {
        operation: &'static str,
        source: DbErr,
    },
    /// The store answered with an error other than a uniqueness conflict.
    #[error("store error during {operation}: {source}")]
    Store {
        operation: &'static str,
        source: DbErr,
    },
    /// A concurrent resolution created the same slug or domain first.
    /// Re-running resolution will find the row it created.
    #[error("uniqueness conflict during {operation}: {source}")]
    UniqueViolation {
        operation: &'static str,
        source: DbErr,
    },
    /// The configured numeric suffix bound was reached. Fatal.
    #[error("no free slug for base '{base}' at or below suffix {limit}")]
    SlugExhausted { base: String, limit: u32 },
}

impl ResolveError {
    /// Classify a raw store error raised while performing `operation`.
    pub fn from_db(operation: &'static str, source: DbErr) -> Self {
        if is_unique_violation(&source) {
            Self::UniqueViolation { operation, source }
        } else if is_unavailable(&source) {
            Self::StoreUnavailable { operation, source }
        } else {
            Self::Store { operation, source }
        }
    }

    /// Whether the caller should re-run resolution.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }

    /// The store operation that failed, if the error came from the store.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::StoreUnavailable { operation, .. }
            | Self::Store { operation, .. }
            | Self::UniqueViolation { operation, .. } => Some(*operation),
            Self::SlugExhausted { .. } => None,
        }
    }
}

/// Failure modes of a newsletter ingestion unit of work.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("store error during {operation}: {source}")]
    Store {
        operation: &'static str,
        source: DbErr,
    },
}

impl IngestError {
    pub fn store(operation: &'static str, source: DbErr) -> Self {
        Self::Store { operation, source }
    }
}
