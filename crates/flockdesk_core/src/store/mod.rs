//! Slice persistence: backends, gateway and write coalescing.
//!
//! # Responsibility
//! - Define the storage boundary errors shared by local and remote backends.
//! - Keep SQL and HTTP details inside this module.
//!
//! # Invariants
//! - A slice holds exactly one current value; writes fully replace it.
//! - Backend selection happens once per gateway lifetime.

use crate::crypto::EnvelopeError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod backend;
pub mod debounce;
pub mod gateway;
pub mod local;
pub mod migrations;
pub mod remote;
pub mod slice;

pub type DbResult<T> = Result<T, DbError>;

/// Local SQLite storage errors.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-boundary error for save/load operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Http(reqwest::Error),
    /// Remote row store answered with an unexpected status.
    RemoteRejected {
        status: u16,
    },
    Envelope(EnvelopeError),
    Serde(serde_json::Error),
    InvalidSliceName(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Http(err) => write!(f, "{err}"),
            Self::RemoteRejected { status } => {
                write!(f, "remote row store rejected the request with status {status}")
            }
            Self::Envelope(err) => write!(f, "{err}"),
            Self::Serde(err) => write!(f, "{err}"),
            Self::InvalidSliceName(value) => write!(f, "invalid slice name: `{value}`"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Http(err) => Some(err),
            Self::RemoteRejected { .. } => None,
            Self::Envelope(err) => Some(err),
            Self::Serde(err) => Some(err),
            Self::InvalidSliceName(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value)
    }
}

impl From<EnvelopeError> for StoreError {
    fn from(value: EnvelopeError) -> Self {
        Self::Envelope(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}
