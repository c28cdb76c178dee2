//! Error types for the snapshot store and operand parsing.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read session file {path}: {source}")]
    SessionRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write session file {path}: {source}")]
    SessionWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("session file {path} is not a JSON object")]
    SessionShape { path: PathBuf },

    #[error("snapshot could not be decoded: {0}")]
    SnapshotDecode(#[from] serde_json::Error),

    #[error("invalid date operand {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid amount operand {0:?}")]
    InvalidAmount(String),
}
