//! Error types for fraid operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fraid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while managing fraids.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fraid name contains characters outside `[A-Za-z0-9_]`.
    #[error("{0} is not a valid fraid name: use only alphanumerics and underscores")]
    InvalidName(String),

    /// Size argument is not a positive integer.
    #[error("size ({0}) is not a positive integer")]
    InvalidSize(String),

    /// The same directory was given more than once.
    #[error("directory list has duplicates: {0}")]
    DuplicateDirectory(PathBuf),

    /// A fraid with this name already has a config record.
    #[error("fraid {0} already exists")]
    AlreadyExists(String),

    /// No config record for this fraid name.
    #[error("{0} is not a fraid")]
    NotFound(String),

    /// Activation requested while the array device is already up.
    #[error("fraid {0} is already active")]
    AlreadyActive(String),

    /// Deactivation requested but no array device exists.
    #[error("fraid {0} is not active")]
    NotActive(String),

    /// Deletion requested while the array device is still up.
    #[error("fraid {0} is active: bring it down first")]
    StillActive(String),

    /// The array-assembly service failed.
    #[error("failed to assemble array for {name}: {details}")]
    ArrayCreateFailed { name: String, details: String },

    /// The array-stop service failed.
    #[error("failed to stop array for {name}: {details}")]
    ArrayStopFailed { name: String, details: String },

    /// Creating a loop binding for a backing file failed.
    #[error("failed to attach loop device for {file}: {details}")]
    LoopAttachFailed { file: PathBuf, details: String },

    /// Releasing a loop binding failed.
    #[error("failed to detach loop device {device}: {details}")]
    LoopDetachFailed { device: String, details: String },

    /// Zero-filling a backing file failed.
    #[error("failed to allocate {file}: {details}")]
    AllocationFailed { file: PathBuf, details: String },

    /// A system query command could not be run or returned failure.
    #[error("failed to run {program}: {details}")]
    SystemQuery { program: String, details: String },

    /// Shell input that does not form a known command.
    #[error("unrecognized command")]
    UnrecognizedCommand,
}
