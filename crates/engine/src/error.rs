use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the engine.
///
/// Everything here except `StrandedTempFile` is a per-file condition: the
/// batch driver reports it and moves on. `StrandedTempFile` is the one fatal
/// case, raised when the original was already removed and the converted data
/// could not be renamed into its place; it aborts the whole run so the user
/// can recover the named temp file by hand.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("can not read {path}: {source}")]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can not write over {path}: {source}")]
    NotWritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("can not create {path}: {source}")]
    CreateTemp {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file access error during preliminary check of {path}")]
    PrecheckIo { path: PathBuf },

    #[error("file access error during conversion of {path}")]
    ConversionIo { path: PathBuf },

    #[error("file access error during check of {path}")]
    CheckIo { path: PathBuf },

    #[error(
        "can not restore {original}\n  \
         -- Fail safe reaction : aborting.\n  \
         -- You will find your data in {temp}\n  \
         -- Please rename it manually to {original}"
    )]
    StrandedTempFile { original: PathBuf, temp: PathBuf },
}

impl EngineError {
    /// True for the one condition that must stop a batch instead of being
    /// counted and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::StrandedTempFile { .. })
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
