//! Safe in-place rewrite of one file.
//!
//! A conversion never touches the original until a fully converted copy
//! exists next to it. The original is only removed once the temp file is
//! complete, and the temp file is removed on every other exit path. The one
//! unrecoverable situation is a rename failing after the removal succeeded;
//! that error is fatal and carries the temp path for manual recovery.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek};
use std::path::{Path, PathBuf};

use log::debug;

use crate::convention::Convention;
use crate::convert::{ScanOptions, ScanReport, convert_stream};
use crate::error::{EngineError, Result};
use crate::options::RunOptions;

const TMP_BASE_NAME: &str = ".tmp_endings";

/// Values that hold for a whole run. The temp file name is derived once from
/// the process id, so concurrent invocations in the same directory never
/// fight over the same temp path.
#[derive(Debug, Clone)]
pub struct Session {
    tmp_name: String,
}

impl Session {
    pub fn new() -> Self {
        Self::with_process_id(std::process::id())
    }

    fn with_process_id(pid: u32) -> Self {
        Self {
            tmp_name: format!("{TMP_BASE_NAME}{}", pid % 9_999_999),
        }
    }

    /// Temp path in the same directory as the target; same filesystem, so the
    /// final rename stays atomic.
    fn tmp_path_beside(&self, target: &Path) -> PathBuf {
        target.with_file_name(&self.tmp_name)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-fatal problems met while restoring file metadata after a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataWarning {
    Permissions,
    Ownership,
    Timestamps,
}

impl std::fmt::Display for MetadataWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Permissions => "permissions",
            Self::Ownership => "ownership",
            Self::Timestamps => "file times",
        };
        f.write_str(name)
    }
}

/// How processing one file ended. Per-file failures come back as errors and
/// leave the original file untouched.
#[derive(Debug)]
pub enum FileOutcome {
    /// The file was converted or checked; the report covers the whole stream.
    Done {
        report: ScanReport,
        warnings: Vec<MetadataWarning>,
    },
    /// The content looked binary and binaries are excluded.
    SkippedBinary,
}

/// Converts one file in place. `metadata` is the caller's stat of the same
/// path and provides the mode, ownership and times to restore afterwards.
pub fn convert_one_file(
    path: &Path,
    metadata: &fs::Metadata,
    session: &Session,
    options: &RunOptions,
) -> Result<FileOutcome> {
    let mut input = File::open(path).map_err(|source| EngineError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;
    // Probe for write permission up front with a non-truncating write open,
    // before any work is spent on the content.
    OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|source| EngineError::NotWritable {
            path: path.to_path_buf(),
            source,
        })?;

    let precheck = convert_stream(
        &mut input,
        io::sink(),
        ScanOptions {
            target: options.target,
            force_final_newline: false,
            stop_on_mismatch: true,
            stop_on_non_text: !options.process_binaries,
        },
    );
    if precheck.io_error {
        return Err(EngineError::PrecheckIo {
            path: path.to_path_buf(),
        });
    }
    if precheck.contains_non_text && !options.process_binaries {
        return Ok(FileOutcome::SkippedBinary);
    }
    let dominant = precheck.dominant();
    // When a trailing newline is demanded the counts alone can not prove the
    // file needs no work, so only a plain run may stop here.
    if !options.force_final_newline
        && (dominant == Convention::None || dominant == options.target)
    {
        debug!("{} already conforms, left untouched", path.display());
        return Ok(FileOutcome::Done {
            report: precheck,
            warnings: Vec::new(),
        });
    }

    input.rewind().map_err(|source| EngineError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp_path = session.tmp_path_beside(path);
    let tmp_file = File::create(&tmp_path).map_err(|source| EngineError::CreateTemp {
        path: tmp_path.clone(),
        source,
    })?;

    let report = convert_stream(
        &mut input,
        tmp_file,
        ScanOptions {
            target: options.target,
            force_final_newline: options.force_final_newline,
            stop_on_mismatch: false,
            stop_on_non_text: !options.process_binaries,
        },
    );
    drop(input);

    if report.io_error {
        let _ = fs::remove_file(&tmp_path);
        return Err(EngineError::ConversionIo {
            path: path.to_path_buf(),
        });
    }
    if report.contains_non_text && !options.process_binaries {
        // Binary content past the point where the pre-check stopped.
        let _ = fs::remove_file(&tmp_path);
        return Ok(FileOutcome::SkippedBinary);
    }

    replace_original(path, &tmp_path)?;

    let mut warnings = Vec::new();
    restore_metadata(path, metadata, options.keep_times, &mut warnings);

    Ok(FileOutcome::Done { report, warnings })
}

/// Classifies one file without writing anything.
pub fn check_one_file(path: &Path, options: &RunOptions) -> Result<FileOutcome> {
    let input = File::open(path).map_err(|source| EngineError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;
    let report = convert_stream(
        input,
        io::sink(),
        ScanOptions {
            target: Convention::None,
            force_final_newline: false,
            stop_on_mismatch: false,
            stop_on_non_text: !options.process_binaries,
        },
    );
    if report.io_error {
        return Err(EngineError::CheckIo {
            path: path.to_path_buf(),
        });
    }
    if report.contains_non_text && !options.process_binaries {
        return Ok(FileOutcome::SkippedBinary);
    }
    Ok(FileOutcome::Done {
        report,
        warnings: Vec::new(),
    })
}

/// The point of no return. Removal failing leaves the original in place and
/// stays a per-file error; rename failing after a successful removal strands
/// the converted data in the temp file, which is fatal for the whole run.
fn replace_original(path: &Path, tmp_path: &Path) -> Result<()> {
    if let Err(source) = fs::remove_file(path) {
        let _ = fs::remove_file(tmp_path);
        return Err(EngineError::NotWritable {
            path: path.to_path_buf(),
            source,
        });
    }
    if fs::rename(tmp_path, path).is_err() {
        return Err(EngineError::StrandedTempFile {
            original: path.to_path_buf(),
            temp: tmp_path.to_path_buf(),
        });
    }
    debug!("replaced {}", path.display());
    Ok(())
}

fn restore_metadata(
    path: &Path,
    metadata: &fs::Metadata,
    keep_times: bool,
    warnings: &mut Vec<MetadataWarning>,
) {
    if fs::set_permissions(path, metadata.permissions()).is_err() {
        warnings.push(MetadataWarning::Permissions);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        if std::os::unix::fs::chown(path, Some(metadata.uid()), Some(metadata.gid())).is_err() {
            warnings.push(MetadataWarning::Ownership);
        }
    }
    if keep_times {
        let accessed = filetime::FileTime::from_last_access_time(metadata);
        let modified = filetime::FileTime::from_last_modification_time(metadata);
        if filetime::set_file_times(path, accessed, modified).is_err() {
            warnings.push(MetadataWarning::Timestamps);
        }
    }
}
