//! Batch and stream orchestration.
//!
//! The batch driver walks the named paths, runs one file transaction per
//! regular file and aggregates totals, reporting each step to an observer so
//! the caller can narrate the run as it happens. The stream driver is a thin
//! wrapper over the conversion loop for the stdin/stdout case, where there is
//! no file to protect and so no transaction.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::convention::{Convention, ConventionCounts};
use crate::convert::{ScanOptions, ScanReport, convert_stream};
use crate::error::{EngineError, Result};
use crate::extensions::has_known_binary_extension;
use crate::options::RunOptions;
use crate::transaction::{FileOutcome, MetadataWarning, Session, check_one_file, convert_one_file};
use crate::walker::{WalkEvent, WalkPolicy, walk_paths};

/// Aggregated results of one batch run.
#[derive(Debug, Default, Serialize)]
pub struct BatchTotals {
    /// Files fully checked or converted.
    pub done: u64,
    /// Of the done files, how many showed each source flavor.
    pub by_convention: ConventionCounts,
    pub skipped_binaries: u64,
    pub skipped_directories: u64,
    pub skipped_hidden: u64,
    pub errors: u64,
}

/// One step of a batch run, reported as it happens.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// A file went through; `dominant` is the flavor its content showed.
    Done {
        path: &'a Path,
        dominant: Convention,
        warnings: &'a [MetadataWarning],
    },
    /// A file was left alone because it looks binary.
    SkippedBinary { path: &'a Path },
    /// A hidden entry was left out.
    SkippedHidden { path: &'a Path },
    /// A directory was met while recursion is off.
    SkippedDirectory { path: &'a Path },
    /// A named path could not be read.
    ReadFailed { path: &'a Path },
    /// A file failed; the error text names the file.
    Failed { error: &'a EngineError },
}

/// Runs one transaction per file under `paths` and tallies the outcomes.
///
/// Per-file failures are reported and counted without stopping the batch.
/// The only error that surfaces out of this function is the fatal one, a
/// conversion stranded between removal and rename, which aborts the run on
/// the spot.
pub fn run_batch<F>(
    paths: &[PathBuf],
    options: &RunOptions,
    policy: WalkPolicy,
    observer: &mut F,
) -> Result<BatchTotals>
where
    F: FnMut(BatchEvent<'_>),
{
    let session = Session::new();
    let mut totals = BatchTotals::default();

    walk_paths(paths, policy, &mut |event| match event {
        WalkEvent::File { path, metadata } => process_one_file(
            path,
            metadata,
            &session,
            options,
            &mut totals,
            observer,
        ),
        WalkEvent::SkippedHidden { path } => {
            totals.skipped_hidden += 1;
            observer(BatchEvent::SkippedHidden { path });
            Ok(())
        }
        WalkEvent::SkippedDirectory { path } => {
            totals.skipped_directories += 1;
            observer(BatchEvent::SkippedDirectory { path });
            Ok(())
        }
        WalkEvent::ReadFailed { path } => {
            totals.errors += 1;
            observer(BatchEvent::ReadFailed { path });
            Ok(())
        }
    })?;

    Ok(totals)
}

fn process_one_file<F>(
    path: &Path,
    metadata: &std::fs::Metadata,
    session: &Session,
    options: &RunOptions,
    totals: &mut BatchTotals,
    observer: &mut F,
) -> Result<()>
where
    F: FnMut(BatchEvent<'_>),
{
    if !options.process_binaries && has_known_binary_extension(path) {
        totals.skipped_binaries += 1;
        observer(BatchEvent::SkippedBinary { path });
        return Ok(());
    }

    let result = if options.is_check() {
        check_one_file(path, options)
    } else {
        convert_one_file(path, metadata, session, options)
    };

    match result {
        Ok(FileOutcome::Done { report, warnings }) => {
            totals.done += 1;
            let dominant = report.dominant();
            totals.by_convention.record(dominant);
            observer(BatchEvent::Done {
                path,
                dominant,
                warnings: &warnings,
            });
        }
        Ok(FileOutcome::SkippedBinary) => {
            totals.skipped_binaries += 1;
            observer(BatchEvent::SkippedBinary { path });
        }
        Err(error) if error.is_fatal() => return Err(error),
        Err(error) => {
            totals.errors += 1;
            observer(BatchEvent::Failed { error: &error });
        }
    }
    Ok(())
}

/// Converts one stream straight through, with no temp-file indirection.
///
/// Binary-looking content never stops a stream, it is only reported. Check
/// runs pass a discarding writer and keep only the report.
pub fn run_stream<R: Read, W: Write>(reader: R, writer: W, options: &RunOptions) -> ScanReport {
    convert_stream(
        reader,
        writer,
        ScanOptions {
            target: options.target,
            force_final_newline: options.force_final_newline,
            stop_on_mismatch: false,
            stop_on_non_text: false,
        },
    )
}
