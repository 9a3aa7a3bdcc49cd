// src/main.rs
#![allow(clippy::multiple_crate_versions)]

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use endings_engine::{RunOptions, run_batch, run_stream};

// ==========================
// CLI (Args / Action)
// ==========================
mod cli {
    use super::*;
    use std::path::PathBuf;

    use endings_engine::{Convention, WalkPolicy};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
    pub enum Action {
        /// Report the conventions found, without rewriting anything
        Check,
        /// Convert to Unix endings (aliases: unix, linux, osx)
        #[value(alias = "unix", alias = "linux", alias = "osx")]
        Lf,
        /// Convert to Windows endings (aliases: win, windows, dos)
        #[value(alias = "win", alias = "windows", alias = "dos")]
        Crlf,
        /// Convert to legacy Mac endings (alias: oldmac)
        #[value(alias = "oldmac")]
        Cr,
    }

    impl Action {
        pub fn target(self) -> Convention {
            match self {
                Action::Check => Convention::None,
                Action::Lf => Convention::Lf,
                Action::Crlf => Convention::Crlf,
                Action::Cr => Convention::Cr,
            }
        }
    }

    #[derive(Parser, Debug)]
    #[command(
        name = "endings",
        version,
        about = "Convert line endings between Unix, Windows and legacy Mac conventions",
        after_long_help = "Examples:\n  \
            endings check -r src/\n  \
            endings lf *.txt\n  \
            endings crlf --keepdate --recurse project/\n  \
            cat notes.txt | endings lf > notes-unix.txt"
    )]
    #[allow(clippy::struct_excessive_bools)]
    pub struct Args {
        /// What to do with the endings met
        #[arg(value_enum)]
        pub action: Action,

        /// Files or directories to process; stdin to stdout when omitted
        pub files: Vec<PathBuf>,

        /// Add final newlines where they are missing
        #[arg(short = 'f', long = "final")]
        pub final_newline: bool,

        /// Silence all feedback
        #[arg(short, long)]
        pub quiet: bool,

        /// Print more about what is going on
        #[arg(short, long)]
        pub verbose: bool,

        /// Do not skip binary files
        #[arg(short, long)]
        pub binaries: bool,

        /// Keep files' last modified and last access time stamps
        #[arg(short, long)]
        pub keepdate: bool,

        /// Recurse into directories
        #[arg(short, long)]
        pub recurse: bool,

        /// Process hidden files and directories too
        #[arg(long)]
        pub hidden: bool,

        /// Print the run summary as JSON on stderr
        #[arg(long)]
        pub json: bool,
    }

    impl Args {
        pub fn run_options(&self) -> RunOptions {
            let mut options = match self.action {
                Action::Check => RunOptions::check(),
                action => RunOptions::convert_to(action.target()),
            };
            options.force_final_newline = self.final_newline;
            options.process_binaries = self.binaries;
            options.keep_times = self.keepdate;
            options
        }

        pub fn walk_policy(&self) -> WalkPolicy {
            WalkPolicy {
                recurse: self.recurse,
                process_hidden: self.hidden,
            }
        }
    }
}

// ==========================
// Feedback (stderr)
// ==========================
mod feedback {
    use super::*;

    use endings_engine::{BatchEvent, BatchTotals, Convention, ScanReport};

    // stdout stays a clean data channel; every message lands on stderr.

    pub fn batch_banner(options: &RunOptions) {
        if options.is_check() {
            eprintln!("endings : dry run, scanning files");
        } else {
            eprintln!(
                "endings : converting files to {}",
                options.target.display_name()
            );
        }
    }

    pub fn stream_banner(options: &RunOptions) {
        if options.is_check() {
            eprintln!("endings : dry run, scanning standard input");
        } else {
            eprintln!(
                "endings : converting standard input to {}",
                options.target.display_name()
            );
        }
    }

    pub fn event(event: &BatchEvent<'_>, verbose: bool) {
        match event {
            BatchEvent::Done {
                path,
                dominant,
                warnings,
            } => {
                if verbose {
                    eprintln!("endings : {} -- {}", dominant.short_name(), path.display());
                }
                for warning in warnings.iter() {
                    eprintln!(
                        "endings : could not restore {warning} for {}",
                        path.display()
                    );
                }
            }
            BatchEvent::SkippedBinary { path } => {
                if verbose {
                    eprintln!("endings : skipped probable binary {}", path.display());
                }
            }
            BatchEvent::SkippedHidden { path } => {
                if verbose {
                    eprintln!("endings : skipping hidden file : {}", path.display());
                }
            }
            BatchEvent::SkippedDirectory { path } => {
                if verbose {
                    eprintln!("endings : skipping directory : {}", path.display());
                }
            }
            BatchEvent::ReadFailed { path } => {
                eprintln!("endings : can not read {}", path.display());
            }
            BatchEvent::Failed { error } => {
                eprintln!("endings : {error}");
            }
        }
    }

    pub fn totals(totals: &BatchTotals, check: bool) {
        eprint!(
            "\nendings : {} file{} {}",
            totals.done,
            plural_s(totals.done),
            if check { "checked" } else { "converted" }
        );
        if totals.done > 0 {
            eprintln!(" {} :", if check { "; found" } else { "from" });
            for (convention, count) in totals.by_convention.iter() {
                if count > 0 {
                    eprintln!("              - {count} {}", convention.display_name());
                }
            }
        } else {
            eprintln!();
        }
        if totals.skipped_directories > 0 {
            eprintln!(
                "           {} director{} skipped",
                totals.skipped_directories,
                plural_ies(totals.skipped_directories)
            );
        }
        if totals.skipped_binaries > 0 {
            eprintln!(
                "           {} binar{} skipped",
                totals.skipped_binaries,
                plural_ies(totals.skipped_binaries)
            );
        }
        if totals.skipped_hidden > 0 {
            eprintln!(
                "           {} hidden file{} skipped",
                totals.skipped_hidden,
                plural_s(totals.skipped_hidden)
            );
        }
        if totals.errors > 0 {
            eprintln!(
                "           {} error{}",
                totals.errors,
                plural_s(totals.errors)
            );
        }
        eprintln!();
    }

    pub fn stream_outcome(options: &RunOptions, report: &ScanReport) {
        let dominant = report.dominant();
        if options.is_check() {
            let binary_comment = if report.contains_non_text {
                "looked like a binary stream and "
            } else {
                ""
            };
            eprintln!(
                "endings : stdin {binary_comment}had line endings in {}",
                dominant.display_name()
            );
        } else {
            let binary_comment = if report.contains_non_text {
                "(looked like a binary stream) "
            } else {
                ""
            };
            eprintln!(
                "endings : converted from {} in stdin {binary_comment}to {} in stdout",
                dominant.display_name(),
                options.target.display_name()
            );
        }
    }

    pub fn batch_json(totals: &BatchTotals, options: &RunOptions) {
        let summary = serde_json::json!({
            "mode": mode_name(options),
            "target": target_field(options),
            "totals": totals,
        });
        eprintln!("{summary}");
    }

    pub fn stream_json(report: &ScanReport, options: &RunOptions) {
        let summary = serde_json::json!({
            "mode": mode_name(options),
            "target": target_field(options),
            "stream": {
                "dominant": report.dominant(),
                "counts": report.counts,
                "contains_non_text": report.contains_non_text,
            },
        });
        eprintln!("{summary}");
    }

    pub fn fatal(error: &anyhow::Error) {
        eprintln!("endings : {error}");
    }

    fn mode_name(options: &RunOptions) -> &'static str {
        if options.is_check() { "check" } else { "convert" }
    }

    fn target_field(options: &RunOptions) -> Option<Convention> {
        (!options.is_check()).then_some(options.target)
    }

    fn plural_s(n: u64) -> &'static str {
        if n > 1 { "s" } else { "" }
    }

    fn plural_ies(n: u64) -> &'static str {
        if n > 1 { "ies" } else { "y" }
    }
}

// ==========================
// Main
// ==========================
fn main() -> ExitCode {
    init_logging();
    let args = cli::Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            feedback::fatal(&error);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &cli::Args) -> Result<()> {
    let options = args.run_options();
    if args.files.is_empty() {
        run_stream_mode(args, &options)
    } else {
        run_batch_mode(args, &options)
    }
}

fn run_stream_mode(args: &cli::Args, options: &RunOptions) -> Result<()> {
    if !args.quiet && !args.json {
        feedback::stream_banner(options);
    }
    let stdin = io::stdin().lock();
    let report = if options.is_check() {
        run_stream(stdin, io::sink(), options)
    } else {
        run_stream(stdin, io::stdout().lock(), options)
    };
    if args.json {
        feedback::stream_json(&report, options);
    } else if !args.quiet {
        feedback::stream_outcome(options, &report);
    }
    Ok(())
}

fn run_batch_mode(args: &cli::Args, options: &RunOptions) -> Result<()> {
    if !args.quiet && !args.json {
        feedback::batch_banner(options);
    }
    let totals = run_batch(&args.files, options, args.walk_policy(), &mut |event| {
        feedback::event(&event, args.verbose);
    })?;
    if args.json {
        feedback::batch_json(&totals, options);
    } else if !args.quiet {
        feedback::totals(&totals, options.is_check());
    }
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}
