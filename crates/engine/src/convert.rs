//! The newline scan and rewrite loop.
//!
//! One loop serves both jobs: conversion writes into a real sink, checking
//! into a discarding one and keeps only the report. The loop works on
//! code-point units, so UTF-16 text converts as correctly as 8-bit text.

use std::io::{Read, Write};

use crate::channel::{InputChannel, OutputChannel};
use crate::codec::EncodingLayout;
use crate::convention::{Convention, ConventionCounts};

/// Settings for one pass over a stream.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Newline flavor written out for every newline met.
    pub target: Convention,
    /// Guarantee the output ends with a newline even when the input did not.
    pub force_final_newline: bool,
    /// Stop at the first newline that does not match `target`. Pre-checks use
    /// this: one mismatch is enough to know the file needs a rewrite.
    pub stop_on_mismatch: bool,
    /// Stop at the first non-text code point.
    pub stop_on_non_text: bool,
}

/// What one pass observed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanReport {
    pub counts: ConventionCounts,
    pub contains_non_text: bool,
    /// True when a read or write failed along the way. The scan still ran to
    /// the point of failure and the counts cover what was seen.
    pub io_error: bool,
}

impl ScanReport {
    /// The overall flavor of the stream that was scanned.
    pub fn dominant(&self) -> Convention {
        self.counts.dominant()
    }
}

/// Control characters that signal binary content. Tab, line feed, vertical
/// tab, form feed and carriage return are the only controls accepted as text.
fn is_non_text(unit: u16) -> bool {
    unit <= 8 || (14..=31).contains(&unit)
}

fn push_newline<W: Write>(
    layout: EncodingLayout,
    target: Convention,
    output: &mut OutputChannel<W>,
) {
    for &unit in target.newline_units() {
        layout.push_unit(output, unit);
    }
}

/// Streams `reader` into `writer`, replacing every newline with the target
/// flavor and tallying the flavors met along the way.
///
/// A carriage return is counted and replaced as soon as it is seen; if a line
/// feed follows it the pair is re-counted as one Windows ending and the line
/// feed vanishes, having already been represented. That holds across refills,
/// so a pair split over two buffers converts the same as an adjacent one.
pub fn convert_stream<R: Read, W: Write>(reader: R, writer: W, options: ScanOptions) -> ScanReport {
    let mut input = InputChannel::new(reader);
    let layout = EncodingLayout::detect(input.head());
    let mut output = OutputChannel::new(writer);

    let mut counts = ConventionCounts::new();
    let mut contains_non_text = false;
    let mut last_was_cr = false;
    let mut last_was_newline = false;

    while let Some(unit) = layout.pull_unit(&mut input) {
        if is_non_text(unit) {
            contains_non_text = true;
            last_was_newline = false;
            if options.stop_on_non_text {
                break;
            }
        }
        match unit {
            13 => {
                push_newline(layout, options.target, &mut output);
                // May be retracted by a line feed coming up right next.
                counts.record(Convention::Cr);
                last_was_cr = true;
                last_was_newline = true;
            }
            10 if last_was_cr => {
                counts.retract(Convention::Cr);
                counts.record(Convention::Crlf);
                last_was_cr = false;
                last_was_newline = true;
                if options.stop_on_mismatch && options.target != Convention::Crlf {
                    break;
                }
            }
            10 => {
                push_newline(layout, options.target, &mut output);
                counts.record(Convention::Lf);
                last_was_cr = false;
                last_was_newline = true;
                if options.stop_on_mismatch && options.target != Convention::Lf {
                    break;
                }
            }
            _ => {
                layout.push_unit(&mut output, unit);
                last_was_cr = false;
                last_was_newline = false;
            }
        }
        if output.write_failed() {
            break;
        }
    }

    if options.force_final_newline && !last_was_newline {
        push_newline(layout, options.target, &mut output);
    }
    let write_failed = output.finish();

    ScanReport {
        counts,
        contains_non_text,
        io_error: write_failed || input.read_failed(),
    }
}
