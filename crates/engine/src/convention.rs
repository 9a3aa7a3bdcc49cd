//! Line-ending conventions and what we know about them after a scan.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// A line-terminator style, or one of the two derived classifications.
///
/// `None` and `Mixed` are only ever produced by classification; the engine
/// never writes them. As a conversion target, `None` means a dry run and
/// emits nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Convention {
    /// No line terminator observed.
    None,
    /// Legacy Mac, a lone `\r`.
    Cr,
    /// Unix, a lone `\n`.
    Lf,
    /// Windows, `\r\n`.
    Crlf,
    /// More than one style observed in the same stream.
    Mixed,
}

impl Convention {
    pub const ALL: [Convention; 5] = [
        Convention::None,
        Convention::Cr,
        Convention::Lf,
        Convention::Crlf,
        Convention::Mixed,
    ];

    /// Long form used in banners and summaries.
    pub fn display_name(self) -> &'static str {
        match self {
            Convention::None => "No line ending",
            Convention::Cr => "Legacy Mac (CR)",
            Convention::Lf => "Unix (LF)",
            Convention::Crlf => "Windows (CR-LF)",
            Convention::Mixed => "Mixed endings",
        }
    }

    /// Short form used in verbose per-file lines and JSON keys.
    pub fn short_name(self) -> &'static str {
        match self {
            Convention::None => "None",
            Convention::Cr => "CR",
            Convention::Lf => "LF",
            Convention::Crlf => "CRLF",
            Convention::Mixed => "Mixed",
        }
    }

    /// The code points to emit for one logical line ending in this
    /// convention. Empty for `None` and `Mixed`, which are not writable
    /// targets.
    pub fn newline_units(self) -> &'static [u16] {
        match self {
            Convention::Cr => &[13],
            Convention::Lf => &[10],
            Convention::Crlf => &[13, 10],
            Convention::None | Convention::Mixed => &[],
        }
    }

    fn bucket(self) -> usize {
        match self {
            Convention::None => 0,
            Convention::Cr => 1,
            Convention::Lf => 2,
            Convention::Crlf => 3,
            Convention::Mixed => 4,
        }
    }
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One counter per convention.
///
/// A stream scan only ever records `Cr`, `Lf` and `Crlf`; the batch driver
/// also uses the `None` and `Mixed` buckets when tallying whole files by
/// their dominant convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConventionCounts([u64; 5]);

impl ConventionCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(self, convention: Convention) -> u64 {
        self.0[convention.bucket()]
    }

    pub fn record(&mut self, convention: Convention) {
        self.0[convention.bucket()] += 1;
    }

    /// Takes back one earlier `record`. Callers only retract something they
    /// just recorded, so the bucket is never empty here.
    pub fn retract(&mut self, convention: Convention) {
        debug_assert!(self.0[convention.bucket()] > 0);
        self.0[convention.bucket()] -= 1;
    }

    pub fn iter(self) -> impl Iterator<Item = (Convention, u64)> {
        Convention::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Derives the single convention a scan observed: `None` when every
    /// bucket is empty, the one non-empty bucket when there is exactly one,
    /// and `Mixed` as soon as two styles were seen. Valid on partial counts
    /// from an interrupted scan.
    pub fn dominant(self) -> Convention {
        let mut dominant = Convention::None;
        for (convention, count) in self.iter() {
            if count > 0 {
                if dominant == Convention::None {
                    dominant = convention;
                } else {
                    return Convention::Mixed;
                }
            }
        }
        dominant
    }
}

impl Serialize for ConventionCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Convention::ALL.len()))?;
        for (convention, count) in self.iter() {
            map.serialize_entry(&convention.short_name().to_ascii_lowercase(), &count)?;
        }
        map.end()
    }
}
