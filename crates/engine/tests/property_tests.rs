//! Properties of the conversion loop over generated inputs.

use std::io::{self, Read};

use endings_engine::{Convention, ConventionCounts, ScanOptions, convert_stream};
use proptest::prelude::*;

fn plain(target: Convention) -> ScanOptions {
    ScanOptions {
        target,
        force_final_newline: false,
        stop_on_mismatch: false,
        stop_on_non_text: false,
    }
}

fn convert(bytes: &[u8], target: Convention) -> (Vec<u8>, ConventionCounts) {
    let mut out = Vec::new();
    let report = convert_stream(bytes, &mut out, plain(target));
    (out, report.counts)
}

fn terminator() -> impl Strategy<Value = &'static [u8]> {
    prop_oneof![Just(&b"\r"[..]), Just(&b"\n"[..]), Just(&b"\r\n"[..])]
}

fn target() -> impl Strategy<Value = Convention> {
    prop_oneof![
        Just(Convention::Cr),
        Just(Convention::Lf),
        Just(Convention::Crlf),
    ]
}

/// Delivers the underlying bytes a few at a time, like a slow pipe.
struct ChunkReader<'a> {
    data: &'a [u8],
    chunk: usize,
}

impl Read for ChunkReader<'_> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let n = self.chunk.min(self.data.len()).min(out.len());
        out[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

proptest! {
    #[test]
    fn terminator_only_streams_convert_to_a_pure_flavor(
        terms in proptest::collection::vec(terminator(), 0..60),
        target in target(),
    ) {
        let input = terms.concat();
        let (converted, _) = convert(&input, target);
        let (_, rescan) = convert(&converted, Convention::Lf);

        if terms.is_empty() {
            prop_assert_eq!(rescan.dominant(), Convention::None);
        } else {
            prop_assert_eq!(rescan.dominant(), target);
        }
    }

    #[test]
    fn non_newline_bytes_survive_unchanged_and_in_order(
        bytes in proptest::collection::vec(any::<u8>(), 0..800).prop_filter(
            "a byte-order mark would switch the unit layout",
            |b| !b.starts_with(&[0xFF, 0xFE]) && !b.starts_with(&[0xFE, 0xFF]),
        ),
        target in target(),
    ) {
        let (converted, _) = convert(&bytes, target);
        let strip = |data: &[u8]| -> Vec<u8> {
            data.iter().copied().filter(|&b| b != 13 && b != 10).collect()
        };
        prop_assert_eq!(strip(&bytes), strip(&converted));
    }

    #[test]
    fn delivery_chunking_never_changes_the_result(
        bytes in proptest::collection::vec(any::<u8>(), 0..500),
        chunk in 1usize..8,
        target in target(),
    ) {
        let (direct_out, direct_counts) = convert(&bytes, target);

        let mut chunked_out = Vec::new();
        let chunked_report = convert_stream(
            ChunkReader { data: &bytes, chunk },
            &mut chunked_out,
            plain(target),
        );

        prop_assert_eq!(&direct_out, &chunked_out);
        prop_assert_eq!(direct_counts, chunked_report.counts);
    }

    #[test]
    fn each_isolated_terminator_is_counted_once(
        terms in proptest::collection::vec(terminator(), 0..60),
        target in target(),
    ) {
        // A separator byte keeps a "\r" term from merging with a following
        // "\n" term into one pair.
        let input = terms.join(&b"x"[..]);
        let (_, counts) = convert(&input, target);
        let total: u64 = counts.iter().map(|(_, n)| n).sum();
        prop_assert_eq!(total, terms.len() as u64);
    }
}
