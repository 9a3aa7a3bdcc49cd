//! Line-ending conversion engine.
//!
//! Converts CR, LF and CRLF line terminators to a single chosen flavor, in
//! files rewritten safely in place or in a straight stdin-to-stdout stream.
//! Streams are scanned as code-point units, so UTF-16 text with a byte-order
//! mark converts as correctly as 8-bit text, and every scan doubles as a
//! classifier reporting what flavors a stream contained.
//!
//! The pieces, leaves first: [`channel`] buffers bytes in and out, [`codec`]
//! groups them into units, [`convert`] holds the scan loop, [`transaction`]
//! rewrites one file without ever risking its content, and [`driver`] ties
//! batches and streams together over the [`walker`].

pub mod channel;
pub mod codec;
pub mod convention;
pub mod convert;
pub mod driver;
pub mod error;
pub mod extensions;
pub mod options;
pub mod transaction;
pub mod walker;

pub use convention::{Convention, ConventionCounts};
pub use convert::{ScanOptions, ScanReport, convert_stream};
pub use driver::{BatchEvent, BatchTotals, run_batch, run_stream};
pub use error::{EngineError, Result};
pub use extensions::has_known_binary_extension;
pub use options::RunOptions;
pub use transaction::{FileOutcome, MetadataWarning, Session, check_one_file, convert_one_file};
pub use walker::{WalkEvent, WalkPolicy};
