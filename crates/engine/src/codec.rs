//! Code-point units over raw bytes.
//!
//! Newline scanning works on 16-bit units so that UTF-16 text converts as
//! correctly as 8-bit text. The layout is picked once per stream from the
//! byte-order mark and applied symmetrically on the way in and the way out;
//! the mark itself is not stripped, it travels through as an ordinary unit.

use std::io::{Read, Write};

use crate::channel::{InputChannel, OutputChannel};

/// How bytes group into scan units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingLayout {
    /// One byte per unit. Covers ASCII, UTF-8 and the 8-bit code pages.
    OneByte,
    /// Two bytes per unit, low byte first (UTF-16 LE).
    TwoByteLe,
    /// Two bytes per unit, high byte first (UTF-16 BE).
    TwoByteBe,
}

impl EncodingLayout {
    /// Picks the layout from the first bytes of a stream. Anything without a
    /// UTF-16 byte-order mark, including an empty or one-byte stream, is
    /// treated as one byte per unit.
    pub fn detect(head: &[u8]) -> Self {
        match head {
            [0xFF, 0xFE, ..] => Self::TwoByteLe,
            [0xFE, 0xFF, ..] => Self::TwoByteBe,
            _ => Self::OneByte,
        }
    }

    /// Assembles the next unit from the input channel. A dangling byte at the
    /// end of a two-byte stream is dropped, matching end of input.
    pub fn pull_unit<R: Read>(self, input: &mut InputChannel<R>) -> Option<u16> {
        match self {
            Self::OneByte => input.pull().map(u16::from),
            Self::TwoByteLe => {
                let low = input.pull()?;
                let high = input.pull()?;
                Some(u16::from_le_bytes([low, high]))
            }
            Self::TwoByteBe => {
                let high = input.pull()?;
                let low = input.pull()?;
                Some(u16::from_be_bytes([high, low]))
            }
        }
    }

    /// Disassembles one unit into the output channel. In the one-byte layout
    /// only the low byte is meaningful and the high byte is discarded.
    pub fn push_unit<W: Write>(self, output: &mut OutputChannel<W>, unit: u16) {
        match self {
            Self::OneByte => output.push(unit as u8),
            Self::TwoByteLe => {
                let [low, high] = unit.to_le_bytes();
                output.push(low);
                output.push(high);
            }
            Self::TwoByteBe => {
                let [high, low] = unit.to_be_bytes();
                output.push(high);
                output.push(low);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn pull_all(layout: EncodingLayout, bytes: &[u8]) -> Vec<u16> {
        let mut input = InputChannel::new(bytes);
        let mut units = Vec::new();
        while let Some(unit) = layout.pull_unit(&mut input) {
            units.push(unit);
        }
        units
    }

    #[test]
    fn detects_layout_from_byte_order_mark() {
        assert_eq!(
            EncodingLayout::detect(&[0xFF, 0xFE, b'a', 0]),
            EncodingLayout::TwoByteLe
        );
        assert_eq!(
            EncodingLayout::detect(&[0xFE, 0xFF, 0, b'a']),
            EncodingLayout::TwoByteBe
        );
        assert_eq!(EncodingLayout::detect(b"plain"), EncodingLayout::OneByte);
        assert_eq!(EncodingLayout::detect(&[0xFF]), EncodingLayout::OneByte);
        assert_eq!(EncodingLayout::detect(&[]), EncodingLayout::OneByte);
    }

    #[test]
    fn assembles_units_in_both_byte_orders() {
        assert_eq!(
            pull_all(EncodingLayout::TwoByteLe, &[0xFF, 0xFE, b'a', 0x00]),
            vec![0xFEFF, 0x0061]
        );
        assert_eq!(
            pull_all(EncodingLayout::TwoByteBe, &[0xFE, 0xFF, 0x00, b'a']),
            vec![0xFEFF, 0x0061]
        );
        assert_eq!(
            pull_all(EncodingLayout::OneByte, b"ab"),
            vec![0x61, 0x62]
        );
    }

    #[test]
    fn dangling_odd_byte_is_dropped() {
        assert_eq!(
            pull_all(EncodingLayout::TwoByteLe, &[b'a', 0x00, b'b']),
            vec![0x0061]
        );
    }

    #[test]
    fn units_round_trip_through_each_layout() {
        for layout in [
            EncodingLayout::OneByte,
            EncodingLayout::TwoByteLe,
            EncodingLayout::TwoByteBe,
        ] {
            let mut bytes = Vec::new();
            {
                let mut output = OutputChannel::new(&mut bytes);
                for unit in [0x000Au16, 0x000D, 0x0061] {
                    layout.push_unit(&mut output, unit);
                }
                assert!(!output.finish());
            }
            assert_eq!(pull_all(layout, &bytes), vec![0x000A, 0x000D, 0x0061]);
        }
    }

    #[test]
    fn one_byte_layout_keeps_only_the_low_byte() {
        let mut bytes = Vec::new();
        let mut output = OutputChannel::new(&mut bytes);
        EncodingLayout::OneByte.push_unit(&mut output, 0x6162);
        assert!(!output.finish());
        drop(output);
        assert_eq!(bytes, vec![0x62]);
    }

    #[test]
    fn empty_input_yields_no_units() {
        let mut input = InputChannel::new(io::empty());
        assert_eq!(EncodingLayout::TwoByteBe.pull_unit(&mut input), None);
    }
}
