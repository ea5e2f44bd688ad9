// samlap: Memory-bounded batching of SAM alignments into overlaps.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//

//! Phred+33 encoding of raw base qualities.
use bstr::BString;

/// First raw quality byte when the record has no base qualities.
pub const MISSING_QUALITY: u8 = 0xFF;

/// Offset between a Phred score and its printable character.
pub const PHRED_OFFSET: u8 = 33;

/// Encode raw Phred scores as a Phred+33 quality string.
///
/// Returns None if `raw` is empty or starts with [MISSING_QUALITY]. Otherwise
/// returns one byte per input byte, `raw[i] + 33`.
///
/// Scores above 93 are not clamped and wrap around, so the output is bytes
/// rather than a UTF-8 string.
///
/// ## Usage
///
/// ```rust
/// use samlap::quality::encode_quality;
///
/// assert_eq!(encode_quality(&[30, 31, 32, 33, 34]).unwrap(), "?@ABC");
/// assert!(encode_quality(&[0xFF, 0xFF, 0xFF]).is_none());
/// ```
///
pub fn encode_quality(
    raw: &[u8],
) -> Option<BString> {
    match raw.first() {
        None | Some(&MISSING_QUALITY) => None,
        Some(_) => Some(raw.iter().map(|score| score.wrapping_add(PHRED_OFFSET)).collect::<Vec<u8>>().into()),
    }
}

/// Decode a Phred+33 quality string back to raw Phred scores.
pub fn decode_quality(
    encoded: &[u8],
) -> Vec<u8> {
    encoded.iter().map(|c| c.wrapping_sub(PHRED_OFFSET)).collect()
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn encode_quality_phred33() {
        use super::encode_quality;

        let got = encode_quality(&[30, 31, 32, 33, 34]).unwrap();
        assert_eq!(got.as_slice(), &[63, 64, 65, 66, 67]);
        assert_eq!(got, "?@ABC");
    }

    #[test]
    fn encode_quality_sentinel_ignores_length() {
        use super::encode_quality;

        assert!(encode_quality(&[0xFF]).is_none());
        assert!(encode_quality(&[0xFF; 151]).is_none());
        assert!(encode_quality(&[0xFF, 20, 30]).is_none());
    }

    #[test]
    fn encode_quality_empty() {
        use super::encode_quality;

        assert!(encode_quality(&[]).is_none());
    }

    #[test]
    fn encode_quality_sentinel_only_checked_at_start() {
        use super::encode_quality;

        let got = encode_quality(&[0, 0xFF]).unwrap();
        assert_eq!(got.as_slice(), &[33, 32]);
    }

    #[test]
    fn encode_quality_does_not_clamp() {
        use super::encode_quality;

        let got = encode_quality(&[93, 94, 200]).unwrap();
        assert_eq!(got.as_slice(), &[126, 127, 233]);
    }

    #[test]
    fn decode_quality_inverts_encode_quality() {
        use super::{decode_quality, encode_quality};

        let raw: Vec<u8> = (0..=93).collect();
        let encoded = encode_quality(&raw).unwrap();
        assert_eq!(encoded.len(), raw.len());
        assert_eq!(decode_quality(&encoded), raw);
    }
}
