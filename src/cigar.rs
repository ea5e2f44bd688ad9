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

//! Conversion between CIGAR operations and their compact string encoding.
//!
//! A CIGAR operation is stored as a `(length, operation)` pair where the
//! operation is the SAM character (`M`, `I`, `D`, `N`, `S`, `H`, `P`, `=`, `X`).
//!
//! ## Usage
//!
//! ```rust
//! use samlap::cigar::{format_cigar, parse_cigar};
//!
//! let ops = vec![(10, 'M'), (2, 'I'), (5, 'M')];
//! let cigar = format_cigar(&ops);
//! assert_eq!(cigar, "10M2I5M");
//!
//! assert_eq!(parse_cigar(&cigar).unwrap(), ops);
//! ```
//!
use std::fmt::Write;

use noodles_sam::alignment::record::cigar::op::Kind;

type E = Box<dyn std::error::Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CigarParseError {
    MissingLength(char),
    TrailingLength(String),
    LengthOverflow(String),
}

impl std::fmt::Display for CigarParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CigarParseError::MissingLength(op) => write!(f, "CIGAR operation '{}' has no length", op),
            CigarParseError::TrailingLength(len) => write!(f, "CIGAR ends with length '{}' without an operation", len),
            CigarParseError::LengthOverflow(len) => write!(f, "CIGAR operation length '{}' does not fit in 32 bits", len),
        }
    }
}

impl std::error::Error for CigarParseError {}

/// SAM character of a [Kind].
pub fn op_char(kind: Kind) -> char {
    match kind {
        Kind::Match => 'M',
        Kind::Insertion => 'I',
        Kind::Deletion => 'D',
        Kind::Skip => 'N',
        Kind::SoftClip => 'S',
        Kind::HardClip => 'H',
        Kind::Pad => 'P',
        Kind::SequenceMatch => '=',
        Kind::SequenceMismatch => 'X',
    }
}

/// Concatenate `(length, operation)` pairs into a CIGAR string.
///
/// Each pair is written as the decimal length followed by the operation
/// character, in input order. The operations are not validated and adjacent
/// operations of the same kind are not merged.
///
pub fn format_cigar(
    ops: &[(u32, char)],
) -> String {
    let mut cigar = String::with_capacity(ops.len() * 4);
    for (len, op) in ops {
        // Writing to a String never fails.
        let _ = write!(cigar, "{}{}", len, op);
    }
    cigar
}

/// Decode a CIGAR string into `(length, operation)` pairs.
///
/// Inverse of [format_cigar]. The unavailable CIGAR `*` and the empty string
/// both decode to an empty vector.
///
/// ## Errors
///
/// Returns a [CigarParseError] if an operation has no length, if the string
/// ends in digits, or if a length does not fit in a u32.
///
pub fn parse_cigar(
    cigar: &str,
) -> Result<Vec<(u32, char)>, E> {
    if cigar == "*" {
        return Ok(Vec::new())
    }

    let mut ops: Vec<(u32, char)> = Vec::new();
    let mut len_start: usize = 0;
    for (pos, c) in cigar.char_indices() {
        if c.is_ascii_digit() {
            continue;
        }
        let len_str = &cigar[len_start..pos];
        if len_str.is_empty() {
            return Err(Box::new(CigarParseError::MissingLength(c)))
        }
        let len = len_str.parse::<u32>().map_err(|_| CigarParseError::LengthOverflow(len_str.to_string()))?;
        ops.push((len, c));
        len_start = pos + c.len_utf8();
    }

    if len_start != cigar.len() {
        return Err(Box::new(CigarParseError::TrailingLength(cigar[len_start..].to_string())))
    }

    Ok(ops)
}

/// Sum of the lengths of operations that consume the reference.
pub fn reference_span(
    ops: &[(u32, char)],
) -> u64 {
    ops.iter().filter(|(_, op)| matches!(op, 'M' | 'D' | 'N' | '=' | 'X')).map(|(len, _)| *len as u64).sum()
}

/// Sum of the lengths of operations that consume the read, hard clips included.
pub fn query_span(
    ops: &[(u32, char)],
) -> u64 {
    ops.iter().filter(|(_, op)| matches!(op, 'M' | 'I' | 'S' | 'H' | '=' | 'X')).map(|(len, _)| *len as u64).sum()
}

/// Total length of clipping (`S` or `H`) at the start and at the end of `ops`.
pub fn clipped_ends(
    ops: &[(u32, char)],
) -> (u64, u64) {
    let is_clip = |op: &&(u32, char)| matches!(op.1, 'S' | 'H');
    let leading: u64 = ops.iter().take_while(is_clip).map(|(len, _)| *len as u64).sum();
    // An all-clip CIGAR is counted once, as leading.
    if ops.iter().all(|op| is_clip(&op)) {
        return (leading, 0)
    }
    let trailing: u64 = ops.iter().rev().take_while(is_clip).map(|(len, _)| *len as u64).sum();
    (leading, trailing)
}
