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
use std::io::Write;

use bstr::BString;

use crate::Overlap;

type E = Box<dyn std::error::Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOverlapError {
    pub query_name: BString,
}

impl std::fmt::Display for InvalidOverlapError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "overlap for query {} is unmapped or has a malformed CIGAR", self.query_name)
    }
}

impl std::error::Error for InvalidOverlapError {}

/// Format a single overlap in [PAF](https://github.com/lh3/miniasm/blob/master/PAF.md) format
///
/// Writes bytes containing the formatted line containing the contents of
/// `overlap` to `conn`. The CIGAR string is written to the `cg:Z` tag.
///
/// `target_length` is written as 0 if it is not known.
///
/// ## Errors
///
/// Returns an [InvalidOverlapError] if the overlap is not [valid](Overlap::is_valid),
/// or the error from writing to `conn`.
///
pub fn format_paf_line<W: Write>(
    overlap: &Overlap,
    target_length: Option<usize>,
    conn: &mut W,
) -> Result<(), E> {
    if !overlap.is_valid() {
        return Err(Box::new(InvalidOverlapError{ query_name: overlap.query_name().to_owned() }))
    }

    conn.write_all(overlap.query_name())?;
    write!(conn, "\t{}\t{}\t{}\t{}\t",
           overlap.query_length(), overlap.query_begin(), overlap.query_end(), overlap.strand())?;
    conn.write_all(overlap.target_name())?;
    write!(conn, "\t{}\t{}\t{}\t{}\t{}\t{}\tcg:Z:{}\n",
           target_length.unwrap_or(0), overlap.target_start(), overlap.target_end(),
           overlap.matches(), overlap.block_length(), overlap.mapping_quality(), overlap.cigar())?;
    Ok(())
}
