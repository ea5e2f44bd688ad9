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

//! samlap is a library and a command-line client for:
//!
//!   - Reading [SAM](https://samtools.github.io/hts-specs/SAMv1.pdf) alignments in batches of bounded size.
//!   - Converting primary mapped alignments into [Overlap] records for polishing.
//!   - Printing the overlaps in [PAF](https://github.com/lh3/miniasm/blob/master/PAF.md) or tab-separated format.
//!
//! Plain text and gzip or BGZF compressed SAM input are supported.
//!
//! ## Usage
//!
//! ### Command line
//!
//! The samlap CLI supports the following subcommands:
//!   - `samlap view` print the overlaps in a supported format.
//!   - `samlap stats` count batches, overlaps, and skipped records.
//!
//! ### Rust API
//!
//! The API provides functions that process an entire input in batches.
//!
//! For use cases requiring control over the batches, the following structs
//! are provided:
//!
//!   - [AlignmentStore](store::AlignmentStore): opens a SAM input, reads its header, and reads one record at a time.
//!   - [BatchParser](parser::BatchParser): takes an [AlignmentStore](store::AlignmentStore) and appends batches of [Overlap] records to a Vec.
//!   - [Printer](printer::Printer): takes an iterator over [Overlap] records and formats them into plain text data.
//!
//! Unmapped, secondary, and supplementary alignments are skipped. The size
//! of a batch is the estimated memory used by its overlaps: the lengths of
//! the query name, target name, CIGAR string, sequence, and quality string,
//! plus a fixed per-record overhead.
//!
//! See documentation for the appropriate functions or structs for usage examples.
//!

use std::io::Write;

use parser::BatchParser;
use printer::Printer;

pub mod cigar;
pub mod overlap;
pub mod parser;
pub mod printer;
pub mod quality;
pub mod store;

pub use overlap::Overlap;

type E = Box<dyn std::error::Error>;

/// Supported plain text formats.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Paf,
    Tsv,
}

impl std::str::FromStr for Format {
    type Err = String; // Define an error type for parsing failures

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paf" => Ok(Format::Paf),
            "tsv" => Ok(Format::Tsv),
            _ => Err(format!("'{}' is not a valid Format", s)),
        }
    }
}

/// Counts from processing an input in batches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Number of calls to [parse](BatchParser::parse) that returned true.
    pub batches: u64,
    /// Overlaps produced.
    pub overlaps: u64,
    /// Unmapped, secondary, and supplementary records skipped.
    pub skipped: u64,
}

/// Parse the remaining input in batches and write the overlaps to [Write].
///
/// Each batch is at most `max_bytes` plus the size of one overlap. The batch
/// is formatted with [Printer] and dropped before the next one is read.
///
/// ## Usage
///
/// ```rust
/// use samlap::{parse_to_write, Format};
/// use samlap::parser::BatchParser;
/// use samlap::store::AlignmentStore;
///
/// let data = b"@SQ\tSN:chr\tLN:1000\n\
///              read1\t0\tchr\t11\t60\t2S4M\t*\t0\t0\tTTACGT\t*\n\
///              read2\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\t*\n".to_vec();
/// let mut parser = BatchParser::new(AlignmentStore::from_bytes(data).unwrap()).unwrap();
///
/// let mut output: Vec<u8> = Vec::new();
/// let summary = parse_to_write(&mut parser, Format::Paf, 1_000_000, &mut output).unwrap();
///
/// assert_eq!(summary.overlaps, 1);
/// assert_eq!(summary.skipped, 1);
/// assert_eq!(output, b"read1\t6\t2\t6\t+\tchr\t1000\t10\t14\t4\t4\t60\tcg:Z:2S4M\n".to_vec());
/// ```
///
pub fn parse_to_write<W: Write>(
    parser: &mut BatchParser,
    format: Format,
    max_bytes: u64,
    conn_out: &mut W,
) -> Result<Summary, E> {
    let mut summary = Summary::default();
    let mut batch: Vec<Overlap> = Vec::new();

    while parser.parse(&mut batch, max_bytes)? {
        summary.batches += 1;
        summary.overlaps += batch.len() as u64;
        log::debug!("writing batch {} with {} overlaps", summary.batches, batch.len());

        let mut iter = batch.drain(..);
        let printer = Printer::new(&mut iter, parser.header(), format);
        for line in printer {
            conn_out.write_all(&line?)?;
        }
    }
    summary.skipped = parser.skipped();

    conn_out.flush()?;
    Ok(summary)
}

/// Parse the remaining input in batches and count the results.
///
/// ## Usage
///
/// ```rust
/// use samlap::summarize;
/// use samlap::parser::BatchParser;
/// use samlap::store::AlignmentStore;
///
/// let data = b"@SQ\tSN:chr\tLN:1000\n\
///              read1\t0\tchr\t11\t60\t4M\t*\t0\t0\tACGT\t*\n\
///              read2\t0\tchr\t12\t60\t4M\t*\t0\t0\tACGT\t*\n\
///              read3\t256\tchr\t13\t0\t4M\t*\t0\t0\tACGT\t*\n".to_vec();
/// let mut parser = BatchParser::new(AlignmentStore::from_bytes(data).unwrap()).unwrap();
///
/// // Every overlap fills a batch of 1 byte
/// let summary = summarize(&mut parser, 1).unwrap();
///
/// assert_eq!(summary.batches, 2);
/// assert_eq!(summary.overlaps, 2);
/// assert_eq!(summary.skipped, 1);
/// ```
///
pub fn summarize(
    parser: &mut BatchParser,
    max_bytes: u64,
) -> Result<Summary, E> {
    let mut summary = Summary::default();
    let mut batch: Vec<Overlap> = Vec::new();

    while parser.parse(&mut batch, max_bytes)? {
        summary.batches += 1;
        summary.overlaps += batch.len() as u64;
        batch.clear();
    }
    summary.skipped = parser.skipped();

    Ok(summary)
}
