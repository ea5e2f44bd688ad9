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

//! Printer for outputting [Overlap] records as plain text in any supported [Format].
//!
//! Returns 1 line at a time using next(), or the error from formatting it.
//!
//! ## Usage
//!
//! ```rust
//! use samlap::Format;
//! use samlap::parser::BatchParser;
//! use samlap::printer::Printer;
//! use samlap::store::AlignmentStore;
//!
//! let data = b"@SQ\tSN:chr\tLN:1000\n\
//!              read1\t0\tchr\t11\t60\t4M\t*\t0\t0\tACGT\t?@AB\n".to_vec();
//! let mut parser = BatchParser::new(AlignmentStore::from_bytes(data).unwrap()).unwrap();
//!
//! let mut batch = Vec::new();
//! parser.parse(&mut batch, u64::MAX).unwrap();
//!
//! let mut iter = batch.into_iter();
//! let printer = Printer::new(&mut iter, parser.header(), Format::Tsv);
//!
//! let output: Vec<u8> = printer.map(|line| line.unwrap()).flatten().collect();
//! assert_eq!(output, b"read1\t0\tchr\t11\t60\t4M\t4\t?@AB\n".to_vec());
//! ```
//!

use crate::Format;
use crate::Overlap;
use crate::store::header::TargetTable;

type E = Box<dyn std::error::Error>;

use paf::format_paf_line;
use tsv::format_tsv_line;

// Format specific implementations
pub mod paf;
pub mod tsv;

pub struct Printer<'a, I: Iterator> where I: Iterator<Item=Overlap> {
    // Inputs
    records: &'a mut I,
    targets: &'a TargetTable,

    pub format: Format,
}

impl<'a, I: Iterator> Printer<'a, I> where I: Iterator<Item=Overlap> {
    pub fn new(
        records: &'a mut I,
        targets: &'a TargetTable,
        format: Format,
    ) -> Self {
        Printer{ records, targets, format }
    }
}

impl<I: Iterator> Iterator for Printer<'_, I> where I: Iterator<Item=Overlap> {
    type Item = Result<Vec<u8>, E>;

    fn next(
        &mut self,
    ) -> Option<Result<Vec<u8>, E>> {
        let overlap = self.records.next()?;
        let mut line: Vec<u8> = Vec::new();
        let res = match self.format {
            Format::Paf => {
                let target_length = self.targets.index_of(overlap.target_name()).and_then(|id| self.targets.length(id));
                format_paf_line(&overlap, target_length, &mut line)
            },
            Format::Tsv => format_tsv_line(&overlap, &mut line),
        };
        Some(res.map(|_| line))
    }
}
