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
use bstr::BStr;
use bstr::BString;
use bstr::ByteSlice;
use noodles_sam::alignment::record::Flags;

use crate::cigar::clipped_ends;
use crate::cigar::parse_cigar;
use crate::cigar::query_span;
use crate::cigar::reference_span;

/// Fields of a SAM alignment used to construct an [Overlap].
///
/// Name and string lengths are the lengths of the slices.
///
#[derive(Clone, Debug)]
pub struct SamFields<'a> {
    pub query_name: &'a [u8],
    pub flags: Flags,
    pub target_name: &'a [u8],
    /// 1-based leftmost target position.
    pub target_begin: u32,
    pub mapping_quality: u32,
    pub cigar: &'a str,
    pub next_target_name: &'a [u8],
    pub next_target_begin: u32,
    pub template_length: u32,
    pub sequence: Option<&'a [u8]>,
    pub sequence_length: u32,
    /// Phred+33 encoded base qualities.
    pub quality: Option<&'a [u8]>,
}

/// One alignment between a query and a target sequence.
///
/// Query coordinates are 0-based half-open on the original read, so a
/// reverse strand alignment has its clips swapped. Target coordinates are
/// 0-based half-open on the forward strand of the target.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overlap {
    query_name: BString,
    flags: Flags,
    target_name: BString,
    target_begin: u32,
    mapping_quality: u32,
    cigar: String,
    next_target_name: BString,
    next_target_begin: u32,
    template_length: u32,
    sequence: Option<BString>,
    sequence_length: u32,
    quality: Option<BString>,

    // Derived from the CIGAR and flags
    query_begin: u64,
    query_end: u64,
    query_length: u64,
    target_end: u64,
    matches: u64,
    block_length: u64,
    is_valid: bool,
}

impl Overlap {
    pub fn from_sam(
        fields: SamFields<'_>,
    ) -> Self {
        let ops = parse_cigar(fields.cigar);
        let is_valid = ops.is_ok() && !fields.flags.is_unmapped();
        let ops = ops.unwrap_or_default();

        let query_length = query_span(&ops);
        let (leading, trailing) = clipped_ends(&ops);
        let (mut query_begin, mut query_end) = (leading, query_length - trailing);
        if fields.flags.is_reverse_complemented() {
            (query_begin, query_end) = (query_length - query_end, query_length - query_begin);
        }
        let target_end = fields.target_begin.saturating_sub(1) as u64 + reference_span(&ops);
        let matches = ops.iter().filter(|(_, op)| matches!(op, 'M' | '=')).map(|(len, _)| *len as u64).sum();
        let block_length = ops.iter().filter(|(_, op)| matches!(op, 'M' | 'I' | 'D' | '=' | 'X')).map(|(len, _)| *len as u64).sum();

        Overlap {
            query_name: fields.query_name.into(),
            flags: fields.flags,
            target_name: fields.target_name.into(),
            target_begin: fields.target_begin,
            mapping_quality: fields.mapping_quality,
            cigar: fields.cigar.to_string(),
            next_target_name: fields.next_target_name.into(),
            next_target_begin: fields.next_target_begin,
            template_length: fields.template_length,
            sequence: fields.sequence.map(BString::from),
            sequence_length: fields.sequence_length,
            quality: fields.quality.map(BString::from),
            query_begin, query_end, query_length, target_end,
            matches, block_length, is_valid,
        }
    }

    pub fn query_name(&self) -> &BStr {
        self.query_name.as_bstr()
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn target_name(&self) -> &BStr {
        self.target_name.as_bstr()
    }

    /// 1-based leftmost target position as given at construction.
    pub fn target_begin(&self) -> u32 {
        self.target_begin
    }

    pub fn mapping_quality(&self) -> u32 {
        self.mapping_quality
    }

    pub fn cigar(&self) -> &str {
        &self.cigar
    }

    pub fn next_target_name(&self) -> &BStr {
        self.next_target_name.as_bstr()
    }

    pub fn next_target_begin(&self) -> u32 {
        self.next_target_begin
    }

    pub fn template_length(&self) -> u32 {
        self.template_length
    }

    pub fn sequence(&self) -> Option<&BStr> {
        self.sequence.as_ref().map(|seq| seq.as_bstr())
    }

    pub fn sequence_length(&self) -> u32 {
        self.sequence_length
    }

    pub fn quality(&self) -> Option<&BStr> {
        self.quality.as_ref().map(|qual| qual.as_bstr())
    }

    /// `-` if the query is reverse complemented, `+` otherwise.
    pub fn strand(&self) -> char {
        if self.flags.is_reverse_complemented() { '-' } else { '+' }
    }

    pub fn query_begin(&self) -> u64 {
        self.query_begin
    }

    pub fn query_end(&self) -> u64 {
        self.query_end
    }

    /// Length of the read including clipped bases.
    pub fn query_length(&self) -> u64 {
        self.query_length
    }

    /// 0-based target start.
    pub fn target_start(&self) -> u64 {
        self.target_begin.saturating_sub(1) as u64
    }

    pub fn target_end(&self) -> u64 {
        self.target_end
    }

    /// Sum of M and = operation lengths.
    pub fn matches(&self) -> u64 {
        self.matches
    }

    /// Sum of M, I, D, =, and X operation lengths.
    pub fn block_length(&self) -> u64 {
        self.block_length
    }

    /// Mapped with a well-formed CIGAR.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }
}
