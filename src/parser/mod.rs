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

//! Parser that converts SAM alignments into batches of [Overlap] records.
//!
//! Each call to [parse](BatchParser::parse) reads records until the
//! estimated size of the records appended in that call reaches a byte budget,
//! or until the input runs out. Unmapped, secondary, and supplementary
//! alignments are skipped.
//!
//! ## Usage
//!
//! ```rust
//! use samlap::parser::BatchParser;
//! use samlap::store::AlignmentStore;
//!
//! let data = b"@SQ\tSN:chr\tLN:1000\n\
//!              read1\t0\tchr\t11\t60\t4M\t*\t0\t0\tACGT\t?@AB\n\
//!              read2\t16\tchr\t21\t60\t4M\t*\t0\t0\tACGT\t*\n\
//!              read3\t2048\tchr\t31\t60\t4M\t*\t0\t0\tACGT\t*\n".to_vec();
//! let store = AlignmentStore::from_bytes(data).unwrap();
//! let mut parser = BatchParser::new(store).unwrap();
//!
//! let mut overlaps = Vec::new();
//! while parser.parse(&mut overlaps, u64::MAX).unwrap() {}
//!
//! // read3 is a supplementary alignment
//! assert_eq!(overlaps.len(), 2);
//! assert_eq!(overlaps[0].query_name(), "read1");
//! assert_eq!(overlaps[0].target_begin(), 11);
//! assert_eq!(overlaps[1].query_name(), "read2");
//! assert_eq!(parser.objects_read(), 2);
//! ```
//!
use std::path::Path;

use bstr::ByteSlice;

use crate::cigar::format_cigar;
use crate::overlap::Overlap;
use crate::overlap::SamFields;
use crate::quality::encode_quality;
use crate::store::AlignmentStore;
use crate::store::StoreError;
use crate::store::header::TargetTable;
use crate::store::record::RawAlignmentRecord;

type E = Box<dyn std::error::Error>;

/// Estimated bookkeeping cost of one [Overlap] in bytes, on top of its strings.
pub const DEFAULT_RECORD_OVERHEAD: u64 = 100;

// Fixed values for the mate fields of an Overlap
const NEXT_TARGET_NAME: &[u8] = b"*";
const NEXT_TARGET_BEGIN: u32 = 0;
const TEMPLATE_LENGTH: u32 = 0;

// Target name for records without a reference sequence
const MISSING_TARGET_NAME: &[u8] = b"*";

pub struct BatchParser {
    store: AlignmentStore,
    record: RawAlignmentRecord,

    objects_read: u64,
    skipped: u64,
    is_eof: bool,

    record_overhead: u64,
}

impl BatchParser {
    /// Opens the alignment file at `path`.
    ///
    /// ## Errors
    ///
    /// Returns a [StoreError] if the file cannot be opened, its header cannot
    /// be read, or the record buffer cannot be allocated.
    ///
    pub fn open<P: AsRef<Path>>(
        path: P,
    ) -> Result<Self, StoreError> {
        let store = AlignmentStore::open(path)?;
        Self::new(store)
    }

    pub fn new(
        store: AlignmentStore,
    ) -> Result<Self, StoreError> {
        let record = RawAlignmentRecord::try_with_capacity()?;
        Ok(BatchParser{
            store, record,
            objects_read: 0, skipped: 0, is_eof: false,
            record_overhead: DEFAULT_RECORD_OVERHEAD,
        })
    }

    /// Sets the per-record overhead used in the byte estimate.
    pub fn with_record_overhead(
        mut self,
        record_overhead: u64,
    ) -> Self {
        self.record_overhead = record_overhead;
        self
    }
}

impl BatchParser {
    /// Appends the next batch of overlaps to `dst`.
    ///
    /// Reads records until the estimated size of the overlaps appended in this
    /// call reaches `max_bytes` or the input runs out. The record that reaches
    /// the budget is included in the batch.
    ///
    /// Returns true if the budget was reached, or if the input ran out after
    /// at least one overlap was appended in this call. Returns false without
    /// reading anything once the input has been exhausted.
    ///
    /// ## Errors
    ///
    /// Returns an error if the input cannot be read or contains a malformed
    /// record. Overlaps appended before the error stay in `dst`.
    ///
    pub fn parse(
        &mut self,
        dst: &mut Vec<Overlap>,
        max_bytes: u64,
    ) -> Result<bool, E> {
        if self.is_eof {
            return Ok(false)
        }

        let mut current_bytes: u64 = 0;
        let mut num_objects: u64 = 0;

        while self.store.read_record(&mut self.record)? {
            if self.record.is_filtered() {
                self.skipped += 1;
                continue;
            }

            let record = &self.record;
            let target_name = record.target_id
                .and_then(|target_id| self.store.header().name(target_id))
                .map(|name| name.as_bytes())
                .unwrap_or(MISSING_TARGET_NAME);
            let cigar = format_cigar(&record.cigar);
            let quality = encode_quality(record.qualities());
            let quality_length = quality.as_ref().map_or(0, |qual| qual.len());

            dst.push(Overlap::from_sam(SamFields {
                query_name: &record.name,
                flags: record.flags,
                target_name,
                target_begin: u32::try_from(record.position + 1)?,
                mapping_quality: record.mapping_quality as u32,
                cigar: &cigar,
                next_target_name: NEXT_TARGET_NAME,
                next_target_begin: NEXT_TARGET_BEGIN,
                template_length: TEMPLATE_LENGTH,
                sequence: None,
                sequence_length: u32::try_from(record.sequence_length)?,
                quality: quality.as_ref().map(|qual| qual.as_bytes()),
            }));

            num_objects += 1;
            self.objects_read += 1;

            let record_bytes = (record.name.len() + target_name.len() + cigar.len() + record.sequence_length + quality_length) as u64;
            current_bytes = current_bytes.saturating_add(record_bytes.saturating_add(self.record_overhead));

            if current_bytes >= max_bytes {
                log::debug!("batch of {} overlaps reached {} bytes", num_objects, current_bytes);
                return Ok(true)
            }
        }

        log::debug!("end of {} after {} overlaps", self.store.source(), self.objects_read);
        self.is_eof = true;
        Ok(num_objects > 0)
    }

    /// Rewinds to the start of the input.
    ///
    /// The input is reopened and its header read again. Counters and the
    /// end-of-input flag are cleared.
    ///
    pub fn reset(
        &mut self,
    ) -> Result<(), StoreError> {
        self.store.reset()?;
        self.objects_read = 0;
        self.skipped = 0;
        self.is_eof = false;
        log::debug!("reset {}", self.store.source());
        Ok(())
    }

    /// Number of overlaps produced since the last reset.
    pub fn objects_read(&self) -> u64 {
        self.objects_read
    }

    /// Number of unmapped, secondary, or supplementary records skipped since the last reset.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn is_eof(&self) -> bool {
        self.is_eof
    }

    pub fn header(&self) -> &TargetTable {
        self.store.header()
    }

    pub fn record_overhead(&self) -> u64 {
        self.record_overhead
    }
}
