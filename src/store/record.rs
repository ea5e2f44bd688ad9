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
use std::collections::TryReserveError;

use noodles_sam::alignment::record::Flags;
use noodles_sam::alignment::RecordBuf;

use crate::cigar::op_char;
use crate::quality::MISSING_QUALITY;

type E = Box<dyn std::error::Error>;

/// Mapping quality stored when the record has none.
pub const MISSING_MAPPING_QUALITY: u8 = 255;

/// Initial capacities of the per-record buffers.
const NAME_CAPACITY: usize = 256;
const CIGAR_CAPACITY: usize = 64;
const QUALITY_CAPACITY: usize = 64 * 1024;

/// An alignment record as supplied by [AlignmentStore](crate::store::AlignmentStore).
///
/// The record is a reusable buffer: [read_record](crate::store::AlignmentStore::read_record)
/// overwrites every field, so the contents are only valid until the next read.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawAlignmentRecord {
    /// Query name without a terminator.
    pub name: Vec<u8>,
    pub flags: Flags,
    /// Index into the header's target table.
    pub target_id: Option<usize>,
    /// 0-based leftmost position, -1 if unavailable.
    pub position: i64,
    pub mapping_quality: u8,
    /// CIGAR operations as `(length, operation)` pairs in record order.
    pub cigar: Vec<(u32, char)>,
    pub sequence_length: usize,
    /// Raw Phred scores. Starts with [MISSING_QUALITY] if the record has none.
    pub quality_scores: Vec<u8>,
}

impl Default for RawAlignmentRecord {
    fn default() -> Self {
        RawAlignmentRecord {
            name: Vec::new(),
            flags: Flags::empty(),
            target_id: None,
            position: -1,
            mapping_quality: MISSING_MAPPING_QUALITY,
            cigar: Vec::new(),
            sequence_length: 0,
            quality_scores: Vec::new(),
        }
    }
}

impl RawAlignmentRecord {
    /// Allocates the working buffers up front.
    ///
    /// Fails if the allocator cannot provide the initial capacity.
    pub fn try_with_capacity() -> Result<Self, TryReserveError> {
        let mut record = RawAlignmentRecord::default();
        record.name.try_reserve(NAME_CAPACITY)?;
        record.cigar.try_reserve(CIGAR_CAPACITY)?;
        record.quality_scores.try_reserve(QUALITY_CAPACITY)?;
        Ok(record)
    }

    /// Is the record unmapped, secondary, or supplementary.
    pub fn is_filtered(&self) -> bool {
        self.flags.is_unmapped() || self.flags.is_secondary() || self.flags.is_supplementary()
    }

    /// Quality bytes covering at most `sequence_length` bases.
    pub fn qualities(&self) -> &[u8] {
        let len = self.sequence_length.min(self.quality_scores.len());
        &self.quality_scores[..len]
    }

    /// Overwrite the contents with `record`.
    pub fn fill_from(
        &mut self,
        record: &RecordBuf,
    ) -> Result<(), E> {
        self.name.clear();
        if let Some(name) = record.name() {
            self.name.extend_from_slice(name);
        }

        self.flags = record.flags();
        self.target_id = record.reference_sequence_id();
        self.position = record.alignment_start().map(|pos| usize::from(pos) as i64 - 1).unwrap_or(-1);
        self.mapping_quality = record.mapping_quality().map(|mapq| mapq.get()).unwrap_or(MISSING_MAPPING_QUALITY);

        self.cigar.clear();
        for op in record.cigar().as_ref() {
            let len = u32::try_from(op.len())?;
            self.cigar.push((len, op_char(op.kind())));
        }

        self.sequence_length = record.sequence().len();

        self.quality_scores.clear();
        let scores: &[u8] = record.quality_scores().as_ref();
        if scores.is_empty() {
            self.quality_scores.resize(self.sequence_length.max(1), MISSING_QUALITY);
        } else {
            self.quality_scores.extend_from_slice(scores);
        }

        Ok(())
    }
}

// Tests
#[cfg(test)]
mod tests {
    use noodles_sam as sam;
    use noodles_sam::alignment::RecordBuf;

    fn read_one(line: &str) -> RecordBuf {
        let header: sam::Header = "@SQ\tSN:t0\tLN:100\n@SQ\tSN:t1\tLN:200\n".parse().unwrap();
        let mut reader = sam::io::Reader::new(line.as_bytes());
        let mut record = RecordBuf::default();
        reader.read_record_buf(&header, &mut record).unwrap();
        record
    }

    #[test]
    fn fill_from_mapped_record() {
        use super::RawAlignmentRecord;
        use noodles_sam::alignment::record::Flags;

        let record = read_one("r1\t16\tt1\t8\t60\t3M1I\t*\t0\t0\tACGT\t?@AB\n");

        let mut got = RawAlignmentRecord::default();
        got.fill_from(&record).unwrap();

        let expected = RawAlignmentRecord {
            name: b"r1".to_vec(),
            flags: Flags::REVERSE_COMPLEMENTED,
            target_id: Some(1),
            position: 7,
            mapping_quality: 60,
            cigar: vec![(3, 'M'), (1, 'I')],
            sequence_length: 4,
            quality_scores: vec![30, 31, 32, 33],
        };
        assert_eq!(got, expected);
        assert!(!got.is_filtered());
    }

    #[test]
    fn fill_from_missing_quality_uses_sentinel() {
        use super::RawAlignmentRecord;

        let record = read_one("r2\t4\t*\t0\t255\t*\t*\t0\t0\tACG\t*\n");

        let mut got = RawAlignmentRecord::try_with_capacity().unwrap();
        got.fill_from(&record).unwrap();

        assert_eq!(got.quality_scores, vec![0xFF, 0xFF, 0xFF]);
        assert_eq!(got.position, -1);
        assert_eq!(got.mapping_quality, 255);
        assert!(got.target_id.is_none());
        assert!(got.is_filtered());
    }

    #[test]
    fn fill_from_overwrites_previous_record() {
        use super::RawAlignmentRecord;

        let first = read_one("long_read_name\t0\tt0\t1\t30\t10M2D\t*\t0\t0\tAAAAAAAAAA\t*\n");
        let second = read_one("r\t4\t*\t0\t255\t*\t*\t0\t0\t*\t*\n");

        let mut got = RawAlignmentRecord::default();
        got.fill_from(&first).unwrap();
        got.fill_from(&second).unwrap();

        assert_eq!(got.name, b"r".to_vec());
        assert!(got.cigar.is_empty());
        assert_eq!(got.sequence_length, 0);
        assert_eq!(got.quality_scores, vec![0xFF]);
    }

    #[test]
    fn qualities_cover_sequence() {
        use super::RawAlignmentRecord;

        let mut record = RawAlignmentRecord::default();
        record.sequence_length = 3;
        record.quality_scores = vec![30, 31, 32, 33, 34];
        assert_eq!(record.qualities(), &[30, 31, 32]);

        // Missing qualities of an empty sequence
        record.sequence_length = 0;
        record.quality_scores = vec![0xFF];
        assert!(record.qualities().is_empty());

        record.sequence_length = 4;
        record.quality_scores = vec![0xFF, 0xFF];
        assert_eq!(record.qualities(), &[0xFF, 0xFF]);
    }

    #[test]
    fn is_filtered_flags() {
        use super::RawAlignmentRecord;
        use noodles_sam::alignment::record::Flags;

        let mut record = RawAlignmentRecord::default();
        for (flags, filtered) in [
            (Flags::empty(), false),
            (Flags::REVERSE_COMPLEMENTED, false),
            (Flags::SEGMENTED | Flags::FIRST_SEGMENT, false),
            (Flags::UNMAPPED, true),
            (Flags::SECONDARY, true),
            (Flags::SUPPLEMENTARY, true),
        ] {
            record.flags = flags;
            assert_eq!(record.is_filtered(), filtered, "{:?}", flags);
        }
    }
}
