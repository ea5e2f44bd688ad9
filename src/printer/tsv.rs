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

use crate::Overlap;

type E = Box<dyn std::error::Error>;

/// Format a single overlap as a tab-separated line
///
/// Columns are: query name, flags, target name, 1-based target begin,
/// mapping quality, CIGAR, sequence length, and quality string (`*` if absent).
///
pub fn format_tsv_line<W: Write>(
    overlap: &Overlap,
    conn: &mut W,
) -> Result<(), E> {
    conn.write_all(overlap.query_name())?;
    write!(conn, "\t{}\t", overlap.flags().bits())?;
    conn.write_all(overlap.target_name())?;
    write!(conn, "\t{}\t{}\t{}\t{}\t",
           overlap.target_begin(), overlap.mapping_quality(), overlap.cigar(), overlap.sequence_length())?;
    match overlap.quality() {
        Some(quality) => conn.write_all(quality)?,
        None => conn.write_all(b"*")?,
    }
    conn.write_all(b"\n")?;
    Ok(())
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn format_tsv_line_with_quality() {
        use super::format_tsv_line;
        use crate::overlap::{Overlap, SamFields};
        use noodles_sam::alignment::record::Flags;

        let overlap = Overlap::from_sam(SamFields {
            query_name: b"ERR4035126.1", flags: Flags::REVERSE_COMPLEMENTED, target_name: b"OZ038621.1", target_begin: 4541508,
            mapping_quality: 60, cigar: "5M",
            next_target_name: b"*", next_target_begin: 0, template_length: 0,
            sequence: None, sequence_length: 5, quality: Some(&b"FJ<<J"[..]),
        });

        let mut got: Vec<u8> = Vec::new();
        format_tsv_line(&overlap, &mut got).unwrap();

        assert_eq!(got, b"ERR4035126.1\t16\tOZ038621.1\t4541508\t60\t5M\t5\tFJ<<J\n".to_vec());
    }

    #[test]
    fn format_tsv_line_without_quality() {
        use super::format_tsv_line;
        use crate::overlap::{Overlap, SamFields};
        use noodles_sam::alignment::record::Flags;

        let overlap = Overlap::from_sam(SamFields {
            query_name: b"r1", flags: Flags::empty(), target_name: b"chr", target_begin: 1,
            mapping_quality: 0, cigar: "3M",
            next_target_name: b"*", next_target_begin: 0, template_length: 0,
            sequence: None, sequence_length: 3, quality: None,
        });

        let mut got: Vec<u8> = Vec::new();
        format_tsv_line(&overlap, &mut got).unwrap();

        assert_eq!(got, b"r1\t0\tchr\t1\t0\t3M\t3\t*\n".to_vec());
    }
}
