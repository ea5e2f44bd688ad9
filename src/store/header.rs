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
use indexmap::map::IndexMap;
use noodles_sam as sam;

/// Target sequences declared in the header, in header order.
///
/// Maps a target index to its name and length, and a name back to its index.
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetTable {
    targets: IndexMap<BString, usize>,
}

impl TargetTable {
    /// Collects the `@SQ` lines of a SAM header.
    pub fn from_sam_header(
        header: &sam::Header,
    ) -> Self {
        let targets = header.reference_sequences().iter().map(|(name, map)| {
            (name.clone(), usize::from(map.length()))
        }).collect::<IndexMap<BString, usize>>();
        TargetTable{ targets }
    }

    pub fn name(
        &self,
        target_id: usize,
    ) -> Option<&BStr> {
        self.targets.get_index(target_id).map(|(name, _)| name.as_bstr())
    }

    pub fn length(
        &self,
        target_id: usize,
    ) -> Option<usize> {
        self.targets.get_index(target_id).map(|(_, len)| *len)
    }

    /// Index of the target called `name`.
    pub fn index_of(
        &self,
        name: &[u8],
    ) -> Option<usize> {
        self.targets.get_index_of(name.as_bstr())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn from_sam_header() {
        use super::TargetTable;
        use noodles_sam as sam;

        let header: sam::Header = "@HD\tVN:1.6\tSO:unsorted\n@SQ\tSN:chr\tLN:4641652\n@SQ\tSN:plasmid\tLN:53000\n".parse().unwrap();
        let got = TargetTable::from_sam_header(&header);

        assert_eq!(got.len(), 2);
        assert_eq!(got.name(0).unwrap(), "chr");
        assert_eq!(got.length(0), Some(4641652));
        assert_eq!(got.name(1).unwrap(), "plasmid");
        assert_eq!(got.length(1), Some(53000));
        assert_eq!(got.index_of(b"plasmid"), Some(1));
        assert_eq!(got.index_of(b"virus"), None);
        assert!(got.name(2).is_none());
    }

    #[test]
    fn from_empty_sam_header() {
        use super::TargetTable;
        use noodles_sam as sam;

        let got = TargetTable::from_sam_header(&sam::Header::default());
        assert!(got.is_empty());
        assert!(got.name(0).is_none());
    }
}
