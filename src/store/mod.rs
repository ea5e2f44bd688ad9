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

//! Access to a stream of SAM alignment records.
//!
//! [AlignmentStore] owns the open input and the parsed header. The input is
//! closed when the store is dropped, including when opening fails halfway.
//!
//! Plain text SAM and gzip or BGZF compressed SAM are supported. Compression
//! is detected from the first bytes of the input.
//!
//! ## Usage
//!
//! ```rust
//! use samlap::store::AlignmentStore;
//! use samlap::store::record::RawAlignmentRecord;
//!
//! let data = b"@SQ\tSN:chr\tLN:1000\nr1\t0\tchr\t11\t60\t4M\t*\t0\t0\tACGT\t?@AB\n".to_vec();
//! let mut store = AlignmentStore::from_bytes(data).unwrap();
//!
//! assert_eq!(store.header().name(0).unwrap(), "chr");
//!
//! let mut record = RawAlignmentRecord::default();
//! assert!(store.read_record(&mut record).unwrap());
//! assert_eq!(record.name, b"r1".to_vec());
//! assert_eq!(record.position, 10);
//!
//! assert!(!store.read_record(&mut record).unwrap());
//! ```
//!
pub mod header;
pub mod record;

use std::collections::TryReserveError;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Cursor;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use flate2::read::MultiGzDecoder;
use noodles_sam as sam;
use noodles_sam::alignment::RecordBuf;

use header::TargetTable;
use record::RawAlignmentRecord;

type E = Box<dyn std::error::Error>;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Failures while opening a store or setting up per-record state.
#[derive(Debug)]
pub enum StoreError {
    /// The input could not be opened or read.
    Open { source_name: String, source: std::io::Error },
    /// The header is missing or malformed.
    Header { source_name: String, source: std::io::Error },
    /// The per-record working buffer could not be allocated.
    ResourceInit { source: TryReserveError },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            StoreError::Open { source_name, source } => write!(f, "unable to open file {}: {}", source_name, source),
            StoreError::Header { source_name, source } => write!(f, "unable to read header from {}: {}", source_name, source),
            StoreError::ResourceInit { source } => write!(f, "unable to allocate alignment: {}", source),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Open { source, .. } => Some(source),
            StoreError::Header { source, .. } => Some(source),
            StoreError::ResourceInit { source } => Some(source),
        }
    }
}

impl From<TryReserveError> for StoreError {
    fn from(source: TryReserveError) -> Self {
        StoreError::ResourceInit { source }
    }
}

/// Where the alignment stream is read from.
#[derive(Clone, Debug)]
pub enum Source {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Bytes(_) => write!(f, "<memory>"),
        }
    }
}

impl Source {
    fn open(
        &self,
    ) -> Result<Box<dyn BufRead>, std::io::Error> {
        let mut conn: Box<dyn BufRead> = match self {
            Source::Path(path) => Box::new(BufReader::new(File::open(path)?)),
            Source::Bytes(bytes) => Box::new(Cursor::new(Arc::clone(bytes))),
        };
        let is_gzip = conn.fill_buf()?.starts_with(&GZIP_MAGIC);
        if is_gzip {
            Ok(Box::new(BufReader::new(MultiGzDecoder::new(conn))))
        } else {
            Ok(conn)
        }
    }
}

pub struct AlignmentStore {
    source: Source,
    reader: sam::io::Reader<Box<dyn BufRead>>,
    sam_header: sam::Header,
    targets: TargetTable,

    // Reused between calls to read_record
    record: RecordBuf,
}

impl AlignmentStore {
    /// Opens the file at `path` and reads its header.
    pub fn open<P: AsRef<Path>>(
        path: P,
    ) -> Result<Self, StoreError> {
        Self::open_source(Source::Path(path.as_ref().to_path_buf()))
    }

    /// Reads the alignment stream from memory.
    pub fn from_bytes<B: Into<Arc<[u8]>>>(
        bytes: B,
    ) -> Result<Self, StoreError> {
        Self::open_source(Source::Bytes(bytes.into()))
    }

    pub fn open_source(
        source: Source,
    ) -> Result<Self, StoreError> {
        let conn = source.open().map_err(|e| StoreError::Open { source_name: source.to_string(), source: e })?;
        let mut reader = sam::io::Reader::new(conn);
        let sam_header = reader.read_header().map_err(|e| StoreError::Header { source_name: source.to_string(), source: e })?;
        let targets = TargetTable::from_sam_header(&sam_header);

        log::debug!("opened {} with {} target sequences", source, targets.len());

        Ok(AlignmentStore{
            source, reader, sam_header, targets,
            record: RecordBuf::default(),
        })
    }

    /// Target sequences declared in the header.
    pub fn header(&self) -> &TargetTable {
        &self.targets
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Reads the next record in stream order into `dst`.
    ///
    /// Returns false at the end of the stream, in which case `dst` is left as
    /// it was.
    ///
    /// ## Errors
    ///
    /// Returns an error if reading fails or the record is malformed.
    ///
    pub fn read_record(
        &mut self,
        dst: &mut RawAlignmentRecord,
    ) -> Result<bool, E> {
        let nbytes = self.reader.read_record_buf(&self.sam_header, &mut self.record)?;
        if nbytes == 0 {
            return Ok(false)
        }
        dst.fill_from(&self.record)?;
        Ok(true)
    }

    /// Reopens the input from the beginning and reads the header again.
    ///
    /// If reopening fails the store is left unchanged.
    pub fn reset(
        &mut self,
    ) -> Result<(), StoreError> {
        *self = Self::open_source(self.source.clone())?;
        Ok(())
    }
}

// Tests
#[cfg(test)]
mod tests {

    const SAM: &[u8] = b"@HD\tVN:1.6\n@SQ\tSN:chr\tLN:1000\n@SQ\tSN:plasmid\tLN:50\nr1\t0\tchr\t11\t60\t4M\t*\t0\t0\tACGT\t?@AB\nr2\t4\t*\t0\t0\t*\t*\t0\t0\tAC\t*\nr3\t16\tplasmid\t1\t7\t2M\t*\t0\t0\tAC\t*\n";

    fn gzip(data: &[u8]) -> Vec<u8> {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn read_names(store: &mut super::AlignmentStore) -> Vec<Vec<u8>> {
        use super::record::RawAlignmentRecord;

        let mut record = RawAlignmentRecord::default();
        let mut names = Vec::new();
        while store.read_record(&mut record).unwrap() {
            names.push(record.name.clone());
        }
        names
    }

    #[test]
    fn from_bytes_reads_all_records() {
        use super::AlignmentStore;

        let mut store = AlignmentStore::from_bytes(SAM).unwrap();

        assert_eq!(store.header().len(), 2);
        assert_eq!(store.header().name(1).unwrap(), "plasmid");
        assert_eq!(read_names(&mut store), vec![b"r1".to_vec(), b"r2".to_vec(), b"r3".to_vec()]);
    }

    #[test]
    fn read_record_after_eof() {
        use super::AlignmentStore;
        use super::record::RawAlignmentRecord;

        let mut store = AlignmentStore::from_bytes(SAM).unwrap();
        let _ = read_names(&mut store);

        let mut record = RawAlignmentRecord::default();
        assert!(!store.read_record(&mut record).unwrap());
        assert!(!store.read_record(&mut record).unwrap());
    }

    #[test]
    fn from_bytes_gzip() {
        use super::AlignmentStore;

        let mut store = AlignmentStore::from_bytes(gzip(SAM)).unwrap();

        assert_eq!(store.header().name(0).unwrap(), "chr");
        assert_eq!(read_names(&mut store).len(), 3);
    }

    #[test]
    fn from_bytes_headerless() {
        use super::AlignmentStore;

        let mut store = AlignmentStore::from_bytes(b"r1\t4\t*\t0\t0\t*\t*\t0\t0\t*\t*\n".to_vec()).unwrap();

        assert!(store.header().is_empty());
        assert_eq!(read_names(&mut store), vec![b"r1".to_vec()]);
    }

    #[test]
    fn reset_rewinds_stream() {
        use super::AlignmentStore;

        let mut store = AlignmentStore::from_bytes(SAM).unwrap();
        let first = read_names(&mut store);
        store.reset().unwrap();
        let second = read_names(&mut store);

        assert_eq!(first, second);
        assert_eq!(store.header().len(), 2);
    }

    #[test]
    fn open_missing_file() {
        use super::AlignmentStore;
        use super::StoreError;

        let got = AlignmentStore::open("/nonexistent/samlap/input.sam");
        assert!(matches!(got, Err(StoreError::Open { .. })));
        let message = got.err().unwrap().to_string();
        assert!(message.starts_with("unable to open file /nonexistent/samlap/input.sam"));
    }

    #[test]
    fn malformed_header() {
        use super::AlignmentStore;
        use super::StoreError;

        let got = AlignmentStore::from_bytes(b"@SQ\tSN:chr\tLN:notanumber\n".to_vec());
        assert!(matches!(got, Err(StoreError::Header { .. })));
    }

    #[test]
    fn malformed_record() {
        use super::AlignmentStore;
        use super::record::RawAlignmentRecord;

        let mut store = AlignmentStore::from_bytes(b"@SQ\tSN:chr\tLN:10\nr1\tnotaflag\tchr\t1\t60\t1M\t*\t0\t0\tA\t*\n".to_vec()).unwrap();
        let mut record = RawAlignmentRecord::default();
        assert!(store.read_record(&mut record).is_err());
    }
}
