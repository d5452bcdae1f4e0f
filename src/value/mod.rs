//! Typed, kind-tagged output payloads with a streaming [`RequestValue::concat`].

mod read_directory;
mod read_file;

pub use read_directory::ReadDirectoryValue;
pub use read_file::ReadFileValue;

use crate::error::{Error, ErrorKind};
use crate::kind::RequestKind;
use crate::metadata::EntryMetadata;

/// A single-shot metadata response. Additional partial chunks are a protocol error
/// but are tolerated as no-ops by [`RequestValue::concat`] — metadata is a fixed-size
/// record, not a stream.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataValue {
    pub metadata: EntryMetadata,
}

/// The closed union of per-kind response payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestValue {
    Metadata(MetadataValue),
    ReadDirectory(ReadDirectoryValue),
    ReadFile(ReadFileValue),
    /// The empty payload produced by `mount`, `unmount`, `openFile` (aside from the
    /// resolved open request ID, carried out-of-band — see §6), `closeFile`, and
    /// `abort`.
    Unit,
}

impl RequestValue {
    /// Whether `self` is the producing-variant shape expected for `kind`'s response.
    pub fn matches_kind(&self, kind: RequestKind) -> bool {
        match (self, kind) {
            (RequestValue::Metadata(_), RequestKind::GetMetadata) => true,
            (RequestValue::ReadDirectory(_), RequestKind::ReadDirectory) => true,
            (RequestValue::ReadFile(_), RequestKind::ReadFile) => true,
            (
                RequestValue::Unit,
                RequestKind::Unmount
                | RequestKind::OpenFile
                | RequestKind::CloseFile
                | RequestKind::Abort,
            ) => true,
            _ => false,
        }
    }

    /// Concatenates a same-variant `other` into `self` in place, following the
    /// per-variant semantics in the design: no-op for metadata, ordered append for
    /// directory entries and file bytes, trivial no-op for `Unit`.
    ///
    /// A variant mismatch is a programming error surfaced as
    /// [`ErrorKind::TypeMismatch`] rather than a panic.
    pub fn concat(&mut self, other: RequestValue) -> Result<(), Error> {
        match (self, other) {
            (RequestValue::Metadata(_), RequestValue::Metadata(_)) => Ok(()),
            (RequestValue::ReadDirectory(a), RequestValue::ReadDirectory(b)) => {
                a.entries.extend(b.entries);
                Ok(())
            }
            (RequestValue::ReadFile(a), RequestValue::ReadFile(b)) => {
                a.data.extend(b.data);
                Ok(())
            }
            (RequestValue::Unit, RequestValue::Unit) => Ok(()),
            _ => Err(Error::new(ErrorKind::TypeMismatch)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_concat_is_a_no_op() {
        let mut value = RequestValue::Metadata(MetadataValue {
            metadata: EntryMetadata::file("a", 1, 0),
        });
        let other = RequestValue::Metadata(MetadataValue {
            metadata: EntryMetadata::file("b", 2, 0),
        });
        value.concat(other).unwrap();
        match value {
            RequestValue::Metadata(m) => assert_eq!(m.metadata.name, "a"),
            _ => unreachable!(),
        }
    }

    #[test]
    fn mismatched_variants_report_type_mismatch() {
        let mut value = RequestValue::ReadFile(ReadFileValue { data: vec![1] });
        let other = RequestValue::ReadDirectory(ReadDirectoryValue { entries: vec![] });
        let err = value.concat(other).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        // The accumulator must not be corrupted by a failed concat.
        match value {
            RequestValue::ReadFile(v) => assert_eq!(v.data, vec![1]),
            _ => unreachable!(),
        }
    }

    #[test]
    fn matches_kind_covers_every_producing_kind() {
        assert!(RequestValue::Unit.matches_kind(RequestKind::Unmount));
        assert!(RequestValue::Unit.matches_kind(RequestKind::OpenFile));
        assert!(RequestValue::Unit.matches_kind(RequestKind::CloseFile));
        assert!(RequestValue::Unit.matches_kind(RequestKind::Abort));
        assert!(!RequestValue::Unit.matches_kind(RequestKind::ReadFile));
    }
}
