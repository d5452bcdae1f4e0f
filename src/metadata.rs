//! File/directory metadata as returned by `getMetadata` and `readDirectory`.

/// Immutable description of a single directory entry or file, once populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    pub is_directory: bool,
    pub name: String,
    pub size: u64,
    /// Milliseconds since the Unix epoch.
    pub modification_time: u64,
    pub mime_type: Option<String>,
}

impl EntryMetadata {
    /// Convenience constructor for a regular file entry.
    pub fn file(name: impl Into<String>, size: u64, modification_time: u64) -> Self {
        Self {
            is_directory: false,
            name: name.into(),
            size,
            modification_time,
            mime_type: None,
        }
    }

    /// Convenience constructor for a directory entry.
    pub fn directory(name: impl Into<String>, modification_time: u64) -> Self {
        Self {
            is_directory: true,
            name: name.into(),
            size: 0,
            modification_time,
            mime_type: None,
        }
    }
}
