//! Pending file attachments.
//!
//! Attachments live only in memory until the next submission, after which
//! the list is cleared whether or not the request succeeded.

use std::path::Path;

/// A named binary blob picked by the user.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name sent with the upload and shown on the badge.
    pub name: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Create an attachment from a name and its contents.
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk. The attachment is named after the file.
    pub fn from_path(path: &Path) -> Result<Self, AttachmentError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| AttachmentError::NoFileName(path.display().to_string()))?;

        if path.is_dir() {
            return Err(AttachmentError::IsDirectory(path.display().to_string()));
        }

        let bytes = std::fs::read(path).map_err(|source| AttachmentError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Ok(Self { name, bytes })
    }

    /// Size of the contents in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the file is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Contents are elided so logs stay readable.
impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Errors that can occur while picking a file.
#[derive(Debug, thiserror::Error)]
pub enum AttachmentError {
    /// The path has no final component.
    #[error("not a file: {0}")]
    NoFileName(String),

    /// The path is a directory.
    #[error("{0} is a directory")]
    IsDirectory(String),

    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
