//! Local file entity

use std::borrow::Cow;

use super::newtypes::RelativePath;

/// A file admitted by the ignore rules, with its full content
///
/// Identity is the relative path. Instances are produced by the collector,
/// never mutated, and dropped once uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    path: RelativePath,
    content: Vec<u8>,
}

impl LocalFile {
    /// Creates a new LocalFile
    pub fn new(path: RelativePath, content: Vec<u8>) -> Self {
        Self { path, content }
    }

    /// Path relative to the project root; also the remote document name
    pub fn path(&self) -> &RelativePath {
        &self.path
    }

    /// Raw file bytes
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Size of the content in bytes
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Content decoded as text for upload
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}
