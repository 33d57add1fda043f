use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempPath;

/// An uploaded file: either handed over by the transport or detached from an inline data uri.
///
/// Files created by the framework hold a shared [`TempPath`]; the file on disk is removed when the
/// last clone of the descriptor is dropped, which happens when the owning request goes away.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    name: String,
    path: PathBuf,
    mime: String,
    size: u64,
    temp: Option<Arc<TempPath>>,
}

#[derive(Serialize)]
pub(crate) struct Descriptor<'a> {
    name: &'a str,
    path: String,
    mime: &'a str,
    size: u64,
}

impl UploadedFile {
    /// Describes a file whose lifetime is managed by someone else.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, mime: impl Into<String>, size: u64) -> Self {
        Self { name: name.into(), path: path.into(), mime: mime.into(), size, temp: None }
    }

    /// Takes ownership of a temporary file, deleting it once every clone is dropped.
    pub fn temporary(name: impl Into<String>, temp: TempPath, mime: impl Into<String>, size: u64) -> Self {
        let path = temp.to_path_buf();
        Self { name: name.into(), path, mime: mime.into(), size, temp: Some(Arc::new(temp)) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Whether the file is still present on disk.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub(crate) fn descriptor(&self) -> Descriptor<'_> {
        Descriptor { name: &self.name, path: self.path.to_string_lossy().into_owned(), mime: &self.mime, size: self.size }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "path": self.path.to_string_lossy(),
            "mime": self.mime,
            "size": self.size,
        })
    }
}

impl PartialEq for UploadedFile {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.path == other.path && self.mime == other.mime && self.size == other.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn temporary_file_removed_with_last_clone() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();
        let temp = file.into_temp_path();
        let path = temp.to_path_buf();

        let uploaded = UploadedFile::temporary("hello.txt", temp, "text/plain", 5);
        let cloned = uploaded.clone();
        assert!(uploaded.exists());

        drop(uploaded);
        assert!(path.is_file());

        drop(cloned);
        assert!(!path.exists());
    }

    #[test]
    fn borrowed_file_is_left_alone() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let uploaded = UploadedFile::new("a.bin", file.path(), "application/octet-stream", 0);
        assert!(!uploaded.is_temporary());

        drop(uploaded);
        assert!(file.path().is_file());
    }
}
