use crate::rule::number::Numeric;
use crate::rule::{Rule, RuleKind};
use crate::{UploadedFile, Value};
use tracing::debug;

/// An uploaded file that is still present on disk.
///
/// Exports as a descriptor object (`name`, `path`, `mime`, `size`), which sanitizes back to the
/// same file.
#[derive(Debug, Clone, Copy)]
pub struct FileRule;

impl FileRule {
    fn read(raw: &Value) -> Option<UploadedFile> {
        let file = match raw {
            Value::File(file) => file.clone(),
            Value::Map(map) => {
                let path = map.get("path").and_then(Value::as_str)?;
                let name = map.get("name").and_then(Value::as_str).unwrap_or_default();
                let mime = map.get("mime").and_then(Value::as_str).unwrap_or_default();
                let size = map.get("size").and_then(Numeric::read).map_or(0, |n| n.to_i64());
                UploadedFile::new(name, path, mime, u64::try_from(size).unwrap_or_default())
            }
            _ => return None,
        };
        if !file.exists() {
            debug!(path = %file.path().display(), "uploaded file is gone");
            return None;
        }
        Some(file)
    }
}

impl Rule for FileRule {
    fn kind(&self) -> RuleKind {
        RuleKind::File
    }

    fn sanitize(&self, raw: &Value) -> Option<Value> {
        Self::read(raw).map(Value::File)
    }

    fn export(&self, value: &Value) -> Option<Value> {
        Self::read(value).map(|file| Value::from(file.to_json()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn existing_file() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        temp.write_all(b"abc").unwrap();
        let file = UploadedFile::new("a.txt", temp.path(), "text/plain", 3);

        assert_eq!(FileRule.sanitize(&Value::File(file.clone())), Some(Value::File(file.clone())));

        let exported = FileRule.export(&Value::File(file)).unwrap();
        assert_eq!(exported.as_map().and_then(|m| m.get("size")), Some(&Value::Int(3)));
        assert_eq!(FileRule.export(&exported), Some(exported));
    }

    #[test]
    fn missing_file() {
        let file = UploadedFile::new("gone.txt", "/definitely/not/here.txt", "text/plain", 3);
        assert_eq!(FileRule.sanitize(&Value::File(file)), None);
        assert_eq!(FileRule.sanitize(&"gone.txt".into()), None);
    }
}
