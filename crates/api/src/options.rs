use serde::Deserialize;
use std::path::PathBuf;

/// Settings applied to every dispatched request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatchOptions {
    /// Where detached data uri files are written; the OS temp dir when unset.
    pub temp_dir: Option<PathBuf>,
    /// Path prefix removed before matching, for mounting behind a reverse proxy.
    pub strip_prefix: Option<String>,
    /// Request parameter that turns on indented json output.
    pub pretty_param: String,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self { temp_dir: None, strip_prefix: None, pretty_param: "pretty".to_owned() }
    }
}

impl DispatchOptions {
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let options: DispatchOptions = serde_json::from_str(r#"{"strip_prefix": "/api"}"#).unwrap();

        assert_eq!(options.strip_prefix.as_deref(), Some("/api"));
        assert_eq!(options.pretty_param, "pretty");
        assert_eq!(options.temp_dir(), std::env::temp_dir());
    }
}
