use std::fmt;

/// Provenance of a parameter value: how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// never assigned
    Unset,
    /// assigned by application code
    Set,
    Query,
    Form,
    Json,
    File,
    /// bound from a `:name` route segment
    Url,
    /// bound by an event listener
    Event,
    /// filled in from a declared default
    Default,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Unset => "unset",
            Source::Set => "set",
            Source::Query => "query",
            Source::Form => "form",
            Source::Json => "json",
            Source::File => "file",
            Source::Url => "url",
            Source::Event => "event",
            Source::Default => "default",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
