use http::HeaderMap;
use std::collections::BTreeMap;

/// Request headers keyed by display-form names (`Some-Header`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: BTreeMap<String, String>,
}

impl Headers {
    pub fn from_header_map(map: &HeaderMap) -> Self {
        let mut inner: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in map {
            let Ok(value) = value.to_str() else {
                continue;
            };
            inner
                .entry(normalize_name(name.as_str()))
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_owned());
        }
        Self { inner }
    }

    /// The trimmed value of `name`, looked up in any spelling (`x_requested_with`, `X-REQUESTED-WITH`).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(&normalize_name(name)).map(|value| value.trim())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(&normalize_name(name))
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.inner.insert(normalize_name(name), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// `SOME_HEADER` and `some-header` both become `Some-Header`.
pub fn normalize_name(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
            })
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn names_are_normalized() {
        assert_eq!(normalize_name("x_http_method_override"), "X-Http-Method-Override");
        assert_eq!(normalize_name("CONTENT_TYPE"), "Content-Type");
        assert_eq!(normalize_name("cf-connecting-ip"), "Cf-Connecting-Ip");
    }

    #[test]
    fn lookup_in_any_spelling() {
        let mut map = HeaderMap::new();
        map.insert("x-requested-with", HeaderValue::from_static(" XMLHttpRequest "));
        map.append("accept", HeaderValue::from_static("text/html"));
        map.append("accept", HeaderValue::from_static("application/json"));

        let headers = Headers::from_header_map(&map);

        assert_eq!(headers.get("X_REQUESTED_WITH"), Some("XMLHttpRequest"));
        assert_eq!(headers.get("Accept"), Some("text/html, application/json"));
        assert!(headers.contains("x-requested-with"));
        assert!(!headers.contains("authorization"));
        assert_eq!(headers.len(), 2);
    }
}
