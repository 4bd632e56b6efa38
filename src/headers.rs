//! Ordered, case-insensitive-lookup header collection.
//!
//! Modeled on `boomnet::http::Headers`: an insertion-ordered sequence of
//! pairs rather than a hash map, since both the wire encoder (original case,
//! original order) and the redirect/framing logic (case-insensitive name
//! match, case-sensitive value match) need different facets of the same data.

use smallvec::SmallVec;

/// A header collection that preserves insertion order and original name case.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    inner: SmallVec<[(String, String); 16]>,
}

impl Headers {
    /// Creates an empty header collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header, preserving any existing header of the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Removes every header matching `name` (case-insensitive).
    pub fn remove(&mut self, name: &str) {
        self.inner.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    /// Returns the value of the first header matching `name` (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if a header named `name` is present (case-insensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns `true` if a header matching `name` is present with the given
    /// exact (case-sensitive) value.
    pub fn has_value(&self, name: &str, value: &str) -> bool {
        self.inner
            .iter()
            .any(|(k, v)| k.eq_ignore_ascii_case(name) && v == value)
    }

    /// Returns `true` if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates over the headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Headers {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_insert_and_preserve_order() {
        let mut headers = Headers::new();
        headers.insert("X-Foo", "1");
        headers.insert("x-bar", "2");

        let mut iter = headers.iter();
        assert_eq!(Some(("X-Foo", "1")), iter.next());
        assert_eq!(Some(("x-bar", "2")), iter.next());
        assert_eq!(None, iter.next());
    }

    #[test]
    fn should_look_up_case_insensitively() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/plain");

        assert_eq!(Some("text/plain"), headers.get("content-type"));
        assert!(headers.contains("CONTENT-TYPE"));
    }

    #[test]
    fn should_match_value_case_sensitively() {
        let mut headers = Headers::new();
        headers.insert("Transfer-Encoding", "chunked");

        assert!(headers.has_value("transfer-encoding", "chunked"));
        assert!(!headers.has_value("transfer-encoding", "Chunked"));
    }

    #[test]
    fn should_remove_by_name() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "a");
        headers.insert("Content-Length", "1");
        headers.remove("content-type");

        assert!(!headers.contains("Content-Type"));
        assert!(headers.contains("Content-Length"));
    }
}
