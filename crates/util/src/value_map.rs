//! Ordered multi-valued maps decoded from `application/x-www-form-urlencoded` text.
//!
//! Query strings and form bodies share the same encoding, so both are held in a
//! [`ValueMap`]. Keys keep their first-seen order and every occurrence of a key is
//! retained, which lets callers choose between the primary value ([`ValueMap::get`])
//! and all occurrences ([`ValueMap::get_all`]).

use indexmap::IndexMap;
use url::form_urlencoded;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueMap {
    entries: IndexMap<String, Vec<String>>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode url-encoded pairs such as `rival=acid.burn&bacon=slice&bacon=bits`.
    ///
    /// A single leading `?` is ignored so raw query strings can be passed as-is.
    ///
    /// ```rust
    /// use routebind_util::ValueMap;
    ///
    /// let values = ValueMap::parse("?bacon=slice&bacon=bits&handle=lord.nikon");
    /// assert_eq!(values.get("bacon"), Some("slice"));
    /// assert_eq!(values.get_all("bacon"), ["slice", "bits"]);
    /// assert_eq!(values.get("missing"), None);
    /// ```
    pub fn parse(encoded: &str) -> Self {
        let encoded = encoded.strip_prefix('?').unwrap_or(encoded);
        form_urlencoded::parse(encoded.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }

    /// Append a value under `key`, keeping any existing occurrences.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(key.into()).or_default().push(value.into());
    }

    /// Replace every occurrence of `key` with a single value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), vec![value.into()]);
    }

    /// The primary (first) value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|values| values.first()).map(String::as_str)
    }

    /// Every value stored under `key`, in insertion order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Re-encode the map, emitting one `key=value` pair per occurrence.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.entries {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }
}

impl<K, V> FromIterator<(K, V)> for ValueMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = ValueMap::new();
        for (key, value) in iter {
            map.add(key, value);
        }
        map
    }
}
