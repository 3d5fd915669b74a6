//! Request value sources and the sets fields declare over them.

use std::{error::Error, fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One of the places a field value can be read from in an incoming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    /// The URL query string (`?rival=acid.burn`).
    Query,
    /// Submitted form data: the request body values first, then the general parsed form.
    Form,
    /// A placeholder captured by the router from the matched route (`/display/{type}`).
    Path,
}

impl ValueSource {
    /// Fixed order in which declared sources are consulted.
    pub const PRECEDENCE: [ValueSource; 3] = [ValueSource::Query, ValueSource::Form, ValueSource::Path];

    /// Canonical lowercase name used in schemas and annotations.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueSource::Query => "query",
            ValueSource::Form => "form",
            ValueSource::Path => "path",
        }
    }

    fn bit(self) -> u8 {
        match self {
            ValueSource::Query => 0b001,
            ValueSource::Form => 0b010,
            ValueSource::Path => 0b100,
        }
    }
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueSource {
    type Err = UnknownSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(Self::Query),
            "form" => Ok(Self::Form),
            "path" => Ok(Self::Path),
            other => Err(UnknownSourceError { name: other.to_string() }),
        }
    }
}

/// Error returned when a source name is not one of `query`, `form` or `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSourceError {
    /// The name that failed to parse.
    pub name: String,
}

impl fmt::Display for UnknownSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value source '{}'; expected 'query', 'form' or 'path'", self.name)
    }
}

impl Error for UnknownSourceError {}

/// The sources a field accepts values from.
///
/// Membership is all that is recorded; the order in which members are consulted
/// is always [`ValueSource::PRECEDENCE`], regardless of how the set was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SourceSet {
    bits: u8,
}

impl SourceSet {
    /// A set that accepts no source. Fields declared with it never resolve.
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Build a set from a slice of sources. Duplicates are ignored.
    pub fn of(sources: &[ValueSource]) -> Self {
        sources.iter().fold(Self::empty(), |set, source| set.with(*source))
    }

    /// Return a copy of this set that also accepts `source`.
    #[must_use]
    pub fn with(self, source: ValueSource) -> Self {
        Self {
            bits: self.bits | source.bit(),
        }
    }

    pub fn contains(&self, source: ValueSource) -> bool {
        self.bits & source.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Members in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = ValueSource> {
        let set = *self;
        ValueSource::PRECEDENCE.into_iter().filter(move |source| set.contains(*source))
    }

    /// Parse a comma-separated annotation such as `"query, form"`.
    ///
    /// Blank entries and surrounding whitespace are ignored, so `""` yields the
    /// empty set.
    pub fn parse_annotation(annotation: &str) -> Result<Self, UnknownSourceError> {
        annotation
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .try_fold(Self::empty(), |set, name| Ok(set.with(name.parse()?)))
    }
}

impl FromIterator<ValueSource> for SourceSet {
    fn from_iter<T: IntoIterator<Item = ValueSource>>(iter: T) -> Self {
        iter.into_iter().fold(Self::empty(), SourceSet::with)
    }
}

impl fmt::Display for SourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|source| source.as_str()).collect();
        f.write_str(&names.join(","))
    }
}

impl Serialize for SourceSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for SourceSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Accept either a list (`[query, form]`) or the annotation form (`"query,form"`).
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            List(Vec<ValueSource>),
            Annotation(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::List(sources) => Ok(sources.into_iter().collect()),
            Repr::Annotation(text) => SourceSet::parse_annotation(&text).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_in_precedence_order_regardless_of_construction() {
        let set = SourceSet::of(&[ValueSource::Path, ValueSource::Query, ValueSource::Form]);
        let order: Vec<_> = set.iter().collect();
        assert_eq!(order, vec![ValueSource::Query, ValueSource::Form, ValueSource::Path]);
    }

    #[test]
    fn empty_set_has_no_members() {
        let set = SourceSet::empty();
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
        assert_eq!(set, SourceSet::default());
    }

    #[test]
    fn parses_annotation_with_whitespace_and_blanks() {
        let set = SourceSet::parse_annotation(" form , ,path").unwrap();
        assert!(set.contains(ValueSource::Form));
        assert!(set.contains(ValueSource::Path));
        assert!(!set.contains(ValueSource::Query));
        assert!(SourceSet::parse_annotation("").unwrap().is_empty());
    }

    #[test]
    fn rejects_unknown_source_names() {
        let error = SourceSet::parse_annotation("query,header").unwrap_err();
        assert_eq!(error.name, "header");
        assert!(error.to_string().contains("'header'"));
    }

    #[test]
    fn deserializes_list_and_annotation_forms() {
        let from_list: SourceSet = serde_json::from_str(r#"["path", "query"]"#).unwrap();
        let from_text: SourceSet = serde_json::from_str(r#""query,path""#).unwrap();
        assert_eq!(from_list, from_text);
        assert_eq!(serde_json::to_string(&from_list).unwrap(), r#"["query","path"]"#);
    }

    #[test]
    fn displays_members_comma_joined() {
        let set = SourceSet::empty().with(ValueSource::Form).with(ValueSource::Query);
        assert_eq!(set.to_string(), "query,form");
    }
}
