//! # Field value resolution
//!
//! Decides which request source answers for a field and what counts as found.
//!
//! Declared sources are consulted in the fixed order query, form, path:
//!
//! 1. **Query**: the query-string value, if non-empty.
//! 2. **Form**: the submitted-body value, else the general form value, if non-empty.
//! 3. **Path**: the router's placeholder value, returned as-is even when empty.
//!
//! The first non-empty value wins. An empty value and a missing key are the
//! same thing here, so a declared source with nothing to offer is skipped
//! rather than reported. Undeclared sources are never consulted, and a field
//! that declares no source always resolves to the empty string.
//!
//! Resolution is total and side-effect free: no errors, no logging, no state
//! kept between calls.
//!
//! ```rust
//! use routebind_engine::{RequestContext, resolve};
//! use routebind_types::{SourceSet, ValueSource};
//!
//! let context = RequestContext::builder().uri("/root/period/?rival=acid.burn").build().unwrap();
//! let query = SourceSet::of(&[ValueSource::Query]);
//!
//! assert_eq!(resolve(Some(&context), "rival", query), "acid.burn");
//! assert_eq!(resolve(None, "rival", query), "");
//! assert_eq!(resolve(Some(&context), "rival", SourceSet::empty()), "");
//! ```

use routebind_types::{SourceSet, ValueSource};

use crate::context::{RequestContext, SourceProvider};

/// The value chosen for a field and the source that supplied it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved value; empty when nothing was found.
    pub value: String,
    /// Source that supplied the value, or `None` when no source answered.
    ///
    /// A path lookup always reports [`ValueSource::Path`], even when its value is empty.
    pub source: Option<ValueSource>,
}

impl Resolution {
    fn found(value: &str, source: ValueSource) -> Self {
        Self {
            value: value.to_string(),
            source: Some(source),
        }
    }

    /// Whether a non-empty value was resolved.
    pub fn is_found(&self) -> bool {
        !self.value.is_empty()
    }
}

/// Resolves field values against a single request.
///
/// The context is optional so callers holding no request (for example a
/// handler invoked without one) can still populate records; every field then
/// resolves to the empty string.
#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'context> {
    context: Option<&'context RequestContext>,
}

impl<'context> FieldResolver<'context> {
    pub fn new(context: Option<&'context RequestContext>) -> Self {
        Self { context }
    }

    /// Resolve `key` against the declared `sources`, returning only the value.
    pub fn resolve(&self, key: &str, sources: SourceSet) -> String {
        self.resolve_detailed(key, sources).value
    }

    /// Resolve `key` against the declared `sources`, reporting which source answered.
    pub fn resolve_detailed(&self, key: &str, sources: SourceSet) -> Resolution {
        let Some(context) = self.context else {
            return Resolution::default();
        };
        if key.is_empty() {
            return Resolution::default();
        }

        for source in sources.iter() {
            match source {
                ValueSource::Query => {
                    if let Some(value) = present(context.query(), key) {
                        return Resolution::found(value, source);
                    }
                }
                ValueSource::Form => {
                    if let Some(value) = present(context.submitted_form(), key).or_else(|| present(context.form(), key)) {
                        return Resolution::found(value, source);
                    }
                }
                // Last in precedence: whatever the router has, including nothing.
                ValueSource::Path => {
                    let value = context.path_variables().lookup(key).unwrap_or_default();
                    return Resolution::found(value, source);
                }
            }
        }

        Resolution::default()
    }
}

/// Resolve a single field value. See the [module documentation](self) for the rules.
pub fn resolve(context: Option<&RequestContext>, key: &str, sources: SourceSet) -> String {
    FieldResolver::new(context).resolve(key, sources)
}

fn present<'store>(store: &'store dyn SourceProvider, key: &str) -> Option<&'store str> {
    store.lookup(key).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use routebind_util::{PathVariables, ValueMap};

    fn all_sources() -> SourceSet {
        SourceSet::of(&[ValueSource::Query, ValueSource::Form, ValueSource::Path])
    }

    fn crowded_context() -> RequestContext {
        RequestContext::builder()
            .uri("/display/activeMatrix?handle=from-query")
            .submitted_form(ValueMap::parse("handle=from-body"))
            .form(ValueMap::parse("handle=from-form"))
            .path_variables([("handle", "from-path")].into_iter().collect())
            .build()
            .unwrap()
    }

    #[test]
    fn no_declared_sources_resolves_empty() {
        let context = crowded_context();
        assert_eq!(resolve(Some(&context), "handle", SourceSet::empty()), "");
    }

    #[test]
    fn absent_context_resolves_empty() {
        assert_eq!(resolve(None, "handle", all_sources()), "");
        assert_eq!(FieldResolver::new(None).resolve_detailed("handle", all_sources()), Resolution::default());
    }

    #[test]
    fn empty_key_resolves_empty() {
        let context = RequestContext::builder()
            .path_variables([("", "anything")].into_iter().collect())
            .build()
            .unwrap();
        assert_eq!(resolve(Some(&context), "", all_sources()), "");
    }

    #[test]
    fn query_wins_over_every_other_source() {
        let context = crowded_context();
        let resolution = FieldResolver::new(Some(&context)).resolve_detailed("handle", all_sources());
        assert_eq!(resolution.value, "from-query");
        assert_eq!(resolution.source, Some(ValueSource::Query));
    }

    #[test]
    fn submitted_body_wins_over_general_form() {
        let context = crowded_context();
        let form_and_path = SourceSet::of(&[ValueSource::Form, ValueSource::Path]);
        assert_eq!(resolve(Some(&context), "handle", form_and_path), "from-body");
    }

    #[test]
    fn general_form_used_when_body_value_is_empty() {
        let context = RequestContext::builder()
            .submitted_form(ValueMap::parse("handle="))
            .form(ValueMap::parse("handle=the.plague"))
            .build()
            .unwrap();
        let form = SourceSet::of(&[ValueSource::Form]);
        assert_eq!(resolve(Some(&context), "handle", form), "the.plague");
    }

    #[test]
    fn undeclared_sources_are_not_consulted() {
        let context = crowded_context();
        assert_eq!(resolve(Some(&context), "handle", SourceSet::of(&[ValueSource::Path])), "from-path");
        assert_eq!(resolve(Some(&context), "missing", SourceSet::of(&[ValueSource::Query])), "");
    }

    #[test]
    fn empty_query_value_falls_through_to_form() {
        let context = RequestContext::builder()
            .uri("/?handle=")
            .submitted_form(ValueMap::parse("handle=lord.nikon"))
            .build()
            .unwrap();
        let query_and_form = SourceSet::of(&[ValueSource::Query, ValueSource::Form]);
        assert_eq!(resolve(Some(&context), "handle", query_and_form), "lord.nikon");
    }

    #[test]
    fn path_returns_raw_lookup_even_when_missing() {
        let context = RequestContext::builder().uri("/?type=ignored").build().unwrap();
        let resolution = FieldResolver::new(Some(&context)).resolve_detailed("type", SourceSet::of(&[ValueSource::Path]));
        assert_eq!(resolution.value, "");
        assert_eq!(resolution.source, Some(ValueSource::Path));
        assert!(!resolution.is_found());
    }

    #[test]
    fn path_is_reached_after_empty_query_and_form() {
        let variables: PathVariables = [("type", "activeMatrix")].into_iter().collect();
        let context = RequestContext::builder()
            .uri("/display/activeMatrix?type=")
            .path_variables(variables)
            .build()
            .unwrap();
        assert_eq!(resolve(Some(&context), "type", all_sources()), "activeMatrix");
    }

    #[test]
    fn resolution_is_repeatable() {
        let context = crowded_context();
        let resolver = FieldResolver::new(Some(&context));
        let first = resolver.resolve("handle", all_sources());
        let second = resolver.resolve("handle", all_sources());
        assert_eq!(first, second);
    }
}
