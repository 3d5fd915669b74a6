//! Route templates and path-variable extraction.
//!
//! Templates use the familiar `{name}` placeholder format (`/display/{type}`).
//! Matching a concrete request path against a template yields the
//! [`PathVariables`] bound to each placeholder; [`RouteTemplate::expand`] goes
//! the other way and builds a concrete path from variables.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use regex::Regex;
use thiserror::Error;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]*)\}").expect("placeholder pattern"));

/// Everything except RFC3986 unreserved bytes (`A-Z a-z 0-9 - . _ ~`) is encoded.
const PATH_PLACEHOLDER_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Error returned when a route template is malformed.
#[derive(Debug, Error)]
pub enum RouteTemplateError {
    #[error("route template '{template}' has unbalanced braces")]
    UnbalancedBraces { template: String },
    #[error("route template '{template}' has an empty placeholder")]
    EmptyPlaceholder { template: String },
    #[error("route template '{template}' declares placeholder '{name}' more than once")]
    DuplicatePlaceholder { template: String, name: String },
    #[error("route template '{template}' has placeholder '{name}' containing '/'")]
    InvalidPlaceholder { template: String, name: String },
    #[error("route template produced an invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Values captured from a matched route, keyed by placeholder name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathVariables {
    values: IndexMap<String, String>,
}

impl PathVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for PathVariables
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut variables = PathVariables::new();
        for (name, value) in iter {
            variables.insert(name, value);
        }
        variables
    }
}

/// A parsed route template such as `/display/{type}/`.
#[derive(Debug, Clone)]
pub struct RouteTemplate {
    template: String,
    placeholders: Vec<String>,
    pattern: Regex,
}

impl RouteTemplate {
    /// Parse a template, validating its placeholders.
    ///
    /// A single trailing slash is optional when matching, so `/display/{type}`
    /// and `/display/{type}/` accept the same paths.
    pub fn parse(template: &str) -> Result<Self, RouteTemplateError> {
        let mut placeholders: Vec<String> = Vec::new();
        let mut pattern = String::from("^");
        let mut literal_start = 0;

        let trimmed = match template.strip_suffix('/') {
            Some(rest) if !rest.is_empty() => rest,
            _ => template,
        };

        for capture in PLACEHOLDER.captures_iter(trimmed) {
            let (Some(whole), Some(name)) = (capture.get(0), capture.get(1)) else {
                continue;
            };
            let name = name.as_str().trim();
            if name.is_empty() {
                return Err(RouteTemplateError::EmptyPlaceholder {
                    template: template.to_string(),
                });
            }
            if name.contains('/') {
                return Err(RouteTemplateError::InvalidPlaceholder {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }
            if placeholders.iter().any(|existing| existing == name) {
                return Err(RouteTemplateError::DuplicatePlaceholder {
                    template: template.to_string(),
                    name: name.to_string(),
                });
            }

            let literal = &trimmed[literal_start..whole.start()];
            check_balanced(template, literal)?;
            pattern.push_str(&regex::escape(literal));
            pattern.push_str("([^/]+)");
            placeholders.push(name.to_string());
            literal_start = whole.end();
        }

        let tail = &trimmed[literal_start..];
        check_balanced(template, tail)?;
        pattern.push_str(&regex::escape(tail));
        if trimmed != "/" {
            pattern.push_str("/?");
        }
        pattern.push('$');

        Ok(Self {
            template: template.to_string(),
            placeholders,
            pattern: Regex::new(&pattern)?,
        })
    }

    /// The template text as written.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Placeholder names in template order.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Match a request path (without query string) and capture its variables.
    ///
    /// Captured segments are percent-decoded.
    ///
    /// ```rust
    /// use routebind_util::RouteTemplate;
    ///
    /// let route = RouteTemplate::parse("/display/{type}").unwrap();
    /// let variables = route.matches("/display/activeMatrix").unwrap();
    /// assert_eq!(variables.get("type"), Some("activeMatrix"));
    /// assert!(route.matches("/display").is_none());
    /// ```
    pub fn matches(&self, path: &str) -> Option<PathVariables> {
        let captures = self.pattern.captures(path)?;
        let variables = self
            .placeholders
            .iter()
            .zip(captures.iter().skip(1))
            .filter_map(|(name, value)| {
                let raw = value?.as_str();
                Some((name.clone(), percent_decode_str(raw).decode_utf8_lossy().into_owned()))
            })
            .collect();
        Some(variables)
    }

    /// Build a concrete path by substituting variables into the template.
    ///
    /// Values are percent-encoded, preserving unreserved bytes. Placeholders
    /// without a value are left unchanged.
    pub fn expand(&self, variables: &PathVariables) -> String {
        PLACEHOLDER
            .replace_all(&self.template, |capture: &regex::Captures| {
                let name = capture[1].trim();
                match variables.get(name) {
                    Some(value) => utf8_percent_encode(value, PATH_PLACEHOLDER_VALUE).to_string(),
                    None => capture[0].to_string(),
                }
            })
            .into_owned()
    }
}

fn check_balanced(template: &str, literal: &str) -> Result<(), RouteTemplateError> {
    if literal.contains(['{', '}']) {
        return Err(RouteTemplateError::UnbalancedBraces {
            template: template.to_string(),
        });
    }
    Ok(())
}

/// The outcome of routing a path: which template matched and what it captured.
#[derive(Debug, Clone)]
pub struct RouteMatch<'router> {
    pub template: &'router RouteTemplate,
    pub variables: PathVariables,
}

/// An ordered table of route templates. The first matching template wins.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<RouteTemplate>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and append a template.
    pub fn add(&mut self, template: &str) -> Result<&mut Self, RouteTemplateError> {
        self.routes.push(RouteTemplate::parse(template)?);
        Ok(self)
    }

    /// Build a router from several templates, in priority order.
    pub fn from_templates<'a>(templates: impl IntoIterator<Item = &'a str>) -> Result<Self, RouteTemplateError> {
        let routes = templates.into_iter().map(RouteTemplate::parse).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { routes })
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn route(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.iter().find_map(|template| {
            template.matches(path).map(|variables| RouteMatch { template, variables })
        })
    }
}
