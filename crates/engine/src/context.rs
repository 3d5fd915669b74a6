//! Request context: the read-only value stores a field can be resolved from.

use routebind_util::{PathVariables, Router, ValueMap};
use thiserror::Error;
use url::Url;

/// A key to string(s) lookup over one part of a request.
///
/// Lookups never fail; a missing key is `None`.
pub trait SourceProvider: Send + Sync {
    /// The primary value stored under `key`.
    fn lookup(&self, key: &str) -> Option<&str>;

    /// Every value stored under `key`, in request order.
    fn lookup_all(&self, key: &str) -> Vec<&str> {
        self.lookup(key).into_iter().collect()
    }
}

impl SourceProvider for ValueMap {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key)
    }

    fn lookup_all(&self, key: &str) -> Vec<&str> {
        self.get_all(key).iter().map(String::as_str).collect()
    }
}

impl SourceProvider for PathVariables {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.get(key)
    }
}

/// Error raised while assembling a [`RequestContext`].
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("no route matched request path '{path}'")]
    NoRouteMatch { path: String },
}

/// The stores backing one inbound request.
///
/// Query, submitted-form, general-form and path-variable stores are independent;
/// none is derived from another. The context is immutable once built.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    path: String,
    query: ValueMap,
    submitted_form: ValueMap,
    form: ValueMap,
    path_variables: PathVariables,
}

impl RequestContext {
    pub fn builder<'router>() -> RequestContextBuilder<'router> {
        RequestContextBuilder::default()
    }

    /// Request path without query string or fragment.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Values from the URL query string.
    pub fn query(&self) -> &dyn SourceProvider {
        &self.query
    }

    /// Values submitted in the request body.
    pub fn submitted_form(&self) -> &dyn SourceProvider {
        &self.submitted_form
    }

    /// General parsed form values.
    pub fn form(&self) -> &dyn SourceProvider {
        &self.form
    }

    /// Placeholders captured by the router for the matched route.
    pub fn path_variables(&self) -> &dyn SourceProvider {
        &self.path_variables
    }
}

/// Builder for [`RequestContext`].
#[derive(Debug, Default)]
pub struct RequestContextBuilder<'router> {
    uri: Option<String>,
    submitted_form: ValueMap,
    form: ValueMap,
    path_variables: PathVariables,
    router: Option<&'router Router>,
}

impl<'router> RequestContextBuilder<'router> {
    /// Request target: either a path with optional query (`/display/x?rival=y`)
    /// or an absolute URL.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn submitted_form(mut self, values: ValueMap) -> Self {
        self.submitted_form = values;
        self
    }

    pub fn form(mut self, values: ValueMap) -> Self {
        self.form = values;
        self
    }

    /// Path variables supplied directly instead of, or in addition to, routing.
    pub fn path_variables(mut self, variables: PathVariables) -> Self {
        self.path_variables = variables;
        self
    }

    /// Route the request path through `router` when building. Variables
    /// captured by the matched route take precedence over ones set directly.
    pub fn route(mut self, router: &'router Router) -> Self {
        self.router = Some(router);
        self
    }

    pub fn build(self) -> Result<RequestContext, RequestError> {
        let (path, query) = split_uri(self.uri.as_deref().unwrap_or("/"));
        let mut path_variables = self.path_variables;

        if let Some(router) = self.router.filter(|router| !router.is_empty()) {
            let matched = router.route(&path).ok_or_else(|| RequestError::NoRouteMatch { path: path.clone() })?;
            for (name, value) in matched.variables.iter() {
                path_variables.insert(name, value);
            }
        }

        Ok(RequestContext {
            path,
            query: ValueMap::parse(&query),
            submitted_form: self.submitted_form,
            form: self.form,
            path_variables,
        })
    }
}

fn split_uri(uri: &str) -> (String, String) {
    if let Ok(url) = Url::parse(uri) {
        return (url.path().to_string(), url.query().unwrap_or_default().to_string());
    }
    let without_fragment = uri.split_once('#').map_or(uri, |(before, _)| before);
    let (path, query) = without_fragment.split_once('?').unwrap_or((without_fragment, ""));
    let path = if path.is_empty() { "/" } else { path };
    (path.to_string(), query.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_relative_uri_into_path_and_query() {
        let context = RequestContext::builder()
            .uri("/salty/meats/?bacon=slice&bacon=bits#top")
            .build()
            .unwrap();
        assert_eq!(context.path(), "/salty/meats/");
        assert_eq!(context.query().lookup("bacon"), Some("slice"));
        assert_eq!(context.query().lookup_all("bacon"), vec!["slice", "bits"]);
    }

    #[test]
    fn accepts_absolute_urls() {
        let context = RequestContext::builder()
            .uri("http://127.0.0.1:8080/display/activeMatrix/?rival=crash.override")
            .build()
            .unwrap();
        assert_eq!(context.path(), "/display/activeMatrix/");
        assert_eq!(context.query().lookup("rival"), Some("crash.override"));
    }

    #[test]
    fn routes_path_variables_through_router() {
        let router = Router::from_templates(["/display/{type}/"]).unwrap();
        let context = RequestContext::builder()
            .uri("/display/activeMatrix/?rival=crash.override")
            .route(&router)
            .build()
            .unwrap();
        assert_eq!(context.path_variables().lookup("type"), Some("activeMatrix"));
    }

    #[test]
    fn unmatched_route_is_an_error() {
        let router = Router::from_templates(["/display/{type}"]).unwrap();
        let error = RequestContext::builder().uri("/salty/meats").route(&router).build().unwrap_err();
        assert!(matches!(error, RequestError::NoRouteMatch { ref path } if path == "/salty/meats"));
    }

    #[test]
    fn routed_variables_override_direct_ones() {
        let router = Router::from_templates(["/display/{type}"]).unwrap();
        let direct: PathVariables = [("type", "passiveMatrix"), ("theme", "dark")].into_iter().collect();
        let context = RequestContext::builder()
            .uri("/display/activeMatrix")
            .path_variables(direct)
            .route(&router)
            .build()
            .unwrap();
        assert_eq!(context.path_variables().lookup("type"), Some("activeMatrix"));
        assert_eq!(context.path_variables().lookup("theme"), Some("dark"));
    }

    #[test]
    fn path_store_returns_single_value_for_lookup_all() {
        let variables: PathVariables = [("type", "activeMatrix")].into_iter().collect();
        assert_eq!(variables.lookup_all("type"), vec!["activeMatrix"]);
        assert!(variables.lookup_all("missing").is_empty());
    }

    #[test]
    fn empty_uri_defaults_to_root() {
        let context = RequestContext::builder().build().unwrap();
        assert_eq!(context.path(), "/");
        assert!(context.query().lookup("anything").is_none());
    }
}
