//! Writes resolved request values into destination records.
//!
//! A record describes its fields through [`Populate::declarations`]. The
//! [`Populator`] resolves each declared field exactly once and hands the result
//! to [`Populate::assign`], converting it into a list first when the field is
//! declared as one. Fields whose value resolves to the empty string are left
//! untouched.

use routebind_types::{FieldDeclaration, FieldKind, ValueSource};
use routebind_util::BindConfig;
use thiserror::Error;
use tracing::{debug, trace};

use crate::context::RequestContext;
use crate::resolve::{FieldResolver, Resolution};

/// A resolved value shaped for its destination field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Unwrap a scalar, reporting a kind mismatch for `field` otherwise.
    pub fn into_scalar(self, field: &str) -> Result<String, PopulateError> {
        match self {
            FieldValue::Scalar(value) => Ok(value),
            FieldValue::List(_) => Err(PopulateError::KindMismatch {
                field: field.to_string(),
                expected: FieldKind::Scalar,
            }),
        }
    }

    /// Unwrap a list, reporting a kind mismatch for `field` otherwise.
    pub fn into_list(self, field: &str) -> Result<Vec<String>, PopulateError> {
        match self {
            FieldValue::List(values) => Ok(values),
            FieldValue::Scalar(_) => Err(PopulateError::KindMismatch {
                field: field.to_string(),
                expected: FieldKind::List,
            }),
        }
    }
}

/// Error raised by a record while accepting a value.
#[derive(Debug, Error)]
pub enum PopulateError {
    #[error("record has no field named '{field}'")]
    UnknownField { field: String },
    #[error("field '{field}' expects a {expected:?} value")]
    KindMismatch { field: String, expected: FieldKind },
    #[error("field '{field}' rejected value '{value}': {message}")]
    InvalidValue { field: String, value: String, message: String },
}

/// A destination record that can be filled from a request.
pub trait Populate {
    /// Declarations for every field that should be resolved.
    fn declarations(&self) -> Vec<FieldDeclaration>;

    /// Store `value` into `field`.
    fn assign(&mut self, field: &str, value: FieldValue) -> Result<(), PopulateError>;
}

/// Options controlling how values are shaped before assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulatorConfig {
    pub list_delimiter: char,
    pub keep_empty_items: bool,
}

impl Default for PopulatorConfig {
    fn default() -> Self {
        Self::from(&BindConfig::default())
    }
}

impl From<&BindConfig> for PopulatorConfig {
    fn from(config: &BindConfig) -> Self {
        Self {
            list_delimiter: config.list_delimiter,
            keep_empty_items: config.keep_empty_items,
        }
    }
}

/// Drives resolution and assignment for every declared field of a record.
#[derive(Debug, Clone, Default)]
pub struct Populator {
    config: PopulatorConfig,
}

impl Populator {
    pub fn new(config: PopulatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PopulatorConfig {
        &self.config
    }

    /// Resolve and assign each declared field of `target`.
    ///
    /// Stops at the first assignment error; fields assigned before it keep
    /// their new values.
    pub fn populate<T: Populate + ?Sized>(&self, context: Option<&RequestContext>, target: &mut T) -> Result<(), PopulateError> {
        let resolver = FieldResolver::new(context);
        for declaration in target.declarations() {
            let resolution = resolver.resolve_detailed(&declaration.key, declaration.sources);
            if !resolution.is_found() {
                trace!(field = %declaration.field, key = %declaration.key, "No value resolved; leaving field unchanged");
                continue;
            }

            let value = match declaration.kind {
                FieldKind::Scalar => FieldValue::Scalar(resolution.value.clone()),
                FieldKind::List => FieldValue::List(self.list_items(context, &declaration, &resolution)),
            };
            debug!(
                field = %declaration.field,
                key = %declaration.key,
                source = ?resolution.source,
                "Populating field"
            );
            target.assign(&declaration.field, value)?;
        }
        Ok(())
    }

    /// Split a resolved value into list items.
    ///
    /// When the query store supplied the value, every occurrence of the key in
    /// the query string is used (`?bacon=slice&bacon=bits`); otherwise only the
    /// resolved value is. Each occurrence is then split on the delimiter
    /// (`?bacon=slice,bits`).
    fn list_items(&self, context: Option<&RequestContext>, declaration: &FieldDeclaration, resolution: &Resolution) -> Vec<String> {
        let occurrences = match (resolution.source, context) {
            (Some(ValueSource::Query), Some(context)) => context.query().lookup_all(&declaration.key),
            _ => vec![resolution.value.as_str()],
        };

        occurrences
            .into_iter()
            .flat_map(|occurrence| occurrence.split(self.config.list_delimiter))
            .filter(|item| self.config.keep_empty_items || !item.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Populate `target` from `context` with default options.
pub fn populate_from_request<T: Populate + ?Sized>(context: &RequestContext, target: &mut T) -> Result<(), PopulateError> {
    Populator::default().populate(Some(context), target)
}
