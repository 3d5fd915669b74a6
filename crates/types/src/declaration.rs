//! Field declarations: which key a field is registered under and which sources may supply it.

use std::{collections::HashSet, error::Error, fmt};

use serde::{Deserialize, Serialize};

use crate::source::{SourceSet, ValueSource};

/// Shape of the destination field a resolved value is written into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// A single string.
    #[default]
    Scalar,
    /// A list of strings, built from a delimited value or repeated query occurrences.
    List,
}

/// Static metadata attached to one field of a destination record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    /// Name of the field on the destination record.
    pub field: String,
    /// Logical key shared by the query, form and path stores. Defaults to `field` in schema files.
    #[serde(default)]
    pub key: String,
    /// Sources this field accepts values from.
    #[serde(default)]
    pub sources: SourceSet,
    #[serde(default)]
    pub kind: FieldKind,
}

impl FieldDeclaration {
    /// Declare a scalar field.
    pub fn new(field: impl Into<String>, key: impl Into<String>, sources: SourceSet) -> Self {
        Self {
            field: field.into(),
            key: key.into(),
            sources,
            kind: FieldKind::Scalar,
        }
    }

    /// Shorthand for a scalar field read from a single source.
    pub fn single(field: impl Into<String>, key: impl Into<String>, source: ValueSource) -> Self {
        Self::new(field, key, SourceSet::of(&[source]))
    }

    /// Mark this declaration as a list field.
    #[must_use]
    pub fn list(mut self) -> Self {
        self.kind = FieldKind::List;
        self
    }

    pub fn is_list(&self) -> bool {
        self.kind == FieldKind::List
    }
}

/// A named set of field declarations describing one destination record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,
}

impl RecordSchema {
    /// Parse a schema from YAML text.
    ///
    /// ```rust
    /// use routebind_types::{RecordSchema, ValueSource};
    ///
    /// let schema = RecordSchema::from_yaml_str(
    ///     "name: hacker\nfields:\n  - field: rival\n    sources: [query]\n",
    /// )
    /// .unwrap();
    /// assert_eq!(schema.fields[0].key, "rival");
    /// assert!(schema.fields[0].sources.contains(ValueSource::Query));
    /// ```
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        let schema: RecordSchema = serde_yaml::from_str(text).map_err(|error| SchemaError::Parse(error.to_string()))?;
        schema.normalized()
    }

    /// Parse a schema from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let schema: RecordSchema = serde_json::from_str(text).map_err(|error| SchemaError::Parse(error.to_string()))?;
        schema.normalized()
    }

    /// Look up the declaration for a destination field.
    pub fn field(&self, name: &str) -> Option<&FieldDeclaration> {
        self.fields.iter().find(|declaration| declaration.field == name)
    }

    fn normalized(mut self) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for declaration in &mut self.fields {
            if declaration.field.trim().is_empty() {
                return Err(SchemaError::EmptyFieldName);
            }
            if !seen.insert(declaration.field.clone()) {
                return Err(SchemaError::DuplicateField(declaration.field.clone()));
            }
            if declaration.key.is_empty() {
                declaration.key = declaration.field.clone();
            }
        }
        Ok(self)
    }
}

/// Error returned when a record schema cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The text was not valid YAML/JSON for a schema.
    Parse(String),
    /// A declaration had a blank `field`.
    EmptyFieldName,
    /// Two declarations named the same destination field.
    DuplicateField(String),
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Parse(message) => write!(f, "invalid record schema: {}", message),
            SchemaError::EmptyFieldName => f.write_str("record schema declares a field with an empty name"),
            SchemaError::DuplicateField(field) => write!(f, "record schema declares field '{}' more than once", field),
        }
    }
}

impl Error for SchemaError {}
