//! A record whose fields come from a [`RecordSchema`] rather than a Rust struct.

use indexmap::IndexMap;
use routebind_types::{FieldDeclaration, FieldKind, RecordSchema};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::populate::{FieldValue, Populate, PopulateError};

/// Schema-driven record holding JSON values keyed by field name.
///
/// Every declared field starts at its empty value (`""` for scalars, `[]` for
/// lists) so a serialized record always carries the full set of fields, in
/// schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicRecord {
    schema: RecordSchema,
    values: IndexMap<String, Value>,
}

impl DynamicRecord {
    pub fn new(schema: RecordSchema) -> Self {
        let values = schema
            .fields
            .iter()
            .map(|declaration| (declaration.field.clone(), empty_value(declaration.kind)))
            .collect();
        Self { schema, values }
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// Convert into a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(self.values.iter().map(|(field, value)| (field.clone(), value.clone())).collect())
    }
}

fn empty_value(kind: FieldKind) -> Value {
    match kind {
        FieldKind::Scalar => Value::String(String::new()),
        FieldKind::List => Value::Array(Vec::new()),
    }
}

impl Populate for DynamicRecord {
    fn declarations(&self) -> Vec<FieldDeclaration> {
        self.schema.fields.clone()
    }

    fn assign(&mut self, field: &str, value: FieldValue) -> Result<(), PopulateError> {
        let kind = self
            .schema
            .field(field)
            .map(|declaration| declaration.kind)
            .ok_or_else(|| PopulateError::UnknownField { field: field.to_string() })?;

        let json = match kind {
            FieldKind::Scalar => Value::String(value.into_scalar(field)?),
            FieldKind::List => Value::Array(value.into_list(field)?.into_iter().map(Value::String).collect()),
        };
        self.values.insert(field.to_string(), json);
        Ok(())
    }
}

impl Serialize for DynamicRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.values.iter())
    }
}
