//! Shared declaration types for routebind.
//!
//! A destination record is described by a list of [`FieldDeclaration`]s. Each
//! declaration names the logical key a value is registered under and the
//! [`SourceSet`] of request sources allowed to supply it.

pub mod declaration;
pub mod source;

pub use declaration::{FieldDeclaration, FieldKind, RecordSchema, SchemaError};
pub use source::{SourceSet, UnknownSourceError, ValueSource};
