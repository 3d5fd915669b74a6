//! # routebind engine
//!
//! Resolves the fields of a destination record from an incoming request.
//!
//! Each field is declared with a logical key and the set of sources it may be
//! read from: the query string, submitted form data, or a path variable
//! captured by the router. [`resolve`] picks the value for one field;
//! [`Populator`] walks every declared field of a [`Populate`] record and
//! assigns the results.
//!
//! ```rust
//! use routebind_engine::{FieldValue, Populate, PopulateError, RequestContext, populate_from_request};
//! use routebind_types::{FieldDeclaration, ValueSource};
//! use routebind_util::Router;
//!
//! #[derive(Default)]
//! struct Display {
//!     kind: String,
//! }
//!
//! impl Populate for Display {
//!     fn declarations(&self) -> Vec<FieldDeclaration> {
//!         vec![FieldDeclaration::single("kind", "type", ValueSource::Path)]
//!     }
//!
//!     fn assign(&mut self, field: &str, value: FieldValue) -> Result<(), PopulateError> {
//!         self.kind = value.into_scalar(field)?;
//!         Ok(())
//!     }
//! }
//!
//! let router = Router::from_templates(["/display/{type}"])?;
//! let context = RequestContext::builder().uri("/display/activeMatrix").route(&router).build()?;
//! let mut display = Display::default();
//! populate_from_request(&context, &mut display)?;
//! assert_eq!(display.kind, "activeMatrix");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod context;
pub mod populate;
pub mod record;
pub mod resolve;

pub use context::{RequestContext, RequestContextBuilder, RequestError, SourceProvider};
pub use populate::{FieldValue, Populate, PopulateError, Populator, PopulatorConfig, populate_from_request};
pub use record::DynamicRecord;
pub use resolve::{FieldResolver, Resolution, resolve};
