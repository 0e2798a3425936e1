//! # jadn
//!
//! A Rust implementation of JSON Abstract Data Notation (JADN). JADN is an
//! information modeling language: a schema describes named types built from
//! twelve base data types, and each type is written as a compact nested JSON
//! array whose options are packed into single-character tagged strings.
//!
//! This crate loads JADN schemas into a typed model, validates JSON instances
//! against them, analyzes the references between types and unfolds schema
//! shorthand (extensions) into explicit type declarations.
//!
//! ## Goals
//!
//! - Load JADN documents into a typed, immutable schema model
//! - Decode and encode the tagged option strings losslessly
//! - Validate JSON instances, including instances in compact form
//! - Report unreferenced and undefined types
//! - Unfold the Link, Multiplicity, AnonymousType, DerivedEnum and MapOfEnum
//!   extensions
//! - Pretty print schemas deterministically
//!
//! ## Non-goals
//!
//! - Conversion to or from other schema languages
//! - Message transcoding between serializations
//! - Detection of reference cycles
//!
//! ## Validating JSON
//!
//! ```
//! use jadn::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::loads(
//!   r#"{
//!     "info": {"package": "http://example.com/people", "exports": ["Person"]},
//!     "types": [
//!       ["Person", "Record", [], "", [
//!         [1, "name", "String", [], ""],
//!         [2, "email", "String", ["/email", "[0"], ""]
//!       ]]
//!     ]
//!   }"#,
//! )?;
//!
//! schema.validate_as("Person", &json!({"name": "Ann", "email": "ann@example.com"}))?;
//! assert!(schema.validate_as("Person", &json!({"email": "ann@example.com"})).is_err());
//! # Ok::<(), jadn::Error>(())
//! ```
//!
//! Instances may use field and item ids in place of names. The validated
//! instance is returned with every id expanded to its name.
//!
//! ## Formats
//!
//! The `format` option names a semantic check applied after the base type
//! check. The built-in formats cover email addresses, hostnames, URIs and
//! IRIs, JSON pointers, regular expressions, RFC 3339 dates and times, IP
//! addresses and networks, EUI hardware addresses, signed (`i8`, `i16`,
//! `i32`) and unsigned (`u<N>`) integer ranges, and the binary encodings `x`
//! (hex) and `b` (base64url). Further formats can be registered per schema
//! with [`Schema::add_format`].

pub mod analysis;
pub mod decl;
pub mod definition;
pub mod derive;
pub mod error;
pub mod extensions;
pub mod info;
pub mod options;
pub mod pretty;
pub mod schema;
pub mod types;
pub mod util;
pub mod validator;

#[doc(inline)]
pub use self::{
  analysis::Analysis,
  decl::{FieldDecl, ItemDecl, TypeDecl},
  definition::{EnumItem, Field, Kind, TypeDefinition},
  error::{DuplicateError, Error, OptionError, Result, ValidationError, ValidationErrorReporter},
  extensions::{unfold_extensions, Extension},
  info::{Config, Information},
  options::{OptionTag, Options},
  schema::Schema,
  types::DataType,
  validator::{FormatRegistry, Validator},
};

/// Validates a JSON document against a type of a JADN schema, both given as
/// strings
pub fn validate_json_from_str(schema: &str, type_name: &str, json: &str) -> Result<serde_json::Value> {
  let schema = Schema::loads(schema)?;
  let value: serde_json::Value = serde_json::from_str(json)?;

  schema.validate_as(type_name, &value)
}
