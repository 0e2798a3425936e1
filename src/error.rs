use std::fmt::{self, Write};

use displaydoc::Display;

pub use self::validation::{ValidationError, ValidationErrorReporter};

pub mod validation;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building, unfolding or validating against a schema
#[derive(Debug)]
pub enum Error {
  /// Generic schema error, e.g. an unknown type or an unresolvable reference
  Schema(String),
  /// A type, field or item was declared more than once
  Duplicate(DuplicateError),
  /// Malformed declaration, name or format registration
  Format(String),
  /// Illegal or unparseable option
  Option(OptionError),
  /// Zero or more instance validation errors
  Validation(Vec<ValidationError>),
  /// JSON parsing error
  JSONParsing(serde_json::Error),
  /// I/O error while reading or writing a schema document
  Io(std::io::Error),
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      Error::Schema(msg) => write!(f, "schema error: {}", msg),
      Error::Duplicate(e) => write!(f, "{}", e),
      Error::Format(msg) => write!(f, "format error: {}", msg),
      Error::Option(e) => write!(f, "option error: {}", e),
      Error::Validation(errors) => {
        let mut error_str = String::new();
        for e in errors.iter() {
          let _ = writeln!(error_str, "{}", e);
        }
        write!(f, "{}", error_str)
      }
      Error::JSONParsing(e) => write!(f, "error parsing JSON: {}", e),
      Error::Io(e) => write!(f, "io error: {}", e),
    }
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Error::Duplicate(e) => Some(e),
      Error::Option(e) => Some(e),
      Error::JSONParsing(e) => Some(e),
      Error::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl Error {
  /// Returns the collected validation errors, if this is a validation failure
  pub fn validation_errors(&self) -> Option<&[ValidationError]> {
    match self {
      Error::Validation(errors) => Some(errors),
      _ => None,
    }
  }
}

impl From<OptionError> for Error {
  fn from(e: OptionError) -> Self {
    Error::Option(e)
  }
}

impl From<DuplicateError> for Error {
  fn from(e: DuplicateError) -> Self {
    Error::Duplicate(e)
  }
}

impl From<serde_json::Error> for Error {
  fn from(e: serde_json::Error) -> Self {
    Error::JSONParsing(e)
  }
}

impl From<std::io::Error> for Error {
  fn from(e: std::io::Error) -> Self {
    Error::Io(e)
  }
}

/// Option codec and option legality errors
#[derive(Debug, Display, Clone, PartialEq)]
pub enum OptionError {
  /// Option string without a tag character
  #[displaydoc("empty option string")]
  Empty,
  /// Leading character is not a known option tag
  #[displaydoc("unknown option tag `{0}`")]
  UnknownTag(char),
  /// Value does not parse as the option's value kind
  #[displaydoc("invalid value `{value}` for option {name}")]
  InvalidValue {
    /// Option name
    name: &'static str,
    /// Raw value text
    value: String,
  },
  /// A required type option is absent
  #[displaydoc("{type_name}: {data_type} missing required option of {option}")]
  Missing {
    /// Declared type name
    type_name: String,
    /// Base data type
    data_type: String,
    /// Missing option name
    option: &'static str,
  },
  /// A present option is not allowed for the data type
  #[displaydoc("{type_name}: {data_type} has extra options of {option}")]
  Extra {
    /// Declared type name
    type_name: String,
    /// Base data type
    data_type: String,
    /// Offending option name
    option: &'static str,
  },
}

impl std::error::Error for OptionError {}

/// Duplicate declaration
#[derive(Debug, Display, Clone, PartialEq)]
#[displaydoc("duplicate {kind} `{name}` in {scope}")]
pub struct DuplicateError {
  /// What was duplicated: "type", "field name", "field id", "item id"
  pub kind: &'static str,
  /// The duplicated name or id
  pub name: String,
  /// Where the duplicate occurred: the schema or the owning type
  pub scope: String,
}

impl std::error::Error for DuplicateError {}
