//! The twelve JADN base data types and their option tables

use std::{fmt, str::FromStr};

use crate::{error::Error, options::OptionTag};

/// JADN base data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
  /// Sequence of octets
  Binary,
  /// true or false
  Boolean,
  /// Whole number
  Integer,
  /// Real number
  Number,
  /// Sequence of characters
  String,
  /// One value selected from a set of named or labeled integers
  Enumerated,
  /// One key and value selected from a set of named fields
  Choice,
  /// Ordered list of labeled fields with positionally-defined semantics
  Array,
  /// Ordered list of fields with the same semantics
  ArrayOf,
  /// Unordered map from a set of specified keys to values
  Map,
  /// Unordered map from a set of keys of the same type to values of the same type
  MapOf,
  /// Ordered map from a list of keys with positions to values
  Record,
}

/// Binary, Boolean, Integer, Number, String
pub const PRIMITIVE_TYPES: &[DataType] = &[
  DataType::Binary,
  DataType::Boolean,
  DataType::Integer,
  DataType::Number,
  DataType::String,
];

/// Enumerated, Choice
pub const SELECTOR_TYPES: &[DataType] = &[DataType::Enumerated, DataType::Choice];

/// Array, ArrayOf, Map, MapOf, Record
pub const STRUCTURED_TYPES: &[DataType] = &[
  DataType::Array,
  DataType::ArrayOf,
  DataType::Map,
  DataType::MapOf,
  DataType::Record,
];

/// Types declared with a field list
pub const FIELD_TYPES: &[DataType] = &[
  DataType::Array,
  DataType::Choice,
  DataType::Enumerated,
  DataType::Map,
  DataType::Record,
];

/// Every base data type, in declaration order
pub const CORE_TYPES: &[DataType] = &[
  DataType::Binary,
  DataType::Boolean,
  DataType::Integer,
  DataType::Number,
  DataType::String,
  DataType::Enumerated,
  DataType::Choice,
  DataType::Array,
  DataType::ArrayOf,
  DataType::Map,
  DataType::MapOf,
  DataType::Record,
];

impl DataType {
  pub fn as_str(self) -> &'static str {
    match self {
      DataType::Binary => "Binary",
      DataType::Boolean => "Boolean",
      DataType::Integer => "Integer",
      DataType::Number => "Number",
      DataType::String => "String",
      DataType::Enumerated => "Enumerated",
      DataType::Choice => "Choice",
      DataType::Array => "Array",
      DataType::ArrayOf => "ArrayOf",
      DataType::Map => "Map",
      DataType::MapOf => "MapOf",
      DataType::Record => "Record",
    }
  }

  /// Looks up a base data type by name
  pub fn lookup(name: &str) -> Option<DataType> {
    CORE_TYPES.iter().copied().find(|dt| dt.as_str() == name)
  }

  pub fn is_primitive(self) -> bool {
    PRIMITIVE_TYPES.contains(&self)
  }

  pub fn is_selector(self) -> bool {
    SELECTOR_TYPES.contains(&self)
  }

  pub fn is_structure(self) -> bool {
    STRUCTURED_TYPES.contains(&self)
  }

  pub fn has_fields(self) -> bool {
    FIELD_TYPES.contains(&self)
  }

  /// Type options that may appear on a definition of this type
  pub fn allowed_options(self) -> &'static [OptionTag] {
    use OptionTag::*;

    match self {
      DataType::Binary => &[Minv, Maxv, Format],
      DataType::Boolean => &[],
      DataType::Integer => &[Minv, Maxv, Format],
      DataType::Number => &[Minf, Maxf, Format],
      DataType::String => &[Minv, Maxv, Format, Pattern],
      DataType::Enumerated => &[Id, Enum, Pointer, Extend],
      DataType::Choice => &[Id, Extend],
      DataType::Array => &[Extend, Format, Minv, Maxv],
      DataType::ArrayOf => &[Vtype, Minv, Maxv, Unique, Set, Unordered],
      DataType::Map => &[Id, Extend, Minv, Maxv],
      DataType::MapOf => &[Ktype, Vtype, Minv, Maxv],
      DataType::Record => &[Extend, Minv, Maxv],
    }
  }

  /// Type options that must appear on a definition of this type
  pub fn required_options(self) -> &'static [OptionTag] {
    match self {
      DataType::ArrayOf => &[OptionTag::Vtype],
      DataType::MapOf => &[OptionTag::Ktype, OptionTag::Vtype],
      _ => &[],
    }
  }
}

impl fmt::Display for DataType {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for DataType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    DataType::lookup(s).ok_or_else(|| Error::Format(format!("{} is not a base data type", s)))
  }
}

/// Whether a name is one of the base data types
pub fn is_core_type(name: &str) -> bool {
  DataType::lookup(name).is_some()
}
