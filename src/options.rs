//! Option codec: the tagged-character option strings used by JADN type and
//! field declarations, and the typed [`Options`] record they decode into.
//!
//! Every option is identified by a single leading character followed by its
//! value text, e.g. `"{1"` (minv = 1), `"*String"` (vtype = String) or `"q"`
//! (unique). The table below is the single source of truth for tags, names,
//! value kinds, scopes and canonical ordering.

use std::fmt;

use crate::{error::OptionError, types::DataType};

/// Value kind carried by an option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
  /// Presence flag, the tag carries no value
  Bool,
  /// Signed integer
  Int,
  /// Floating point number
  Float,
  /// Free text
  Str,
}

/// Whether an option constrains a type or an individual field occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionScope {
  /// Type option
  Type,
  /// Field option
  Field,
}

/// Decoded option value
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
  /// Presence flag
  Bool(bool),
  /// Integer value
  Int(i64),
  /// Float value
  Float(f64),
  /// Text value
  Str(String),
}

impl fmt::Display for OptionValue {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      OptionValue::Bool(b) => write!(f, "{}", b),
      OptionValue::Int(i) => write!(f, "{}", i),
      OptionValue::Float(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{:.1}", n),
      OptionValue::Float(n) => write!(f, "{}", n),
      OptionValue::Str(s) => write!(f, "{}", s),
    }
  }
}

macro_rules! option_type {
  (Bool) => {
    bool
  };
  (Int) => {
    i64
  };
  (Float) => {
    f64
  };
  (Str) => {
    String
  };
}

macro_rules! option_table {
  ($($tag:ident => $field:ident, $ch:literal, $name:literal, $kind:ident, $scope:ident;)*) => {
    /// Option identifier
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub enum OptionTag {
      $(
        #[doc = $name]
        $tag,
      )*
    }

    impl OptionTag {
      /// Every option tag, in canonical order
      pub const ALL: &'static [OptionTag] = &[$(OptionTag::$tag,)*];

      /// Looks up the option identified by a tag character
      pub fn from_char(c: char) -> Option<OptionTag> {
        match c {
          $($ch => Some(OptionTag::$tag),)*
          _ => None,
        }
      }

      /// Tag character
      pub fn as_char(self) -> char {
        match self {
          $(OptionTag::$tag => $ch,)*
        }
      }

      /// Option name
      pub fn name(self) -> &'static str {
        match self {
          $(OptionTag::$tag => $name,)*
        }
      }

      /// Value kind
      pub fn kind(self) -> OptionKind {
        match self {
          $(OptionTag::$tag => OptionKind::$kind,)*
        }
      }

      /// Type or field scope
      pub fn scope(self) -> OptionScope {
        match self {
          $(OptionTag::$tag => OptionScope::$scope,)*
        }
      }
    }

    /// Sparse record of decoded options. Bool options are `Some(true)` when
    /// present and `None` otherwise.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Options {
      $(
        #[doc = $name]
        pub $field: Option<option_type!($kind)>,
      )*
    }

    impl Options {
      /// Returns the value of an option, if present
      pub fn get(&self, tag: OptionTag) -> Option<OptionValue> {
        match tag {
          $(OptionTag::$tag => self.$field.clone().map(OptionValue::$kind),)*
        }
      }

      /// Sets an option, failing if the value kind does not match the tag.
      /// Setting a bool option to false clears it.
      pub fn set(&mut self, tag: OptionTag, value: OptionValue) -> Result<(), OptionError> {
        if value == OptionValue::Bool(false) && tag.kind() == OptionKind::Bool {
          self.remove(tag);
          return Ok(());
        }

        match (tag, value) {
          $((OptionTag::$tag, OptionValue::$kind(v)) => self.$field = Some(v),)*
          (tag, value) => {
            return Err(OptionError::InvalidValue {
              name: tag.name(),
              value: value.to_string(),
            })
          }
        }

        Ok(())
      }

      /// Whether an option is present
      pub fn has(&self, tag: OptionTag) -> bool {
        match tag {
          $(OptionTag::$tag => self.$field.is_some(),)*
        }
      }

      /// Clears an option
      pub fn remove(&mut self, tag: OptionTag) {
        match tag {
          $(OptionTag::$tag => self.$field = None,)*
        }
      }

      fn copy_from(&mut self, other: &Options, tag: OptionTag) {
        match tag {
          $(OptionTag::$tag => self.$field = other.$field.clone(),)*
        }
      }
    }
  };
}

option_table! {
  Id => id, '=', "id", Bool, Type;
  Vtype => vtype, '*', "vtype", Str, Type;
  Ktype => ktype, '+', "ktype", Str, Type;
  Enum => enum_type, '#', "enum", Str, Type;
  Pointer => pointer, '>', "pointer", Str, Type;
  Format => format, '/', "format", Str, Type;
  Pattern => pattern, '%', "pattern", Str, Type;
  Minf => minf, 'y', "minf", Float, Type;
  Maxf => maxf, 'z', "maxf", Float, Type;
  Minv => minv, '{', "minv", Int, Type;
  Maxv => maxv, '}', "maxv", Int, Type;
  Unique => unique, 'q', "unique", Bool, Type;
  Set => set, 's', "set", Bool, Type;
  Unordered => unordered, 'b', "unordered", Bool, Type;
  Extend => extend, 'X', "extend", Bool, Type;
  Default => default, '!', "default", Str, Type;
  And => and, '∩', "and", Str, Type;
  Or => or, '∪', "or", Str, Type;
  Minc => minc, '[', "minc", Int, Field;
  Maxc => maxc, ']', "maxc", Int, Field;
  Tagid => tagid, '&', "tagid", Int, Field;
  Dir => dir, '<', "dir", Bool, Field;
  Key => key, 'K', "key", Bool, Field;
  Link => link, 'L', "link", Bool, Field;
}

impl OptionTag {
  /// Parses the value text following a tag character
  fn parse_value(self, raw: &str) -> Result<OptionValue, OptionError> {
    let invalid = || OptionError::InvalidValue {
      name: self.name(),
      value: raw.to_string(),
    };

    match self.kind() {
      OptionKind::Bool => Ok(OptionValue::Bool(true)),
      OptionKind::Int => raw.parse().map(OptionValue::Int).map_err(|_| invalid()),
      OptionKind::Float => raw.parse().map(OptionValue::Float).map_err(|_| invalid()),
      OptionKind::Str => Ok(OptionValue::Str(raw.to_string())),
    }
  }

  /// Whether this is a field option
  pub fn is_field_option(self) -> bool {
    self.scope() == OptionScope::Field
  }
}

impl fmt::Display for OptionTag {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

impl Options {
  /// Decodes a list of option strings. Later duplicates override earlier ones.
  pub fn decode<S: AsRef<str>>(opts: &[S]) -> Result<Options, OptionError> {
    let mut options = Options::default();

    for opt in opts {
      let mut chars = opt.as_ref().chars();
      let c = chars.next().ok_or(OptionError::Empty)?;
      let tag = OptionTag::from_char(c).ok_or(OptionError::UnknownTag(c))?;
      options.set(tag, tag.parse_value(chars.as_str())?)?;
    }

    Ok(options)
  }

  /// Encodes to option strings in canonical order
  pub fn encode(&self) -> Vec<String> {
    OptionTag::ALL
      .iter()
      .filter_map(|tag| match self.get(*tag)? {
        OptionValue::Bool(true) => Some(tag.as_char().to_string()),
        OptionValue::Bool(false) => None,
        value => Some(format!("{}{}", tag.as_char(), value)),
      })
      .collect()
  }

  /// Present option tags, in canonical order
  pub fn tags(&self) -> Vec<OptionTag> {
    OptionTag::ALL
      .iter()
      .copied()
      .filter(|tag| self.has(*tag))
      .collect()
  }

  pub fn is_empty(&self) -> bool {
    OptionTag::ALL.iter().all(|tag| !self.has(*tag))
  }

  /// Splits into `(field_options, type_options)`
  pub fn split(&self) -> (Options, Options) {
    let mut field = Options::default();
    let mut ty = Options::default();

    for tag in self.tags() {
      match tag.scope() {
        OptionScope::Field => field.copy_from(self, tag),
        OptionScope::Type => ty.copy_from(self, tag),
      }
    }

    (field, ty)
  }

  /// Copies every option present in `other` over this record
  pub fn merge(&mut self, other: &Options) {
    for tag in other.tags() {
      self.copy_from(other, tag);
    }
  }

  /// Checks the options of a type declaration against the required and
  /// allowed sets of its data type
  pub fn check(&self, type_name: &str, data_type: DataType) -> Result<(), OptionError> {
    for tag in data_type.required_options() {
      if !self.has(*tag) {
        return Err(OptionError::Missing {
          type_name: type_name.to_string(),
          data_type: data_type.to_string(),
          option: tag.name(),
        });
      }
    }

    let allowed = data_type.allowed_options();
    if let Some(tag) = self.tags().into_iter().find(|t| !allowed.contains(t)) {
      return Err(OptionError::Extra {
        type_name: type_name.to_string(),
        data_type: data_type.to_string(),
        option: tag.name(),
      });
    }

    Ok(())
  }

  /// Field is optional (`minc` of 0)
  pub fn is_optional(&self) -> bool {
    self.minc == Some(0)
  }

  pub fn is_required(&self) -> bool {
    !self.is_optional()
  }

  /// Field occurs more than once. Fields carrying an inline ArrayOf/MapOf
  /// value or key type are not arrays themselves.
  pub fn is_array(&self) -> bool {
    if self.ktype.is_some() || self.vtype.is_some() {
      return false;
    }
    self.maxc.unwrap_or(1) != 1
  }

  /// Moves field multiplicity into the element bounds of the ArrayOf or
  /// MapOf holding a multi-valued field: at least one element, at most
  /// `maxc` when greater than 1. Bounds already present are kept.
  pub fn bound_by_multiplicity(&mut self, minc: i64, maxc: i64) {
    if self.minv.is_none() {
      self.minv = Some(minc.max(1));
    }
    if self.maxv.is_none() && maxc > 1 {
      self.maxv = Some(maxc);
    }
  }

  /// Multiplicity string, "1", "m..n" or "m..*", using the field bounds
  /// (minc/maxc) when `field` is set and the size bounds (minv/maxv)
  /// otherwise. Returns an empty string when `check` rejects the bounds.
  pub fn multiplicity<F>(&self, min_default: i64, max_default: i64, field: bool, check: F) -> String
  where
    F: Fn(i64, i64) -> bool,
  {
    let (min, max) = if field {
      (
        self.minc.unwrap_or(min_default),
        self.maxc.unwrap_or(max_default),
      )
    } else {
      (
        self.minv.unwrap_or(min_default),
        self.maxv.unwrap_or(max_default),
      )
    };

    if !check(min, max) {
      return String::new();
    }
    if min == 1 && max == 1 {
      return "1".to_string();
    }
    if max == 0 {
      return format!("{}..*", min);
    }
    format!("{}..{}", min, max)
  }
}
