//! Raw type declarations as they appear in the JADN wire form:
//!
//! ```text
//! [TypeName, BaseType, [TypeOption, ...], TypeDescription, [Field, ...]]
//! ```
//!
//! Fields of an Enumerated type are `[ItemId, ItemValue, ItemDescription]`,
//! all other fields are `[FieldId, FieldName, FieldType, [FieldOption, ...],
//! FieldDescription]`. Declarations carry decoded options but are otherwise
//! unchecked; legality is enforced when they are built into a
//! [`TypeDefinition`](crate::definition::TypeDefinition).

use serde_json::{json, Value};

use crate::{
  error::{Error, Result},
  options::Options,
  types::DataType,
};

/// Raw type declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
  pub name: String,
  /// Base type name. Not guaranteed to be a known data type.
  pub data_type: String,
  pub options: Options,
  pub description: String,
  /// Fields of Array, Choice, Map and Record declarations
  pub fields: Vec<FieldDecl>,
  /// Items of Enumerated declarations
  pub items: Vec<ItemDecl>,
}

/// Raw field declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
  /// Explicit id, or `None` for positional numbering
  pub id: Option<u64>,
  pub name: String,
  pub type_name: String,
  pub options: Options,
  pub description: String,
}

/// Raw Enumerated item declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDecl {
  /// Explicit id, or `None` for positional numbering
  pub id: Option<i64>,
  pub value: String,
  pub description: String,
}

impl TypeDecl {
  pub fn new(name: impl Into<String>, data_type: impl Into<String>, options: Options, description: impl Into<String>) -> Self {
    TypeDecl {
      name: name.into(),
      data_type: data_type.into(),
      options,
      description: description.into(),
      fields: Vec::new(),
      items: Vec::new(),
    }
  }

  pub fn with_fields(mut self, fields: Vec<FieldDecl>) -> Self {
    self.fields = fields;
    self
  }

  pub fn with_items(mut self, items: Vec<ItemDecl>) -> Self {
    self.items = items;
    self
  }

  /// Base data type, if the declared base type is known
  pub fn base_type(&self) -> Option<DataType> {
    DataType::lookup(&self.data_type)
  }

  pub fn is_enumerated(&self) -> bool {
    self.base_type() == Some(DataType::Enumerated)
  }

  /// Parses a declaration from its nested-list wire form
  pub fn from_value(value: &Value) -> Result<TypeDecl> {
    let decl = value
      .as_array()
      .ok_or_else(|| Error::Format(format!("type declaration must be an array, got {}", value)))?;

    if decl.len() < 2 || decl.len() > 5 {
      return Err(Error::Format(format!(
        "type declaration must have 2 to 5 elements, got {}",
        value
      )));
    }

    let name = required_str(&decl[0], "type name")?;
    let data_type = required_str(&decl[1], "base type")?;
    let options = decode_options(decl.get(2), name)?;
    let description = optional_str(decl.get(3), name)?;

    let mut type_decl = TypeDecl::new(name, data_type, options, description);

    let raw_fields = match decl.get(4) {
      None | Some(Value::Null) => &[][..],
      Some(Value::Array(fields)) => &fields[..],
      Some(other) => {
        return Err(Error::Format(format!(
          "{}: field list must be an array, got {}",
          name, other
        )))
      }
    };

    for raw in raw_fields {
      let field = raw
        .as_array()
        .ok_or_else(|| Error::Format(format!("{}: field must be an array, got {}", name, raw)))?;

      if type_decl.is_enumerated() {
        if field.len() < 2 || field.len() > 3 {
          return Err(Error::Format(format!(
            "{}: enumerated item must have 2 or 3 elements, got {}",
            name, raw
          )));
        }

        type_decl.items.push(ItemDecl {
          id: match &field[0] {
            Value::Null => None,
            id => Some(id.as_i64().ok_or_else(|| {
              Error::Format(format!("{}: item id must be an integer, got {}", name, id))
            })?),
          },
          value: required_str(&field[1], "item value")?.to_string(),
          description: optional_str(field.get(2), name)?,
        });
      } else {
        if field.len() < 3 || field.len() > 5 {
          return Err(Error::Format(format!(
            "{}: field must have 3 to 5 elements, got {}",
            name, raw
          )));
        }

        let field_name = required_str(&field[1], "field name")?;
        type_decl.fields.push(FieldDecl {
          id: match &field[0] {
            Value::Null => None,
            id => Some(id.as_u64().ok_or_else(|| {
              Error::Format(format!(
                "{}.{}: field id must be a non-negative integer, got {}",
                name, field_name, id
              ))
            })?),
          },
          name: field_name.to_string(),
          type_name: required_str(&field[2], "field type")?.to_string(),
          options: decode_options(field.get(3), &format!("{}.{}", name, field_name))?,
          description: optional_str(field.get(4), name)?,
        });
      }
    }

    Ok(type_decl)
  }

  /// Serializes to the nested-list wire form. Field lists are emitted for
  /// every field-bearing base type, even when empty.
  pub fn to_value(&self) -> Value {
    let mut decl = vec![
      json!(self.name),
      json!(self.data_type),
      json!(self.options.encode()),
      json!(self.description),
    ];

    if self.is_enumerated() {
      decl.push(Value::Array(
        self
          .items
          .iter()
          .enumerate()
          .map(|(idx, item)| json!([item.id.unwrap_or(idx as i64 + 1), item.value, item.description]))
          .collect(),
      ));
    } else if self.base_type().map_or(false, DataType::has_fields) || !self.fields.is_empty() {
      decl.push(Value::Array(
        self
          .fields
          .iter()
          .enumerate()
          .map(|(idx, f)| {
            json!([
              f.id.unwrap_or(idx as u64 + 1),
              f.name,
              f.type_name,
              f.options.encode(),
              f.description
            ])
          })
          .collect(),
      ));
    }

    Value::Array(decl)
  }
}

impl FieldDecl {
  pub fn new(id: u64, name: impl Into<String>, type_name: impl Into<String>, options: Options, description: impl Into<String>) -> Self {
    FieldDecl {
      id: Some(id),
      name: name.into(),
      type_name: type_name.into(),
      options,
      description: description.into(),
    }
  }
}

impl ItemDecl {
  pub fn new(id: i64, value: impl Into<String>, description: impl Into<String>) -> Self {
    ItemDecl {
      id: Some(id),
      value: value.into(),
      description: description.into(),
    }
  }
}

/// Parses a list of declarations
pub fn decls_from_value(types: &Value) -> Result<Vec<TypeDecl>> {
  types
    .as_array()
    .ok_or_else(|| Error::Format(format!("types must be an array, got {}", types)))?
    .iter()
    .map(TypeDecl::from_value)
    .collect()
}

/// Serializes a list of declarations
pub fn decls_to_value(decls: &[TypeDecl]) -> Value {
  Value::Array(decls.iter().map(TypeDecl::to_value).collect())
}

fn required_str<'a>(value: &'a Value, what: &str) -> Result<&'a str> {
  value
    .as_str()
    .ok_or_else(|| Error::Format(format!("{} must be a string, got {}", what, value)))
}

fn optional_str(value: Option<&Value>, context: &str) -> Result<String> {
  match value {
    None | Some(Value::Null) => Ok(String::new()),
    Some(Value::String(s)) => Ok(s.clone()),
    Some(other) => Err(Error::Format(format!(
      "{}: description must be a string, got {}",
      context, other
    ))),
  }
}

fn decode_options(value: Option<&Value>, context: &str) -> Result<Options> {
  let opts = match value {
    None | Some(Value::Null) => return Ok(Options::default()),
    Some(Value::Array(opts)) => opts,
    Some(other) => {
      return Err(Error::Format(format!(
        "{}: options must be an array, got {}",
        context, other
      )))
    }
  };

  let opts = opts
    .iter()
    .map(|o| {
      o.as_str()
        .ok_or_else(|| Error::Format(format!("{}: option must be a string, got {}", context, o)))
    })
    .collect::<Result<Vec<_>>>()?;

  Ok(Options::decode(&opts)?)
}
