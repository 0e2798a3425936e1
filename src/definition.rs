//! Checked type definitions built from raw declarations

use std::{borrow::Cow, collections::HashSet};

use log::debug;

use crate::{
  decl::{FieldDecl, ItemDecl, TypeDecl},
  error::{DuplicateError, Error, Result},
  options::Options,
  types::DataType,
  util::safe_identifier,
};

/// Field of an Array, Choice, Map or Record
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
  pub id: u64,
  pub name: String,
  /// Referenced type: a declared type name, a base data type with inline
  /// type options, or a namespace-qualified `ns:Type`
  pub type_name: String,
  /// Field options and inline type options
  pub options: Options,
  pub description: String,
  /// Name of the type declaring this field
  pub parent: String,
}

/// Item of an Enumerated type
#[derive(Debug, Clone, PartialEq)]
pub struct EnumItem {
  pub id: i64,
  pub value: String,
  pub description: String,
}

/// Category-specific content of a definition
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
  Binary,
  Boolean,
  Integer,
  Number,
  String,
  Enumerated(Vec<EnumItem>),
  Choice(Vec<Field>),
  Array(Vec<Field>),
  /// Value type held in the `vtype` option
  ArrayOf,
  Map(Vec<Field>),
  /// Key and value types held in the `ktype` and `vtype` options
  MapOf,
  Record(Vec<Field>),
}

/// Named, immutable type definition
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
  pub name: String,
  pub options: Options,
  pub description: String,
  pub kind: Kind,
}

impl Field {
  /// Implementation-safe form of the field name
  pub fn alias(&self) -> Cow<str> {
    safe_identifier(&self.name)
  }

  pub fn is_required(&self) -> bool {
    self.options.is_required()
  }

  fn decl(&self) -> FieldDecl {
    FieldDecl::new(
      self.id,
      self.name.clone(),
      self.type_name.clone(),
      self.options.clone(),
      self.description.clone(),
    )
  }
}

impl TypeDefinition {
  /// Builds a checked definition from a raw declaration. Positional ids are
  /// assigned to fields and items declared without one.
  pub fn from_decl(decl: &TypeDecl) -> Result<TypeDefinition> {
    let data_type = decl
      .base_type()
      .ok_or_else(|| Error::Format(format!("{}: {} is not a base data type", decl.name, decl.data_type)))?;

    decl.options.check(&decl.name, data_type)?;

    if data_type != DataType::Enumerated && !decl.items.is_empty() {
      return Err(Error::Format(format!(
        "{}: {} cannot declare enumerated items",
        decl.name, data_type
      )));
    }
    if !data_type.has_fields() && !decl.fields.is_empty() {
      return Err(Error::Format(format!(
        "{}: {} cannot declare fields",
        decl.name, data_type
      )));
    }

    let kind = match data_type {
      DataType::Binary => Kind::Binary,
      DataType::Boolean => Kind::Boolean,
      DataType::Integer => Kind::Integer,
      DataType::Number => Kind::Number,
      DataType::String => Kind::String,
      DataType::ArrayOf => Kind::ArrayOf,
      DataType::MapOf => Kind::MapOf,
      DataType::Enumerated => Kind::Enumerated(build_items(&decl.name, &decl.items)?),
      DataType::Choice => Kind::Choice(build_fields(&decl.name, &decl.fields)?),
      DataType::Array => Kind::Array(build_fields(&decl.name, &decl.fields)?),
      DataType::Map => Kind::Map(build_fields(&decl.name, &decl.fields)?),
      DataType::Record => Kind::Record(build_fields(&decl.name, &decl.fields)?),
    };

    Ok(TypeDefinition {
      name: decl.name.clone(),
      options: decl.options.clone(),
      description: decl.description.clone(),
      kind,
    })
  }

  /// Builds an anonymous definition of a base data type, as used for field
  /// types carrying inline type options
  pub fn anonymous(name: impl Into<String>, data_type: DataType, options: Options) -> Result<TypeDefinition> {
    TypeDefinition::from_decl(&TypeDecl::new(name, data_type.as_str(), options, ""))
  }

  /// Builds an Enumerated definition from explicit items
  pub fn enumeration(name: impl Into<String>, options: Options, items: Vec<EnumItem>) -> TypeDefinition {
    TypeDefinition {
      name: name.into(),
      options,
      description: String::new(),
      kind: Kind::Enumerated(items),
    }
  }

  /// Converts back to a raw declaration
  pub fn decl(&self) -> TypeDecl {
    let decl = TypeDecl::new(
      self.name.clone(),
      self.data_type().as_str(),
      self.options.clone(),
      self.description.clone(),
    );

    match &self.kind {
      Kind::Enumerated(items) => decl.with_items(
        items
          .iter()
          .map(|i| ItemDecl::new(i.id, i.value.clone(), i.description.clone()))
          .collect(),
      ),
      _ => decl.with_fields(self.fields().iter().map(Field::decl).collect()),
    }
  }

  pub fn data_type(&self) -> DataType {
    match self.kind {
      Kind::Binary => DataType::Binary,
      Kind::Boolean => DataType::Boolean,
      Kind::Integer => DataType::Integer,
      Kind::Number => DataType::Number,
      Kind::String => DataType::String,
      Kind::Enumerated(_) => DataType::Enumerated,
      Kind::Choice(_) => DataType::Choice,
      Kind::Array(_) => DataType::Array,
      Kind::ArrayOf => DataType::ArrayOf,
      Kind::Map(_) => DataType::Map,
      Kind::MapOf => DataType::MapOf,
      Kind::Record(_) => DataType::Record,
    }
  }

  /// Fields of Array, Choice, Map and Record definitions, empty otherwise
  pub fn fields(&self) -> &[Field] {
    match &self.kind {
      Kind::Choice(fields) | Kind::Array(fields) | Kind::Map(fields) | Kind::Record(fields) => fields,
      _ => &[],
    }
  }

  /// Items of Enumerated definitions, empty otherwise
  pub fn items(&self) -> &[EnumItem] {
    match &self.kind {
      Kind::Enumerated(items) => items,
      _ => &[],
    }
  }

  pub fn field(&self, name: &str) -> Option<&Field> {
    self.fields().iter().find(|f| f.name == name)
  }

  pub fn field_by_id(&self, id: u64) -> Option<&Field> {
    self.fields().iter().find(|f| f.id == id)
  }

  /// Value type of an ArrayOf or MapOf
  pub fn vtype(&self) -> Option<&str> {
    self.options.vtype.as_deref()
  }

  /// Key type of a MapOf
  pub fn ktype(&self) -> Option<&str> {
    self.options.ktype.as_deref()
  }

  /// Implementation-safe form of the type name
  pub fn alias(&self) -> Cow<str> {
    safe_identifier(&self.name)
  }

  pub fn is_primitive(&self) -> bool {
    self.data_type().is_primitive()
  }

  /// Array, ArrayOf, Map, MapOf or Record
  pub fn is_structure(&self) -> bool {
    self.data_type().is_structure()
  }

  /// Enumerated or Choice
  pub fn is_selector(&self) -> bool {
    self.data_type().is_selector()
  }

  pub fn has_fields(&self) -> bool {
    self.data_type().has_fields()
  }

  pub fn is_enum(&self) -> bool {
    self.data_type() == DataType::Enumerated
  }

  /// Enumerated derived from another type through the `enum` or `pointer`
  /// option, whose items are resolved against the schema
  pub fn is_derived_enum(&self) -> bool {
    self.is_enum() && (self.options.enum_type.is_some() || self.options.pointer.is_some())
  }

  /// Derives an Enumerated view of a field-bearing type, one item per field.
  /// Enumerated types are returned unchanged.
  pub fn enumerated(&self) -> Result<TypeDefinition> {
    if self.is_enum() {
      return Ok(self.clone());
    }
    if !self.has_fields() {
      return Err(Error::Schema(format!(
        "{} ({}) cannot be extended as an enumerated type",
        self.name,
        self.data_type()
      )));
    }

    let mut options = Options::default();
    options.id = self.options.id;
    options.extend = self.options.extend;

    Ok(TypeDefinition {
      name: format!("Enum-{}", self.name),
      options,
      description: format!("Derived Enumerated from {}", self.name),
      kind: Kind::Enumerated(
        self
          .fields()
          .iter()
          .map(|f| EnumItem {
            id: f.id as i64,
            value: f.name.clone(),
            description: f.description.clone(),
          })
          .collect(),
      ),
    })
  }
}

fn build_fields(parent: &str, decls: &[FieldDecl]) -> Result<Vec<Field>> {
  let mut ids = HashSet::new();
  let mut names = HashSet::new();
  let mut fields = Vec::with_capacity(decls.len());

  for (idx, decl) in decls.iter().enumerate() {
    let id = decl.id.unwrap_or(idx as u64 + 1);

    if !ids.insert(id) {
      return Err(duplicate("field id", id.to_string(), parent));
    }
    if !names.insert(decl.name.as_str()) {
      return Err(duplicate("field name", decl.name.clone(), parent));
    }

    fields.push(Field {
      id,
      name: decl.name.clone(),
      type_name: decl.type_name.clone(),
      options: decl.options.clone(),
      description: decl.description.clone(),
      parent: parent.to_string(),
    });
  }

  debug!("{}: built {} fields", parent, fields.len());

  Ok(fields)
}

fn build_items(parent: &str, decls: &[ItemDecl]) -> Result<Vec<EnumItem>> {
  let mut ids = HashSet::new();
  let mut items = Vec::with_capacity(decls.len());

  for (idx, decl) in decls.iter().enumerate() {
    let id = decl.id.unwrap_or(idx as i64 + 1);

    if !ids.insert(id) {
      return Err(duplicate("item id", id.to_string(), parent));
    }

    items.push(EnumItem {
      id,
      value: decl.value.clone(),
      description: decl.description.clone(),
    });
  }

  Ok(items)
}

fn duplicate(kind: &'static str, name: String, scope: &str) -> Error {
  Error::from(DuplicateError {
    kind,
    name,
    scope: scope.to_string(),
  })
}
