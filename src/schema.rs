//! The schema model: package information plus the ordered set of type
//! definitions, with loading, serialization, validation and unfolding.

use std::{collections::BTreeSet, fs, path::Path};

use indexmap::IndexMap;
use log::{debug, warn};
use serde_json::{Map, Value};

use crate::{
  analysis::{self, Analysis},
  decl::{decls_from_value, decls_to_value, TypeDecl},
  definition::TypeDefinition,
  error::{DuplicateError, Error, Result},
  extensions::{unfold_extensions, Extension},
  info::{Config, Information},
  pretty,
  validator::{FormatRegistry, FormatResult, Validator},
};

/// A loaded JADN schema
#[derive(Debug, Clone)]
pub struct Schema {
  info: Option<Information>,
  types: IndexMap<String, TypeDefinition>,
  formats: FormatRegistry,
}

impl PartialEq for Schema {
  fn eq(&self, other: &Self) -> bool {
    self.info == other.info && self.types == other.types
  }
}

impl Schema {
  /// Builds a schema from package information and raw declarations.
  ///
  /// Fails when the information or its configuration is invalid, when a type
  /// name does not match `$TypeName`, when a type is declared twice, or when
  /// any declaration is malformed. Field names not matching `$FieldName` are
  /// only logged.
  pub fn new(info: Option<Information>, decls: Vec<TypeDecl>) -> Result<Schema> {
    let config = match &info {
      Some(info) => {
        info.validate()?;
        info.config()
      }
      None => Config::default(),
    };

    let type_name = config.type_name_regex()?;
    let field_name = config.field_name_regex()?;

    let mut types = IndexMap::with_capacity(decls.len());
    for decl in decls {
      if !type_name.is_match(&decl.name) {
        return Err(Error::Format(format!(
          "type name `{}` does not match {}",
          decl.name,
          config.type_name()
        )));
      }
      if types.contains_key(&decl.name) {
        return Err(
          DuplicateError {
            kind: "type",
            name: decl.name,
            scope: "schema".to_string(),
          }
          .into(),
        );
      }

      for field in decl.fields.iter().filter(|f| !field_name.is_match(&f.name)) {
        warn!(
          "{}: field name `{}` does not match {}",
          decl.name,
          field.name,
          config.field_name()
        );
      }

      let def = TypeDefinition::from_decl(&decl)?;
      types.insert(decl.name, def);
    }

    debug!("loaded schema with {} types", types.len());

    Ok(Schema {
      info,
      types,
      formats: FormatRegistry::new(),
    })
  }

  /// Builds a schema from a parsed JADN document
  pub fn from_value(value: &Value) -> Result<Schema> {
    let doc = value
      .as_object()
      .ok_or_else(|| Error::Format("schema document must be an object".to_string()))?;

    let info = match doc.get("info") {
      None | Some(Value::Null) => None,
      Some(info) => Some(serde_json::from_value(info.clone())?),
    };
    let types = doc
      .get("types")
      .ok_or_else(|| Error::Format("schema document has no types".to_string()))?;

    Schema::new(info, decls_from_value(types)?)
  }

  /// Parses a JADN document from a string
  pub fn loads(input: &str) -> Result<Schema> {
    Schema::from_value(&serde_json::from_str(input)?)
  }

  pub fn from_slice(input: &[u8]) -> Result<Schema> {
    Schema::from_value(&serde_json::from_slice(input)?)
  }

  /// Reads a JADN document from a file
  pub fn load<P: AsRef<Path>>(path: P) -> Result<Schema> {
    Schema::from_slice(&fs::read(path)?)
  }

  /// The schema as a JADN document
  pub fn schema(&self) -> Result<Value> {
    let mut doc = Map::new();
    if let Some(info) = &self.info {
      doc.insert("info".to_string(), serde_json::to_value(info)?);
    }
    doc.insert("types".to_string(), decls_to_value(&self.decls()));

    Ok(Value::Object(doc))
  }

  /// Pretty prints the schema document
  pub fn dumps(&self, indent: usize) -> Result<String> {
    Ok(pretty::dumps(&self.schema()?, indent))
  }

  /// Writes the pretty printed schema document to a file
  pub fn dump<P: AsRef<Path>>(&self, path: P, indent: usize) -> Result<()> {
    fs::write(path, self.dumps(indent)? + "\n")?;
    Ok(())
  }

  pub fn info(&self) -> Option<&Information> {
    self.info.as_ref()
  }

  /// Effective configuration, defaults applied
  pub fn config(&self) -> Config {
    self.info.as_ref().map(Information::config).unwrap_or_default()
  }

  pub fn exports(&self) -> &[String] {
    self.info.as_ref().map_or(&[][..], |i| i.exports.as_slice())
  }

  pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
    self.types.get(name)
  }

  /// Definitions by name, in declaration order
  pub fn definitions(&self) -> &IndexMap<String, TypeDefinition> {
    &self.types
  }

  pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
    self.types.values()
  }

  pub fn len(&self) -> usize {
    self.types.len()
  }

  pub fn is_empty(&self) -> bool {
    self.types.is_empty()
  }

  /// Raw declarations of every definition, in declaration order
  pub fn decls(&self) -> Vec<TypeDecl> {
    self.types.values().map(TypeDefinition::decl).collect()
  }

  pub fn formats(&self) -> &FormatRegistry {
    &self.formats
  }

  /// Registers a format check for this schema. See
  /// [`FormatRegistry::add_format`].
  pub fn add_format<F>(&mut self, name: &str, check: F, override_existing: bool) -> Result<()>
  where
    F: Fn(&Value) -> FormatResult + Send + Sync + 'static,
  {
    self.formats.add_format(name, check, override_existing)
  }

  /// Validates an instance of the named type, returning the instance with
  /// compact ids expanded
  pub fn validate_as(&self, type_name: &str, value: &Value) -> Result<Value> {
    let exports = self.exports();
    if !exports.is_empty() && !exports.iter().any(|e| e == type_name) {
      warn!("validating as {}, which is not exported", type_name);
    }

    Validator::new(self).validate(type_name, value)
  }

  /// Validates an instance against each exported type in turn, returning
  /// the first success. When no export accepts the instance, every
  /// collected validation error is returned.
  pub fn validate(&self, value: &Value) -> Result<Value> {
    let exports = self.exports();
    if exports.is_empty() {
      return Err(Error::Schema("schema has no exports to validate against".to_string()));
    }

    let mut errors = Vec::new();
    for export in exports {
      match Validator::new(self).validate(export, value) {
        Ok(value) => return Ok(value),
        Err(Error::Validation(errs)) => errors.extend(errs),
        Err(e) => return Err(e),
      }
    }

    Err(Error::Validation(errors))
  }

  pub fn analyze(&self) -> Analysis {
    analysis::analyze(self.info.as_ref(), &self.types)
  }

  /// Names referenced by each definition
  pub fn dependencies(&self) -> IndexMap<String, BTreeSet<String>> {
    analysis::dependencies(&self.types)
  }

  /// Unfolds the given extensions, all of them when `None`, into a new
  /// schema sharing this schema's information and formats
  pub fn simplify(&self, extensions: Option<&[Extension]>) -> Result<Schema> {
    let extensions = extensions.unwrap_or(Extension::ALL);
    let decls = unfold_extensions(self.decls(), self.config().sys(), extensions)?;

    let mut schema = Schema::new(self.info.clone(), decls)?;
    schema.formats = self.formats.clone();
    Ok(schema)
  }
}
