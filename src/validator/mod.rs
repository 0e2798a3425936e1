//! Instance validation against schema type definitions
//!
//! Validation walks the instance and the type graph together, collecting
//! every violation with the JSON pointer of the offending value. Values
//! supplied in compact form (integer ids in place of names) are expanded on
//! the way, and the expanded instance is returned on success.

pub mod formats;

use std::{borrow::Cow, collections::HashSet, fmt::Write};

use log::trace;
use serde_json::{Map, Value};

use crate::{
  definition::{Field, Kind, TypeDefinition},
  derive::{derivation_ref, derived_items},
  error::{Error, Result, ValidationError},
  info::Config,
  options::Options,
  schema::Schema,
  types::DataType,
};

pub use self::formats::{FormatFn, FormatRegistry, FormatResult};

/// Validates instances against the definitions of one schema
pub struct Validator<'a> {
  schema: &'a Schema,
  config: Config,
  errors: Vec<ValidationError>,
  location: String,
}

/// Escapes a JSON pointer reference token
fn escape_token(token: &str) -> String {
  token.replace('~', "~0").replace('/', "~1")
}

fn json_type(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

/// Options of an Enumerated built from a derivation, keeping only `id`
fn derived_options(options: &Options) -> Options {
  Options {
    id: options.id,
    ..Default::default()
  }
}

impl<'a> Validator<'a> {
  pub fn new(schema: &'a Schema) -> Self {
    Validator {
      schema,
      config: schema.config(),
      errors: Vec::new(),
      location: String::new(),
    }
  }

  /// Validates `value` as an instance of `type_name`, returning the expanded
  /// instance or every violation found
  pub fn validate(mut self, type_name: &str, value: &Value) -> Result<Value> {
    let def = self.resolve(type_name).map_err(Error::Schema)?;
    let expanded = self.validate_definition(&def, value);

    if self.errors.is_empty() {
      Ok(expanded)
    } else {
      Err(Error::Validation(self.errors))
    }
  }

  fn add_error(&mut self, type_name: &str, reason: String) {
    trace!("{} at {:?}: {}", type_name, self.location, reason);

    self.errors.push(ValidationError {
      reason,
      type_name: type_name.to_string(),
      location: self.location.clone(),
    });
  }

  /// Runs `f` with `token` appended to the current location
  fn descend<T, F>(&mut self, token: &str, f: F) -> T
  where
    F: FnOnce(&mut Self) -> T,
  {
    let len = self.location.len();
    let _ = write!(self.location, "/{}", escape_token(token));
    let out = f(self);
    self.location.truncate(len);
    out
  }

  /// Resolves a type reference: a declared type, a `#Type`/`>Type`
  /// derivation or a primitive base type
  fn resolve(&self, type_name: &str) -> std::result::Result<Cow<'a, TypeDefinition>, String> {
    let schema = self.schema;

    if let Some(def) = schema.get(type_name) {
      if def.is_derived_enum() && def.items().is_empty() {
        let items = derived_items(schema.definitions(), &def.options)
          .map_err(|e| e.to_string())?
          .unwrap_or_default();
        return Ok(Cow::Owned(TypeDefinition::enumeration(
          def.name.clone(),
          derived_options(&def.options),
          items,
        )));
      }
      return Ok(Cow::Borrowed(def));
    }

    if let Some(options) = derivation_ref(type_name) {
      let items = derived_items(schema.definitions(), &options)
        .map_err(|e| e.to_string())?
        .unwrap_or_default();
      return Ok(Cow::Owned(TypeDefinition::enumeration(
        type_name,
        Options::default(),
        items,
      )));
    }

    match DataType::lookup(type_name) {
      Some(dt) if dt.is_primitive() => TypeDefinition::anonymous(type_name, dt, Options::default())
        .map(Cow::Owned)
        .map_err(|e| e.to_string()),
      _ => Err(format!("{} is not a valid type within the schema", type_name)),
    }
  }

  /// Resolves the type of a field. Base data types named by a field take the
  /// field's inline type options. Collection options of a multi-valued field
  /// apply to its occurrences and are left out of the element type.
  fn resolve_field(&self, field: &Field) -> std::result::Result<Cow<'a, TypeDefinition>, String> {
    let dt = match DataType::lookup(&field.type_name) {
      Some(dt) => dt,
      None => return self.resolve(&field.type_name),
    };

    let (field_options, mut type_options) = field.options.split();
    let name = format!("{}.{}", field.parent, field.name);

    if field.options.is_array() {
      type_options.unique = None;
      type_options.set = None;
      type_options.unordered = None;
    } else if let Some(maxc) = field_options.maxc.filter(|maxc| *maxc != 1) {
      // An inline ArrayOf or MapOf holds every occurrence itself
      type_options.bound_by_multiplicity(field_options.minc.unwrap_or(1), maxc);
    }

    if dt == DataType::Enumerated {
      return match derived_items(self.schema.definitions(), &type_options) {
        Ok(Some(items)) => Ok(Cow::Owned(TypeDefinition::enumeration(
          name,
          derived_options(&type_options),
          items,
        ))),
        Ok(None) => Err(format!("{}: anonymous Enumerated requires enum or pointer", name)),
        Err(e) => Err(e.to_string()),
      };
    }
    if dt.has_fields() {
      return Err(format!("{}: anonymous {} cannot declare fields", name, dt));
    }

    TypeDefinition::anonymous(name, dt, type_options)
      .map(Cow::Owned)
      .map_err(|e| e.to_string())
  }

  fn validate_definition(&mut self, def: &TypeDefinition, value: &Value) -> Value {
    match &def.kind {
      Kind::Binary => self.validate_binary(def, value),
      Kind::Boolean => self.validate_boolean(def, value),
      Kind::Integer => self.validate_integer(def, value),
      Kind::Number => self.validate_number(def, value),
      Kind::String => self.validate_string(def, value),
      Kind::Enumerated(_) => self.validate_enumerated(def, value),
      Kind::Choice(_) => self.validate_choice(def, value),
      Kind::Array(_) => self.validate_array(def, value),
      Kind::ArrayOf => self.validate_array_of(def, value),
      Kind::Map(_) | Kind::Record(_) => self.validate_map(def, value),
      Kind::MapOf => self.validate_map_of(def, value),
    }
  }

  fn check_format(&mut self, def: &TypeDefinition, value: &Value) {
    if let Some(format) = &def.options.format {
      if let Err(reason) = self.schema.formats().check(format, value) {
        self.add_error(&def.name, format!("format {}: {}", format, reason));
      }
    }
  }

  fn check_length(&mut self, def: &TypeDefinition, len: usize, default_max: u64, unit: &str) {
    let min = def.options.minv.unwrap_or(0);
    let max = match def.options.maxv {
      Some(max) if max > 0 => max,
      _ => default_max as i64,
    };

    if (len as i64) < min {
      self.add_error(&def.name, format!("minimum length of {} {} not met", min, unit));
    }
    if (len as i64) > max {
      self.add_error(&def.name, format!("maximum length of {} {} exceeded", max, unit));
    }
  }

  /// Checks a count against `minv`/`maxv`, a maximum of 0 meaning unbounded
  fn check_count(&mut self, def: &TypeDefinition, count: usize, default_min: i64, unit: &str) {
    let min = def.options.minv.unwrap_or(default_min);
    let max = def.options.maxv.unwrap_or(0);

    if (count as i64) < min {
      self.add_error(&def.name, format!("minimum of {} {} not met", min, unit));
    }
    if max > 0 && (count as i64) > max {
      self.add_error(&def.name, format!("maximum of {} {} exceeded", max, unit));
    }
  }

  fn type_mismatch(&mut self, def: &TypeDefinition, expected: &str, value: &Value) -> Value {
    self.add_error(
      &def.name,
      format!("expected {}, got {} {}", expected, json_type(value), value),
    );
    value.clone()
  }

  fn validate_binary(&mut self, def: &TypeDefinition, value: &Value) -> Value {
    let s = match value.as_str() {
      Some(s) => s,
      None => return self.type_mismatch(def, "binary data as a string", value),
    };

    self.check_length(def, s.len(), self.config.max_binary(), "bytes");
    self.check_format(def, value);
    value.clone()
  }

  fn validate_boolean(&mut self, def: &TypeDefinition, value: &Value) -> Value {
    if !value.is_boolean() {
      return self.type_mismatch(def, "a boolean", value);
    }
    value.clone()
  }

  fn validate_integer(&mut self, def: &TypeDefinition, value: &Value) -> Value {
    let n = match value.as_i64().map(i128::from).or_else(|| value.as_u64().map(i128::from)) {
      Some(n) => n,
      None => return self.type_mismatch(def, "an integer", value),
    };

    if let Some(min) = def.options.minv {
      if n < min as i128 {
        self.add_error(&def.name, format!("minimum value {} not met, got {}", min, n));
      }
    }
    if let Some(max) = def.options.maxv {
      if max != 0 && n > max as i128 {
        self.add_error(&def.name, format!("maximum value {} exceeded, got {}", max, n));
      }
    }

    self.check_format(def, value);
    value.clone()
  }

  fn validate_number(&mut self, def: &TypeDefinition, value: &Value) -> Value {
    let n = match value.as_f64() {
      Some(n) => n,
      None => return self.type_mismatch(def, "a number", value),
    };

    if let Some(min) = def.options.minf {
      if n < min {
        self.add_error(&def.name, format!("minimum value {} not met, got {}", min, n));
      }
    }
    if let Some(max) = def.options.maxf {
      if max != 0.0 && n > max {
        self.add_error(&def.name, format!("maximum value {} exceeded, got {}", max, n));
      }
    }

    self.check_format(def, value);
    value.clone()
  }

  fn validate_string(&mut self, def: &TypeDefinition, value: &Value) -> Value {
    let s = match value.as_str() {
      Some(s) => s,
      None => return self.type_mismatch(def, "a string", value),
    };

    self.check_length(def, s.chars().count(), self.config.max_string(), "characters");

    if let Some(pattern) = &def.options.pattern {
      match regex::Regex::new(pattern) {
        Ok(re) if re.is_match(s) => {}
        Ok(_) => self.add_error(&def.name, format!("`{}` does not match pattern {}", s, pattern)),
        Err(e) => self.add_error(&def.name, format!("invalid pattern {}: {}", pattern, e)),
      }
    }

    self.check_format(def, value);
    value.clone()
  }

  fn validate_enumerated(&mut self, def: &TypeDefinition, value: &Value) -> Value {
    let items = def.items();

    if def.options.id == Some(true) {
      match value.as_i64() {
        Some(id) if items.iter().any(|i| i.id == id) => {}
        _ => self.add_error(&def.name, format!("{} is not a valid id of {}", value, def.name)),
      }
      return value.clone();
    }

    let label = match value {
      Value::String(s) => s.as_str(),
      Value::Number(n) => match n.as_i64().and_then(|id| items.iter().find(|i| i.id == id)) {
        Some(item) => return Value::String(item.value.clone()),
        None => {
          self.add_error(&def.name, format!("{} is not a valid id of {}", n, def.name));
          return value.clone();
        }
      },
      _ => return self.type_mismatch(def, "an enumerated value", value),
    };

    if !items.iter().any(|i| i.value == label) {
      let valid = items.iter().map(|i| i.value.as_str()).collect::<Vec<_>>();
      self.add_error(
        &def.name,
        format!("`{}` is not a valid value of {}, expected one of {:?}", label, def.name, valid),
      );
    }
    value.clone()
  }

  /// Finds the field addressed by an object key, returning it with the key
  /// to use in the expanded instance. With the `id` option keys are field
  /// ids; otherwise names, with numeric keys accepted as compact ids.
  fn lookup_field<'d>(&self, def: &'d TypeDefinition, key: &str) -> Option<(&'d Field, String)> {
    let by_id = || key.parse::<u64>().ok().and_then(|id| def.field_by_id(id));

    if def.options.id == Some(true) {
      return by_id().map(|f| (f, key.to_string()));
    }

    def
      .field(key)
      .or_else(by_id)
      .map(|f| (f, f.name.clone()))
  }

  /// Validates one field occurrence, expanding arrays for fields with a
  /// `maxc` other than 1
  fn validate_field(&mut self, field: &Field, value: &Value) -> Value {
    let def = match self.resolve_field(field) {
      Ok(def) => def,
      Err(reason) => {
        self.add_error(&field.parent, reason);
        return value.clone();
      }
    };

    if !field.options.is_array() {
      return self.validate_definition(&def, value);
    }

    let values = match value.as_array() {
      Some(values) => values,
      None => {
        self.add_error(
          &field.parent,
          format!("field `{}` expects an array of {}, got {}", field.name, field.type_name, value),
        );
        return value.clone();
      }
    };

    let min = field.options.minc.unwrap_or(1).max(1);
    let max = field.options.maxc.unwrap_or(1);
    if (values.len() as i64) < min {
      self.add_error(
        &field.parent,
        format!("field `{}` requires at least {} occurrences", field.name, min),
      );
    }
    if max > 0 && (values.len() as i64) > max {
      self.add_error(
        &field.parent,
        format!("field `{}` allows at most {} occurrences", field.name, max),
      );
    }

    let out = values
      .iter()
      .enumerate()
      .map(|(idx, v)| self.descend(&idx.to_string(), |jv| jv.validate_definition(&def, v)))
      .collect::<Vec<_>>();

    if field.options.unique == Some(true) || field.options.set == Some(true) {
      for (idx, v) in out.iter().enumerate() {
        if out[..idx].contains(v) {
          self.add_error(
            &field.parent,
            format!("field `{}` has duplicate element {} at index {}", field.name, v, idx),
          );
        }
      }
    }

    Value::Array(out)
  }

  fn validate_choice(&mut self, def: &TypeDefinition, value: &Value) -> Value {
    let obj = match value.as_object() {
      Some(obj) => obj,
      None => return self.type_mismatch(def, "an object", value),
    };

    if obj.len() != 1 {
      self.add_error(
        &def.name,
        format!("choice requires exactly one key, got {}", obj.len()),
      );
      return value.clone();
    }

    let mut out = Map::new();
    for (key, v) in obj {
      match self.lookup_field(def, key) {
        Some((field, out_key)) => {
          let expanded = self.descend(key, |jv| jv.validate_field(field, v));
          out.insert(out_key, expanded);
        }
        None => {
          self.add_error(&def.name, format!("`{}` is not a valid field of {}", key, def.name));
          out.insert(key.clone(), v.clone());
        }
      }
    }

    Value::Object(out)
  }

  /// Expands a Record given positionally as an array into an object
  fn record_from_array(&mut self, def: &TypeDefinition, values: &[Value]) -> Map<String, Value> {
    let fields = def.fields();
    if values.len() > fields.len() {
      self.add_error(
        &def.name,
        format!("maximum of {} elements exceeded, got {}", fields.len(), values.len()),
      );
    }

    fields
      .iter()
      .zip(values)
      .filter(|(_, v)| !v.is_null())
      .map(|(f, v)| (f.name.clone(), v.clone()))
      .collect()
  }

  fn validate_map(&mut self, def: &TypeDefinition, value: &Value) -> Value {
    let is_record = def.data_type() == DataType::Record;

    let positional;
    let obj = match value {
      Value::Object(obj) => obj,
      Value::Array(values) if is_record => {
        positional = self.record_from_array(def, values);
        &positional
      }
      _ => return self.type_mismatch(def, "an object", value),
    };

    let mut out = Map::new();
    let mut present = HashSet::new();

    for (key, v) in obj {
      match self.lookup_field(def, key) {
        Some((field, out_key)) => {
          present.insert(field.id);
          let expanded = self.descend(key, |jv| jv.validate_field(field, v));
          out.insert(out_key, expanded);
        }
        None if is_record => {
          self.add_error(&def.name, format!("`{}` is not a valid field of {}", key, def.name));
          out.insert(key.clone(), v.clone());
        }
        None => {
          trace!("{}: undeclared key `{}` accepted", def.name, key);
          out.insert(key.clone(), v.clone());
        }
      }
    }

    for field in def.fields() {
      if field.is_required() && !present.contains(&field.id) {
        self.add_error(&def.name, format!("missing required field `{}`", field.name));
      }
    }

    if !is_record {
      self.check_count(def, obj.len(), 1, "keys");
    } else if def.options.minv.is_some() || def.options.maxv.is_some() {
      self.check_count(def, obj.len(), 0, "fields");
    }

    Value::Object(out)
  }

  fn validate_array(&mut self, def: &TypeDefinition, value: &Value) -> Value {
    let values = match value.as_array() {
      Some(values) => values,
      None => return self.type_mismatch(def, "an array", value),
    };

    let fields = def.fields();
    if values.len() > fields.len() && def.options.extend != Some(true) {
      self.add_error(
        &def.name,
        format!("maximum of {} elements exceeded, got {}", fields.len(), values.len()),
      );
    }
    if def.options.minv.is_some() || def.options.maxv.is_some() {
      self.check_count(def, values.len(), 0, "elements");
    }

    let mut out = Vec::with_capacity(values.len());
    for (idx, field) in fields.iter().enumerate() {
      match values.get(idx) {
        None | Some(Value::Null) => {
          if field.is_required() {
            self.add_error(
              &def.name,
              format!("missing required element `{}` at position {}", field.name, idx),
            );
          }
          if idx < values.len() {
            out.push(Value::Null);
          }
        }
        Some(v) => out.push(self.descend(&idx.to_string(), |jv| jv.validate_field(field, v))),
      }
    }
    out.extend(values.iter().skip(fields.len()).cloned());

    self.check_format(def, value);
    Value::Array(out)
  }

  fn validate_array_of(&mut self, def: &TypeDefinition, value: &Value) -> Value {
    let values = match value.as_array() {
      Some(values) => values,
      None => return self.type_mismatch(def, "an array", value),
    };

    self.check_count(def, values.len(), 0, "elements");

    let vtype = def.vtype().unwrap_or_default();
    let vdef = match self.resolve(vtype) {
      Ok(vdef) => vdef,
      Err(_) => {
        self.add_error(
          &def.name,
          format!("ValueType of `{}` is not valid within the schema", vtype),
        );
        return value.clone();
      }
    };

    let out = values
      .iter()
      .enumerate()
      .map(|(idx, v)| self.descend(&idx.to_string(), |jv| jv.validate_definition(&vdef, v)))
      .collect::<Vec<_>>();

    if def.options.unique == Some(true) || def.options.set == Some(true) {
      for (idx, v) in out.iter().enumerate() {
        if out[..idx].contains(v) {
          self.add_error(&def.name, format!("duplicate element {} at index {}", v, idx));
        }
      }
    }

    Value::Array(out)
  }

  fn validate_map_of(&mut self, def: &TypeDefinition, value: &Value) -> Value {
    let obj = match value.as_object() {
      Some(obj) => obj,
      None => return self.type_mismatch(def, "an object", value),
    };

    self.check_count(def, obj.len(), 0, "keys");

    let vtype = def.vtype().unwrap_or_default();
    let vdef = match self.resolve(vtype) {
      Ok(vdef) => vdef,
      Err(_) => {
        self.add_error(
          &def.name,
          format!("ValueType of `{}` is not valid within the schema", vtype),
        );
        return value.clone();
      }
    };

    // Keys are not validated against ktype, only expanded from compact ids
    let kdef = def.ktype().and_then(|k| self.resolve(k).ok());
    let key_items = kdef
      .as_ref()
      .filter(|k| k.is_enum() && k.options.id != Some(true))
      .map(|k| k.items().to_vec())
      .unwrap_or_default();

    let mut out = Map::new();
    for (key, v) in obj {
      let out_key = key
        .parse::<i64>()
        .ok()
        .and_then(|id| key_items.iter().find(|i| i.id == id))
        .map_or_else(|| key.clone(), |i| i.value.clone());

      let expanded = self.descend(key, |jv| jv.validate_definition(&vdef, v));
      out.insert(out_key, expanded);
    }

    Value::Object(out)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use indoc::indoc;
  use pretty_assertions::assert_eq;
  use serde_json::json;

  fn schema() -> Schema {
    Schema::loads(indoc!(
      r##"
      {
        "info": {"package": "http://example.com/test", "exports": ["Person"]},
        "types": [
          ["Person", "Record", [], "", [
            [1, "name", "String", ["{1", "}20"], ""],
            [2, "email", "String", ["/email", "[0"], ""],
            [3, "age", "Integer", ["{0", "}150", "[0"], ""],
            [4, "color", "Color", ["[0"], ""],
            [5, "tags", "String", ["[0", "]3"], ""]
          ]],
          ["Color", "Enumerated", [], "", [[1, "red", ""], [2, "green", ""]]],
          ["Items", "ArrayOf", ["*String", "{1", "q"], ""],
          ["Shape", "Choice", [], "", [
            [1, "circle", "Number", [], ""],
            [2, "label", "String", [], ""]
          ]],
          ["Point", "Array", [], "", [
            [1, "x", "Number", [], ""],
            [2, "y", "Number", [], ""],
            [3, "tag", "String", ["[0"], ""]
          ]],
          ["Scores", "MapOf", ["+Color", "*Integer"], ""],
          ["Attrs", "Map", ["}2"], "", [[1, "a", "String", [], ""]]],
          ["Pixel", "Map", [], "", [[1, "red", "Integer", [], ""], [2, "blue", "Integer", [], ""]]],
          ["Channel", "Enumerated", ["#Pixel"], "", []],
          ["Ratio", "Number", ["y0.0", "z1.0"], ""]
        ]
      }"##
    ))
    .unwrap()
  }

  fn errors(result: Result<Value>) -> Vec<String> {
    match result {
      Err(Error::Validation(errors)) => errors.iter().map(|e| format!("{} {}", e.location, e.reason)).collect(),
      other => panic!("expected validation errors, got {:?}", other),
    }
  }

  #[test]
  fn record_fields() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let s = schema();

    s.validate_as("Person", &json!({"name": "Alice", "email": "a@b.com", "tags": ["x", "y"]}))?;

    let errs = errors(s.validate_as("Person", &json!({"email": "nope", "extra": 1, "age": 200})));
    assert_eq!(errs.len(), 4);
    assert!(errs.iter().any(|e| e.contains("missing required field `name`")));
    assert!(errs.iter().any(|e| e.starts_with("/email format email")));
    assert!(errs.iter().any(|e| e.contains("`extra` is not a valid field of Person")));
    assert!(errs.iter().any(|e| e.starts_with("/age maximum value 150 exceeded")));

    let errs = errors(s.validate_as("Person", &json!({"name": "", "tags": ["a", "b", "c", "d"]})));
    assert!(errs.iter().any(|e| e == "/name minimum length of 1 characters not met"));
    assert!(errs.iter().any(|e| e.contains("allows at most 3 occurrences")));

    Ok(())
  }

  #[test]
  fn compact_forms() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let s = schema();

    assert_eq!(s.validate_as("Color", &json!(2))?, json!("green"));
    assert_eq!(
      s.validate_as("Person", &json!({"1": "Bob", "4": 1}))?,
      json!({"name": "Bob", "color": "red"})
    );
    assert_eq!(
      s.validate_as("Person", &json!(["Bob", null, 30]))?,
      json!({"name": "Bob", "age": 30})
    );
    assert_eq!(
      s.validate_as("Scores", &json!({"1": 10, "green": 5}))?,
      json!({"red": 10, "green": 5})
    );

    Ok(())
  }

  #[test]
  fn array_of_bounds_and_uniqueness() {
    let s = schema();

    assert!(s.validate_as("Items", &json!(["a", "b"])).is_ok());

    let errs = errors(s.validate_as("Items", &json!([])));
    assert_eq!(errs, vec![" minimum of 1 elements not met"]);

    let errs = errors(s.validate_as("Items", &json!(["a", "a"])));
    assert_eq!(errs, vec![" duplicate element \"a\" at index 1"]);

    let errs = errors(s.validate_as("Items", &json!(["a", 3])));
    assert_eq!(errs, vec!["/1 expected a string, got number 3"]);
  }

  #[test]
  fn multi_valued_fields() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let s = Schema::loads(indoc!(
      r#"
      {
        "info": {"package": "http://example.com/multi"},
        "types": [
          ["T", "Record", [], "", [
            [1, "names", "ArrayOf", ["*String", "[0", "]3"], ""],
            [2, "tags", "String", ["{2", "[0", "]0", "s"], ""]
          ]]
        ]
      }"#
    ))?;

    s.validate_as("T", &json!({"names": ["a", "b"], "tags": ["ab", "cd"]}))?;
    s.validate_as("T", &json!({}))?;

    let errs = errors(s.validate_as("T", &json!({"names": ["a", "b", "c", "d"], "tags": ["ab", "ab", "c"]})));
    assert_eq!(errs.len(), 3);
    assert!(errs.iter().any(|e| e == "/names maximum of 3 elements exceeded"));
    assert!(errs.iter().any(|e| e == "/tags/2 minimum length of 2 characters not met"));
    assert!(errs.iter().any(|e| e.contains("field `tags` has duplicate element \"ab\" at index 1")));

    let errs = errors(s.validate_as("T", &json!({"names": [], "tags": []})));
    assert_eq!(errs.len(), 2);
    assert!(errs.iter().any(|e| e == "/names minimum of 1 elements not met"));
    assert!(errs.iter().any(|e| e.contains("field `tags` requires at least 1 occurrences")));

    Ok(())
  }

  #[test]
  fn choice_and_array() {
    let s = schema();

    assert!(s.validate_as("Shape", &json!({"circle": 1.5})).is_ok());
    assert!(errors(s.validate_as("Shape", &json!({"circle": 1.5, "label": "x"})))[0]
      .contains("exactly one key"));
    assert!(errors(s.validate_as("Shape", &json!({"square": 1})))[0].contains("not a valid field"));

    assert!(s.validate_as("Point", &json!([1, 2])).is_ok());
    assert!(s.validate_as("Point", &json!([1, 2, "t"])).is_ok());
    assert!(errors(s.validate_as("Point", &json!([1])))[0].contains("missing required element `y`"));
    assert!(errors(s.validate_as("Point", &json!([1, 2, "t", 4])))[0].contains("maximum of 3 elements"));
  }

  #[test]
  fn maps_and_numbers() {
    let s = schema();

    assert!(s.validate_as("Attrs", &json!({"a": "x", "other": 1})).is_ok());
    assert!(errors(s.validate_as("Attrs", &json!({"a": "x", "b": 1, "c": 2})))[0].contains("maximum of 2 keys"));

    assert!(s.validate_as("Channel", &json!("blue")).is_ok());
    assert!(s.validate_as("Channel", &json!("green")).is_err());

    assert!(s.validate_as("Ratio", &json!(0.5)).is_ok());
    assert!(errors(s.validate_as("Ratio", &json!(1.5)))[0].contains("maximum value 1 exceeded"));
    assert!(s.validate_as("Ratio", &json!("0.5")).is_err());
  }

  #[test]
  fn unknown_type() {
    let err = schema().validate_as("Nope", &json!(1)).unwrap_err();
    assert_eq!(
      err.to_string(),
      "schema error: Nope is not a valid type within the schema"
    );
  }
}
