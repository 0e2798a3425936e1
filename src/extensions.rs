//! Extension unfolding: rewrites schema shorthand into explicit, equivalent
//! type declarations.
//!
//! Passes always run in the order of [`Extension::ALL`]. Each pass only sees
//! the types present when it starts, so types it synthesizes are not
//! rewritten again by the same pass.

use std::{collections::HashMap, convert::TryFrom, fmt, mem, str::FromStr};

use indexmap::IndexMap;
use log::debug;

use crate::{
  decl::{FieldDecl, ItemDecl, TypeDecl},
  definition::EnumItem,
  derive::{derivation_ref, derived_items, derived_name, enum_items},
  error::{DuplicateError, Error, Result},
  options::Options,
  types::{is_core_type, DataType},
  util::{capitalize, pluralize},
};

type Defs = IndexMap<String, TypeDecl>;

/// Schema shorthand that can be unfolded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
  /// Key and link fields
  Link,
  /// Fields occurring more than once
  Multiplicity,
  /// Field types with inline type options
  AnonymousType,
  /// Enumerated types derived with `enum` or `pointer`
  DerivedEnum,
  /// MapOf types keyed by an Enumerated
  MapOfEnum,
}

impl Extension {
  /// Every extension, in unfolding order
  pub const ALL: &'static [Extension] = &[
    Extension::Link,
    Extension::Multiplicity,
    Extension::AnonymousType,
    Extension::DerivedEnum,
    Extension::MapOfEnum,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Extension::Link => "Link",
      Extension::Multiplicity => "Multiplicity",
      Extension::AnonymousType => "AnonymousType",
      Extension::DerivedEnum => "DerivedEnum",
      Extension::MapOfEnum => "MapOfEnum",
    }
  }
}

impl fmt::Display for Extension {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Extension {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Extension::ALL
      .iter()
      .copied()
      .find(|e| e.as_str() == s)
      .ok_or_else(|| Error::Format(format!("{} is not a known extension", s)))
  }
}

/// Unfolds the selected extensions. An empty selection returns the
/// declarations unchanged.
pub fn unfold_extensions(types: Vec<TypeDecl>, sys: &str, extensions: &[Extension]) -> Result<Vec<TypeDecl>> {
  if extensions.is_empty() {
    return Ok(types);
  }

  let mut defs = Defs::with_capacity(types.len());
  for decl in types {
    if defs.contains_key(&decl.name) {
      return Err(
        DuplicateError {
          kind: "type",
          name: decl.name,
          scope: "schema".to_string(),
        }
        .into(),
      );
    }
    defs.insert(decl.name.clone(), decl);
  }

  for ext in Extension::ALL.iter().filter(|e| extensions.contains(*e)) {
    let before = defs.len();

    match ext {
      Extension::Link => unfold_link(&mut defs, sys)?,
      Extension::Multiplicity => unfold_multiplicity(&mut defs, sys)?,
      Extension::AnonymousType => unfold_anonymous_types(&mut defs, sys)?,
      Extension::DerivedEnum => unfold_derived_enum(&mut defs, sys)?,
      Extension::MapOfEnum => unfold_map_of_enum(&mut defs)?,
    }

    debug!("unfolded {}: {} types added", ext, defs.len() - before);
  }

  Ok(defs.into_values().collect())
}

/// `{Owner}{sys}{Part}`, with underscores replaced so the result is a valid
/// type name
fn synthesized_name(owner: &str, sys: &str, part: &str) -> String {
  format!("{}{}{}", owner, sys, capitalize(part)).replace('_', "-")
}

fn has_field_list(decl: &TypeDecl) -> bool {
  !decl.is_enumerated() && !decl.fields.is_empty()
}

fn same_definition(a: &TypeDecl, b: &TypeDecl) -> bool {
  a.data_type == b.data_type && a.options == b.options && a.fields == b.fields && a.items == b.items
}

/// Adds a synthesized declaration, returning the name it is stored under.
/// An identical declaration holding the name is reused; a different one
/// pushes the new declaration to the first free `{name}-{n}`.
fn insert_decl(defs: &mut Defs, mut decl: TypeDecl) -> String {
  let base = decl.name.clone();
  let mut n = 1;

  loop {
    match defs.get(&decl.name) {
      Some(existing) if same_definition(existing, &decl) => return decl.name,
      Some(_) => {
        n += 1;
        decl.name = format!("{}-{}", base, n);
      }
      None => {
        if n > 1 {
          debug!("{} is already declared, synthesized {} instead", base, decl.name);
        } else {
          debug!("synthesized {} ({})", decl.name, decl.data_type);
        }
        let name = decl.name.clone();
        defs.insert(name.clone(), decl);
        return name;
      }
    }
  }
}

fn not_core(owner: &str, field: &FieldDecl, base: &str) -> Error {
  Error::Schema(format!(
    "{}.{} -> {} is not a built in type",
    owner, field.name, base
  ))
}

fn unfold_link(defs: &mut Defs, sys: &str) -> Result<()> {
  let mut keys = HashMap::new();
  let mut linked = Vec::new();

  for idx in 0..defs.len() {
    if !has_field_list(&defs[idx]) {
      continue;
    }

    let owner = defs[idx].name.clone();
    let mut fields = mem::take(&mut defs[idx].fields);

    for field in fields.iter_mut() {
      if field.options.key == Some(true) {
        field.options.key = None;

        if is_core_type(&field.type_name) {
          let (field_opts, type_opts) = field.options.split();
          let name = insert_decl(
            defs,
            TypeDecl::new(
              synthesized_name(&owner, sys, &field.name),
              field.type_name.clone(),
              type_opts,
              field.description.clone(),
            ),
          );

          field.type_name = name;
          field.options = field_opts;
        }
        keys.insert(owner.clone(), field.type_name.clone());
      } else if field.options.link == Some(true) && !linked.contains(&idx) {
        linked.push(idx);
      }
    }

    defs[idx].fields = fields;
  }

  for idx in linked {
    let owner = defs[idx].name.clone();

    for field in defs[idx].fields.iter_mut().filter(|f| f.options.link == Some(true)) {
      field.options.link = None;
      match keys.get(&field.type_name) {
        Some(key) => field.type_name = key.clone(),
        None => {
          return Err(Error::Schema(format!(
            "{}/{}: \"{}\" has no primary key",
            owner, field.name, field.type_name
          )))
        }
      }
    }
  }

  Ok(())
}

fn unfold_multiplicity(defs: &mut Defs, sys: &str) -> Result<()> {
  for idx in 0..defs.len() {
    if !has_field_list(&defs[idx]) {
      continue;
    }

    let owner = defs[idx].name.clone();
    let mut fields = mem::take(&mut defs[idx].fields);

    for field in fields.iter_mut() {
      let maxc = match field.options.maxc {
        Some(maxc) if maxc != 1 => maxc,
        _ => continue,
      };

      let (mut field_opts, mut type_opts) = field.options.split();
      let minc = field_opts.minc.unwrap_or(1);

      let (base, mut options) = if field.options.is_array() {
        // Collection options apply to the array, the rest stay with the
        // element type
        let mut collection = Options {
          unique: type_opts.unique.take(),
          set: type_opts.set.take(),
          unordered: type_opts.unordered.take(),
          ..Default::default()
        };

        let vtype = if type_opts.is_empty() {
          field.type_name.clone()
        } else {
          if !is_core_type(&field.type_name) {
            return Err(not_core(&owner, field, &field.type_name));
          }
          insert_decl(
            defs,
            TypeDecl::new(
              format!("{}-Item", synthesized_name(&owner, sys, &field.name)),
              field.type_name.clone(),
              type_opts,
              field.description.clone(),
            ),
          )
        };
        collection.vtype = Some(vtype);

        (DataType::ArrayOf.as_str().to_string(), collection)
      } else {
        // An inline ArrayOf or MapOf holds every occurrence itself
        if !is_core_type(&field.type_name) {
          return Err(not_core(&owner, field, &field.type_name));
        }
        (field.type_name.clone(), type_opts)
      };
      options.bound_by_multiplicity(minc, maxc);

      let name = insert_decl(
        defs,
        TypeDecl::new(
          synthesized_name(&owner, sys, &pluralize(&field.name)),
          base,
          options,
          field.description.clone(),
        ),
      );

      field_opts.maxc = None;
      if minc != 0 {
        field_opts.minc = None;
      }
      field.type_name = name;
      field.options = field_opts;
    }

    defs[idx].fields = fields;
  }

  Ok(())
}

fn unfold_anonymous_types(defs: &mut Defs, sys: &str) -> Result<()> {
  for idx in 0..defs.len() {
    if !has_field_list(&defs[idx]) {
      continue;
    }

    let owner = defs[idx].name.clone();
    let mut fields = mem::take(&mut defs[idx].fields);

    for field in fields.iter_mut() {
      let (mut field_opts, mut type_opts) = field.options.split();

      if field.options.is_array() {
        // Collection options stay with the multi-valued field
        field_opts.unique = type_opts.unique.take();
        field_opts.set = type_opts.set.take();
        field_opts.unordered = type_opts.unordered.take();
      } else if let Some(maxc) = field_opts.maxc.filter(|maxc| *maxc != 1) {
        type_opts.bound_by_multiplicity(field_opts.minc.unwrap_or(1), maxc);
        field_opts.maxc = None;
        if field_opts.minc != Some(0) {
          field_opts.minc = None;
        }
      }

      if type_opts.is_empty() {
        continue;
      }

      let (name, base) = match derived_name(&type_opts, sys) {
        Some(name) => (name, DataType::Enumerated.as_str().to_string()),
        None => (synthesized_name(&owner, sys, &field.name), field.type_name.clone()),
      };

      if !is_core_type(&base) {
        return Err(not_core(&owner, field, &base));
      }
      let name = insert_decl(defs, TypeDecl::new(name, base, type_opts, field.description.clone()));

      field.type_name = name;
      field.options = field_opts;
    }

    defs[idx].fields = fields;
  }

  Ok(())
}

fn item_decls(items: Vec<EnumItem>) -> Vec<ItemDecl> {
  items
    .into_iter()
    .map(|i| ItemDecl::new(i.id, i.value, i.description))
    .collect()
}

fn unfold_derived_enum(defs: &mut Defs, sys: &str) -> Result<()> {
  // derived name -> explicit Enumerated standing in for it
  let mut explicit = HashMap::new();

  for idx in 0..defs.len() {
    let decl = &defs[idx];
    if !decl.is_enumerated() {
      continue;
    }
    let derived = match derived_name(&decl.options, sys) {
      Some(derived) => derived,
      None => continue,
    };
    let items = derived_items(&*defs, &decl.options)?.unwrap_or_default();

    let decl = &mut defs[idx];
    decl.items = item_decls(items);
    decl.options.enum_type = None;
    decl.options.pointer = None;
    explicit.insert(derived, decl.name.clone());
  }

  for idx in 0..defs.len() {
    if !matches!(defs[idx].base_type(), Some(DataType::ArrayOf) | Some(DataType::MapOf)) {
      continue;
    }

    let vtype = defs[idx].options.vtype.clone();
    if let Some(name) = explicit_enum(defs, &mut explicit, vtype.as_deref(), sys)? {
      defs[idx].options.vtype = Some(name);
    }

    let ktype = defs[idx].options.ktype.clone();
    if let Some(name) = explicit_enum(defs, &mut explicit, ktype.as_deref(), sys)? {
      defs[idx].options.ktype = Some(name);
    }
  }

  Ok(())
}

/// Name of the explicit Enumerated replacing a `#Type`/`>Type` reference,
/// created unless an identical one exists
fn explicit_enum(
  defs: &mut Defs,
  explicit: &mut HashMap<String, String>,
  reference: Option<&str>,
  sys: &str,
) -> Result<Option<String>> {
  let options = match reference.and_then(derivation_ref) {
    Some(options) => options,
    None => return Ok(None),
  };
  let name = match derived_name(&options, sys) {
    Some(name) => name,
    None => return Ok(None),
  };

  if let Some(existing) = explicit.get(&name) {
    return Ok(Some(existing.clone()));
  }

  let items = derived_items(&*defs, &options)?.unwrap_or_default();
  let stored = insert_decl(
    defs,
    TypeDecl::new(name.clone(), DataType::Enumerated.as_str(), Options::default(), "").with_items(item_decls(items)),
  );
  explicit.insert(name, stored.clone());

  Ok(Some(stored))
}

/// Items of an enumerated key type, `None` when the key type is not
/// enumerated
fn key_items(defs: &Defs, ktype: &str) -> Result<Option<Vec<EnumItem>>> {
  if let Some(options) = derivation_ref(ktype) {
    return derived_items(defs, &options);
  }

  match defs.get(ktype) {
    Some(decl) if decl.is_enumerated() => match derived_items(defs, &decl.options)? {
      Some(items) => Ok(Some(items)),
      None => enum_items(defs, ktype).map(Some),
    },
    _ => Ok(None),
  }
}

fn unfold_map_of_enum(defs: &mut Defs) -> Result<()> {
  for idx in 0..defs.len() {
    let decl = &defs[idx];
    if decl.base_type() != Some(DataType::MapOf) {
      continue;
    }

    let ktype = decl.options.ktype.as_deref().unwrap_or_default();
    let items = match key_items(defs, ktype)? {
      Some(items) => items,
      None => continue,
    };
    let vtype = decl.options.vtype.clone().unwrap_or_default();

    let fields = items
      .into_iter()
      .map(|i| {
        let id = u64::try_from(i.id).map_err(|_| {
          Error::Schema(format!(
            "{}: key `{}` has id {}, which is not a valid field id",
            decl.name, i.value, i.id
          ))
        })?;
        let options = Options {
          minc: Some(0),
          ..Default::default()
        };
        Ok(FieldDecl::new(id, i.value, vtype.clone(), options, i.description))
      })
      .collect::<Result<Vec<_>>>()?;

    let decl = &mut defs[idx];
    decl.data_type = DataType::Map.as_str().to_string();
    decl.options.ktype = None;
    decl.options.vtype = None;
    decl.fields = fields;
  }

  Ok(())
}
