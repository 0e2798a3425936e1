//! Item derivation for Enumerated types declared with the `enum` (`#Type`)
//! or `pointer` (`>Type`) option.
//!
//! An `enum` derivation lists the fields of the referenced type. A `pointer`
//! derivation lists the JSON-pointer-like paths to every leaf field, walking
//! into fields marked with the `dir` option.

use indexmap::IndexMap;

use crate::{
  decl::TypeDecl,
  definition::{EnumItem, TypeDefinition},
  error::{Error, Result},
  options::Options,
};

/// Field or item of a referenced type, as seen by item derivation
#[derive(Debug, Clone, Copy)]
pub struct Member<'a> {
  pub id: i64,
  pub name: &'a str,
  /// Field type, empty for Enumerated items
  pub type_name: &'a str,
  /// Field is a directory for pointer derivation
  pub dir: bool,
  pub description: &'a str,
}

/// Read access to the members of named types
pub trait MemberLookup {
  /// Members of a declared type, `None` when the type is not declared
  fn members(&self, name: &str) -> Option<Vec<Member<'_>>>;
}

impl MemberLookup for IndexMap<String, TypeDecl> {
  fn members(&self, name: &str) -> Option<Vec<Member<'_>>> {
    let decl = self.get(name)?;

    if decl.is_enumerated() {
      return Some(
        decl
          .items
          .iter()
          .enumerate()
          .map(|(idx, i)| Member {
            id: i.id.unwrap_or(idx as i64 + 1),
            name: &i.value,
            type_name: "",
            dir: false,
            description: &i.description,
          })
          .collect(),
      );
    }

    Some(
      decl
        .fields
        .iter()
        .enumerate()
        .map(|(idx, f)| Member {
          id: f.id.unwrap_or(idx as u64 + 1) as i64,
          name: &f.name,
          type_name: &f.type_name,
          dir: f.options.dir.unwrap_or(false),
          description: &f.description,
        })
        .collect(),
    )
  }
}

impl MemberLookup for IndexMap<String, TypeDefinition> {
  fn members(&self, name: &str) -> Option<Vec<Member<'_>>> {
    let def = self.get(name)?;

    if def.is_enum() {
      return Some(
        def
          .items()
          .iter()
          .map(|i| Member {
            id: i.id,
            name: &i.value,
            type_name: "",
            dir: false,
            description: &i.description,
          })
          .collect(),
      );
    }

    Some(
      def
        .fields()
        .iter()
        .map(|f| Member {
          id: f.id as i64,
          name: &f.name,
          type_name: &f.type_name,
          dir: f.options.dir.unwrap_or(false),
          description: &f.description,
        })
        .collect(),
    )
  }
}

/// Items mirroring the fields of `name`, keeping their ids
pub fn enum_items<L: MemberLookup + ?Sized>(lookup: &L, name: &str) -> Result<Vec<EnumItem>> {
  let members = lookup.members(name).ok_or_else(|| not_found(name))?;

  Ok(
    members
      .iter()
      .map(|m| EnumItem {
        id: m.id,
        value: m.name.to_string(),
        description: m.description.to_string(),
      })
      .collect(),
  )
}

/// Items naming every leaf path of `name`, numbered from 1
pub fn pointer_items<L: MemberLookup + ?Sized>(lookup: &L, name: &str) -> Result<Vec<EnumItem>> {
  let mut paths = Vec::new();
  collect_paths(lookup, name, "", &mut Vec::new(), &mut paths)?;

  Ok(
    paths
      .into_iter()
      .enumerate()
      .map(|(n, (value, description))| EnumItem {
        id: n as i64 + 1,
        value,
        description,
      })
      .collect(),
  )
}

fn collect_paths<L: MemberLookup + ?Sized>(
  lookup: &L,
  name: &str,
  base: &str,
  visiting: &mut Vec<String>,
  paths: &mut Vec<(String, String)>,
) -> Result<()> {
  if visiting.iter().any(|v| v == name) {
    return Err(Error::Schema(format!(
      "pointer path through {} is recursive",
      name
    )));
  }

  let members = lookup.members(name).ok_or_else(|| not_found(name))?;
  visiting.push(name.to_string());

  for m in members {
    if m.dir {
      collect_paths(lookup, m.type_name, &format!("{}{}/", base, m.name), visiting, paths)?;
    } else {
      paths.push((format!("{}{}", base, m.name), m.description.to_string()));
    }
  }

  visiting.pop();
  Ok(())
}

/// Items of an Enumerated derived through the `enum` or `pointer` option,
/// `None` when neither option is present
pub fn derived_items<L: MemberLookup + ?Sized>(lookup: &L, options: &Options) -> Result<Option<Vec<EnumItem>>> {
  if let Some(name) = &options.enum_type {
    return enum_items(lookup, name).map(Some);
  }
  if let Some(name) = &options.pointer {
    return pointer_items(lookup, name).map(Some);
  }
  Ok(None)
}

/// Decodes a derivation reference such as `#Color` or `>Paths` used as a
/// vtype or ktype
pub fn derivation_ref(type_ref: &str) -> Option<Options> {
  if type_ref.starts_with('#') || type_ref.starts_with('>') {
    return Options::decode(&[type_ref]).ok();
  }
  None
}

/// Name of the explicit Enumerated replacing a derivation:
/// `{Type}{sys}Enum` or `{Type}{sys}Pointer`, suffixed with `-Id` when the
/// `id` option is set
pub fn derived_name(options: &Options, sys: &str) -> Option<String> {
  let (target, suffix) = match (&options.enum_type, &options.pointer) {
    (Some(target), _) => (target, "Enum"),
    (None, Some(target)) => (target, "Pointer"),
    (None, None) => return None,
  };

  let id = if options.id.unwrap_or(false) { "-Id" } else { "" };
  Some(format!("{}{}{}{}", target, sys, suffix, id))
}

fn not_found(name: &str) -> Error {
  Error::Schema(format!("{} does not exist within the schema", name))
}
