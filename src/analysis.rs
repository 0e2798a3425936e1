//! Reference analysis: which declared types are never used and which
//! referenced types are never declared

use std::collections::BTreeSet;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::{
  definition::{Kind, TypeDefinition},
  info::Information,
  options::Options,
  types::is_core_type,
};

/// Result of [`analyze`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Analysis {
  /// Declared types and namespaces never referenced, in declaration order
  pub unreferenced: Vec<String>,
  /// Referenced names with no declaration, sorted
  pub undefined: Vec<String>,
  /// Always empty, reference cycles are not computed
  pub cycles: Vec<Vec<String>>,
}

impl Analysis {
  pub fn is_clean(&self) -> bool {
    self.unreferenced.is_empty() && self.undefined.is_empty()
  }
}

/// Strips a leading `#` or `>` derivation marker
fn strip_marker(name: &str) -> &str {
  name
    .strip_prefix('#')
    .or_else(|| name.strip_prefix('>'))
    .unwrap_or(name)
}

fn option_refs(options: &Options, refs: &mut BTreeSet<String>) {
  for name in [
    &options.ktype,
    &options.vtype,
    &options.enum_type,
    &options.pointer,
  ]
  .iter()
  .copied()
  .flatten()
  {
    refs.insert(strip_marker(name).to_string());
  }
}

/// Names directly referenced by a definition, excluding base data types
pub fn type_dependencies(def: &TypeDefinition) -> BTreeSet<String> {
  let mut refs = BTreeSet::new();

  match &def.kind {
    Kind::ArrayOf | Kind::MapOf | Kind::Enumerated(_) => option_refs(&def.options, &mut refs),
    _ => {}
  }

  for field in def.fields() {
    refs.insert(field.type_name.clone());
    option_refs(&field.options, &mut refs);
  }

  refs.retain(|r| !r.is_empty() && !is_core_type(r));
  refs
}

/// Dependencies of every definition, in declaration order
pub fn dependencies(types: &IndexMap<String, TypeDefinition>) -> IndexMap<String, BTreeSet<String>> {
  types
    .iter()
    .map(|(name, def)| (name.clone(), type_dependencies(def)))
    .collect()
}

/// Finds unreferenced and undefined names. Exports count as references.
/// References qualified with a declared namespace (`ns:Type`) resolve to the
/// namespace.
pub fn analyze(info: Option<&Information>, types: &IndexMap<String, TypeDefinition>) -> Analysis {
  let namespaces = info.map(|i| &i.namespaces);
  let exports = info.map(|i| i.exports.as_slice()).unwrap_or(&[]);

  let mut defs: IndexSet<String> = types.keys().cloned().collect();
  if let Some(namespaces) = namespaces {
    defs.extend(namespaces.keys().cloned());
  }

  let mut refs = BTreeSet::new();
  for deps in dependencies(types).into_values() {
    for dep in deps {
      let resolved = match dep.split_once(':') {
        Some((ns, _)) if namespaces.map_or(false, |n| n.contains_key(ns)) => ns.to_string(),
        _ => dep.clone(),
      };
      refs.insert(resolved);
    }
  }
  refs.extend(exports.iter().map(|e| strip_marker(e).to_string()));

  Analysis {
    unreferenced: defs.iter().filter(|d| !refs.contains(*d)).cloned().collect(),
    undefined: refs.iter().filter(|r| !defs.contains(*r)).cloned().collect(),
    cycles: Vec::new(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::decl::decls_from_value;
  use pretty_assertions::assert_eq;
  use serde_json::json;

  fn definitions(types: serde_json::Value) -> IndexMap<String, TypeDefinition> {
    decls_from_value(&types)
      .unwrap()
      .iter()
      .map(|d| (d.name.clone(), TypeDefinition::from_decl(d).unwrap()))
      .collect()
  }

  #[test]
  fn field_and_option_dependencies() {
    let types = definitions(json!([
      ["Root", "Record", [], "", [
        [1, "items", "ArrayOf", ["*Item", "[0"], ""],
        [2, "color", "Enumerated", ["#Color"], ""],
        [3, "name", "String", [], ""]
      ]],
      ["Masks", "ArrayOf", ["*#Color"], ""]
    ]));

    let deps = dependencies(&types);
    assert_eq!(
      deps["Root"].iter().map(String::as_str).collect::<Vec<_>>(),
      vec!["Color", "Item"]
    );
    assert_eq!(
      deps["Masks"].iter().map(String::as_str).collect::<Vec<_>>(),
      vec!["Color"]
    );
  }

  #[test]
  fn unreferenced_and_undefined() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let types = definitions(json!([
      ["Root", "Record", [], "", [
        [1, "a", "Missing", [], ""],
        [2, "b", "ext:Thing", [], ""],
        [3, "c", "Channel", [], ""]
      ]],
      ["Channel", "Enumerated", ["#Pixel"], "", []],
      ["Pixel", "Map", [], "", [[1, "red", "Integer", [], ""]]],
      ["Orphan", "String", [], ""]
    ]));

    let info: Information = serde_json::from_value(json!({
      "exports": ["Root"],
      "namespaces": {"ext": "http://example.com/ext", "unused": "http://example.com/unused"}
    }))?;

    let analysis = analyze(Some(&info), &types);
    assert_eq!(analysis.unreferenced, vec!["Orphan", "unused"]);
    assert_eq!(analysis.undefined, vec!["Missing"]);
    assert!(analysis.cycles.is_empty());

    let analysis = analyze(None, &types);
    assert_eq!(analysis.unreferenced, vec!["Root", "Orphan"]);
    assert_eq!(analysis.undefined, vec!["Missing", "ext:Thing"]);

    Ok(())
  }
}
