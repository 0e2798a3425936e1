use indoc::indoc;
use jadn::{decl::decls_from_value, unfold_extensions, Extension, Kind, Schema};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn multiplicity_field_becomes_array_of() -> Result<(), Box<dyn std::error::Error>> {
  let decls = decls_from_value(&json!([
    ["T", "Record", [], "", [[1, "list", "String", ["]3"], ""]]]
  ]))?;

  let unfolded = unfold_extensions(decls, "$", &[Extension::Multiplicity])?;
  let field = &unfolded[0].fields[0];

  assert!(field.type_name.starts_with("T$"));
  assert_eq!(field.options.maxc, None);

  let array = unfolded
    .iter()
    .find(|d| d.name == field.type_name)
    .ok_or("synthesized ArrayOf missing")?;
  assert_eq!(array.data_type, "ArrayOf");
  assert_eq!(array.options.vtype.as_deref(), Some("String"));
  assert_eq!(array.options.maxv, Some(3));

  Ok(())
}

#[test]
fn derived_enum_mirrors_fields() -> Result<(), Box<dyn std::error::Error>> {
  let decls = decls_from_value(&json!([
    ["Color", "Map", [], "", [
      [1, "red", "Integer", [], "rojo"],
      [2, "green", "Integer", [], "verde"],
      [4, "blue", "Integer", [], "azul"]
    ]],
    ["Channel", "Enumerated", ["#Color"], "", []]
  ]))?;

  let unfolded = unfold_extensions(decls, "$", &[Extension::DerivedEnum])?;
  let items = unfolded[1]
    .items
    .iter()
    .map(|i| (i.id, i.value.as_str(), i.description.as_str()))
    .collect::<Vec<_>>();

  assert_eq!(
    items,
    vec![(Some(1), "red", "rojo"), (Some(2), "green", "verde"), (Some(4), "blue", "azul")]
  );
  assert_eq!(unfolded[1].options.enum_type, None);

  Ok(())
}

static SHORTHAND: &str = indoc!(
  r#"
  {
    "info": {"package": "http://example.com/shorthand", "exports": ["Inventory"]},
    "types": [
      ["Inventory", "Record", [], "", [
        [1, "owner", "Person", ["L"], ""],
        [2, "items", "Item", ["]0"], ""],
        [3, "counts", "Counts", ["[0"], ""],
        [4, "updated", "String", ["/date-time", "[0"], ""]
      ]],
      ["Person", "Record", [], "", [
        [1, "id", "String", ["K", "{1"], ""],
        [2, "name", "String", [], ""]
      ]],
      ["Item", "Record", [], "", [
        [1, "sku", "String", [], ""],
        [2, "qty", "Integer", [], ""]
      ]],
      ["Counts", "MapOf", ["*Integer", "+#Item"], ""]
    ]
  }"#
);

#[test]
fn simplify_removes_all_shorthand() -> Result<(), Box<dyn std::error::Error>> {
  let schema = Schema::loads(SHORTHAND)?;
  let simple = schema.simplify(None)?;

  let names = simple.types().map(|t| t.name.as_str()).collect::<Vec<_>>();
  assert_eq!(
    names,
    vec![
      "Inventory",
      "Person",
      "Item",
      "Counts",
      "Person$Id",
      "Inventory$Items",
      "Inventory$Updated",
      "Item$Enum"
    ]
  );

  let inventory = simple.get("Inventory").ok_or("missing Inventory")?;
  let field_types = inventory
    .fields()
    .iter()
    .map(|f| (f.type_name.as_str(), f.options.encode()))
    .collect::<Vec<_>>();
  assert_eq!(
    field_types,
    vec![
      ("Person$Id", vec![]),
      ("Inventory$Items", vec![]),
      ("Counts", vec!["[0".to_string()]),
      ("Inventory$Updated", vec!["[0".to_string()]),
    ]
  );

  let counts = simple.get("Counts").ok_or("missing Counts")?;
  assert!(matches!(counts.kind, Kind::Map(_)));
  assert_eq!(
    counts.fields().iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
    vec!["sku", "qty"]
  );

  assert_eq!(simple.simplify(None)?, simple);

  Ok(())
}

#[test]
fn simplified_schema_validates_the_same_instances() -> Result<(), Box<dyn std::error::Error>> {
  let schema = Schema::loads(SHORTHAND)?;
  let simple = schema.simplify(None)?;

  let inventory = json!({
    "owner": "p-1",
    "items": [{"sku": "a-1", "qty": 2}],
    "counts": {"sku": 1},
    "updated": "2024-05-01T10:00:00Z"
  });
  assert!(simple.validate(&inventory).is_ok());

  let bad = json!({"owner": "", "items": []});
  let errors = simple.validate(&bad).unwrap_err();
  assert_eq!(errors.validation_errors().map(<[_]>::len), Some(2));

  Ok(())
}

#[test]
fn selected_extensions_only() -> Result<(), Box<dyn std::error::Error>> {
  let schema = Schema::loads(SHORTHAND)?;

  let simple = schema.simplify(Some(&[Extension::AnonymousType]))?;
  assert!(simple.get("Inventory$Updated").is_some());
  assert_eq!(
    simple.get("Inventory").map(|t| t.fields()[0].type_name.as_str()),
    Some("Person")
  );
  assert!(matches!(simple.get("Counts").map(|c| &c.kind), Some(Kind::MapOf)));

  assert_eq!(schema.simplify(Some(&[]))?, schema);

  Ok(())
}

static EDGES: &str = indoc!(
  r#"
  {
    "info": {"package": "http://example.com/edges", "exports": ["T"]},
    "types": [
      ["T", "Record", [], "", [
        [1, "names", "ArrayOf", ["*String", "[0", "]3"], ""],
        [2, "scores", "MapOf", ["+String", "*Integer", "[0", "]0"], ""],
        [3, "tags", "String", ["{2", "[0", "]0", "s", "b"], ""],
        [4, "item", "String", ["[0", "]3"], ""],
        [5, "items", "Integer", ["[0", "]2"], ""],
        [6, "list", "String", ["[0", "]2"], ""]
      ]],
      ["T$Lists", "Integer", [], ""]
    ]
  }"#
);

#[test]
fn unfolding_keeps_edge_cases_equivalent() -> Result<(), Box<dyn std::error::Error>> {
  let schema = Schema::loads(EDGES)?;
  let simple = schema.simplify(None)?;

  assert_eq!(
    simple.types().map(|t| t.name.as_str()).collect::<Vec<_>>(),
    vec!["T", "T$Lists", "T$Names", "T$Scores", "T$Tags-Item", "T$Tags", "T$Items", "T$Items-2", "T$Lists-2"]
  );

  let cases = vec![
    (json!({}), true),
    (json!({"names": ["a", "b"]}), true),
    (json!({"names": ["a", "b", "c", "d"]}), false),
    (json!({"names": []}), false),
    (json!({"scores": {"a": 1}}), true),
    (json!({"scores": {}}), false),
    (json!({"tags": ["ab", "cd"]}), true),
    (json!({"tags": ["ab", "ab"]}), false),
    (json!({"tags": ["a"]}), false),
    (json!({"item": ["a"], "items": [1]}), true),
    (json!({"items": ["a"]}), false),
    (json!({"list": ["a", "b"]}), true),
    (json!({"list": [1]}), false),
  ];

  let anonymous = schema.simplify(Some(&[Extension::AnonymousType]))?;
  assert_eq!(
    anonymous.get("T").map(|t| t.fields()[2].options.encode()),
    Some(vec!["s".to_string(), "b".to_string(), "[0".to_string(), "]0".to_string()])
  );

  for (instance, valid) in cases {
    assert_eq!(schema.validate_as("T", &instance).is_ok(), valid, "before unfolding: {}", instance);
    assert_eq!(simple.validate_as("T", &instance).is_ok(), valid, "after unfolding: {}", instance);
    assert_eq!(anonymous.validate_as("T", &instance).is_ok(), valid, "anonymous types only: {}", instance);
  }

  assert_eq!(simple.simplify(None)?, simple);

  Ok(())
}
