use indoc::indoc;
use jadn::{DataType, Schema};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

static MUSIC: &str = indoc!(
  r#"
  {
    "info": {
      "package": "http://example.com/music",
      "version": "1.0",
      "title": "Music Library",
      "comment": "track listings",
      "namespaces": {"ext": "http://example.com/ext"},
      "exports": ["Library"]
    },
    "types": [
      ["Library", "MapOf", ["*Album", "+Barcode", "{1"], "Albums by barcode"],
      ["Barcode", "String", ["%^\\d{12}$"], ""],
      ["Album", "Record", [], "", [
        [1, "title", "String", [], ""],
        [2, "tracks", "Track", ["]0"], ""],
        [3, "cover", "Binary", ["/x", "[0"], "hex encoded"],
        [4, "genre", "Genre", ["[0"], ""],
        [5, "label", "ext:Label", ["[0"], ""]
      ]],
      ["Track", "Array", [], "", [
        [1, "number", "Integer", ["{1"], ""],
        [2, "title", "String", [], ""],
        [3, "length", "Number", ["y0.0", "[0"], ""]
      ]],
      ["Genre", "Enumerated", [], "", [[1, "rock", ""], [2, "jazz", ""], [3, "classical", ""]]],
      ["Unused", "Boolean", [], ""]
    ]
  }"#
);

#[test]
fn round_trip() -> Result<(), Box<dyn std::error::Error>> {
  let schema = Schema::loads(MUSIC)?;
  let expected: Value = serde_json::from_str(MUSIC)?;

  let doc = schema.schema()?;
  assert_eq!(doc, expected);
  assert_eq!(doc["info"], expected["info"]);
  assert_eq!(Schema::from_value(&doc)?, schema);

  Ok(())
}

#[test]
fn reflection() -> Result<(), Box<dyn std::error::Error>> {
  let schema = Schema::loads(MUSIC)?;

  assert_eq!(schema.len(), 6);
  assert_eq!(schema.exports(), ["Library".to_string()]);

  let info = schema.info().ok_or("missing info")?;
  assert_eq!(info.title.as_deref(), Some("Music Library"));
  assert_eq!(info.comment.as_deref(), Some("track listings"));
  assert_eq!(schema.config().max_string(), 255);

  let album = schema.get("Album").ok_or("missing Album")?;
  assert_eq!(album.data_type(), DataType::Record);
  assert!(album.is_structure());
  assert!(album.fields()[1].is_required());
  assert!(album.fields()[1].options.is_array());
  assert!(!album.fields()[2].is_required());

  let genre = schema.get("Genre").ok_or("missing Genre")?;
  assert!(genre.is_selector());
  assert_eq!(genre.items().len(), 3);

  let library = schema.get("Library").ok_or("missing Library")?;
  assert_eq!(library.ktype(), Some("Barcode"));
  assert_eq!(library.vtype(), Some("Album"));

  Ok(())
}

#[test]
fn analysis() -> Result<(), Box<dyn std::error::Error>> {
  let schema = Schema::loads(MUSIC)?;

  let analysis = schema.analyze();
  assert_eq!(analysis.unreferenced, vec!["Unused"]);
  assert!(analysis.undefined.is_empty());
  assert!(analysis.cycles.is_empty());

  let deps = schema.dependencies();
  assert_eq!(
    deps["Album"].iter().map(String::as_str).collect::<Vec<_>>(),
    vec!["Genre", "Track", "ext:Label"]
  );
  assert_eq!(
    deps["Library"].iter().map(String::as_str).collect::<Vec<_>>(),
    vec!["Album", "Barcode"]
  );
  assert!(deps["Unused"].is_empty());

  Ok(())
}

#[test]
fn validate_library() -> Result<(), Box<dyn std::error::Error>> {
  let schema = Schema::loads(MUSIC)?;

  let library = json!({
    "012345678901": {
      "title": "Kind of Blue",
      "tracks": [[1, "So What", 562.0], [2, "Freddie Freeloader"]],
      "cover": "89504e47",
      "genre": 2
    }
  });

  let expanded = schema.validate(&library)?;
  assert_eq!(expanded["012345678901"]["genre"], json!("jazz"));

  let library = json!({
    "012345678901": {"title": "Blue", "tracks": [[0, "Intro"]], "cover": "zz"}
  });
  let err = schema.validate(&library).unwrap_err();
  let locations = err
    .validation_errors()
    .unwrap_or_default()
    .iter()
    .map(|e| e.location.as_str())
    .collect::<Vec<_>>();
  assert_eq!(
    locations,
    vec!["/012345678901/tracks/0/0", "/012345678901/cover"]
  );

  Ok(())
}

#[test]
fn canonical_text() -> Result<(), Box<dyn std::error::Error>> {
  let schema = Schema::loads(indoc!(
    r#"
    {"types": [["Pair", "Array", [], "", [[1, "left", "String", [], ""], [2, "right", "String", [], ""]]], ["Names", "ArrayOf", ["*String"], ""]]}
    "#
  ))?;

  let expected = indoc! {r#"
    {
      "types": [
        ["Pair", "Array", [], "", [
          [1, "left", "String", [], ""],
          [2, "right", "String", [], ""]
        ]],
        ["Names", "ArrayOf", ["*String"], ""]
      ]
    }"#};

  assert_eq!(schema.dumps(2)?, expected);
  assert_eq!(Schema::loads(&schema.dumps(4)?)?, schema);

  Ok(())
}

#[test]
fn dump_and_load_file() -> Result<(), Box<dyn std::error::Error>> {
  let schema = Schema::loads(MUSIC)?;
  let path = std::env::temp_dir().join(format!("jadn-music-{}.jadn", std::process::id()));

  schema.dump(&path, 2)?;
  let loaded = Schema::load(&path);
  std::fs::remove_file(&path)?;

  assert_eq!(loaded?, schema);
  assert!(Schema::load(&path).is_err());

  Ok(())
}
