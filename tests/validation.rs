use indoc::indoc;
use jadn::{validate_json_from_str, Error, Schema};
use pretty_assertions::assert_eq;
use serde_json::json;

static PERSON: &str = indoc!(
  r#"
  {
    "info": {"package": "http://example.com/people", "exports": ["Person"]},
    "types": [
      ["Person", "Record", [], "", [
        [1, "name", "String", [], ""],
        [2, "id", "Integer", [], ""],
        [3, "email", "String", ["/email", "[0"], ""]
      ]]
    ]
  }"#
);

fn reasons(err: Error) -> Vec<String> {
  err
    .validation_errors()
    .unwrap_or_default()
    .iter()
    .map(|e| format!("{} {}", e.location, e.reason))
    .collect()
}

#[test]
fn record_with_optional_field() -> Result<(), Box<dyn std::error::Error>> {
  let schema = Schema::loads(PERSON)?;

  let person = json!({"name": "Ann", "id": 3, "email": "a@b.com"});
  assert_eq!(schema.validate_as("Person", &person)?, person);

  let err = schema
    .validate_as("Person", &json!({"id": 3, "email": "a@b.com"}))
    .unwrap_err();
  assert_eq!(reasons(err), vec![" missing required field `name`"]);

  Ok(())
}

#[test]
fn array_of_minimum() -> Result<(), Box<dyn std::error::Error>> {
  let schema = Schema::loads(r#"{"types": [["Names", "ArrayOf", ["*String", "{1"], ""]]}"#)?;

  assert!(schema.validate_as("Names", &json!([])).is_err());
  assert_eq!(schema.validate_as("Names", &json!(["x"]))?, json!(["x"]));

  Ok(())
}

#[test]
fn every_violation_is_reported() -> Result<(), Box<dyn std::error::Error>> {
  let schema = Schema::loads(PERSON)?;

  let err = schema
    .validate_as("Person", &json!({"name": 7, "id": "three", "email": "nope"}))
    .unwrap_err();
  let reasons = reasons(err);

  assert_eq!(reasons.len(), 3);
  assert_eq!(reasons[0], "/name expected a string, got number 7");
  assert_eq!(reasons[1], "/id expected an integer, got string \"three\"");
  assert!(reasons[2].starts_with("/email format email"));

  Ok(())
}

#[test]
fn convenience_entry_point() {
  assert!(validate_json_from_str(PERSON, "Person", r#"{"name": "Ann", "id": 1}"#).is_ok());
  assert!(matches!(
    validate_json_from_str(PERSON, "Person", r#"{"name": "Ann""#),
    Err(Error::JSONParsing(_))
  ));
  assert!(matches!(
    validate_json_from_str(PERSON, "Person", r#"{"name": "Ann"}"#),
    Err(Error::Validation(_))
  ));
}

static COMMAND: &str = indoc!(
  r#"
  {
    "info": {
      "package": "http://example.com/commands/v1.0",
      "exports": ["Command"],
      "config": {"$MaxString": 16}
    },
    "types": [
      ["Command", "Record", [], "", [
        [1, "action", "Action", [], ""],
        [2, "target", "Target", [], ""],
        [3, "args", "Args", ["[0"], ""],
        [4, "command_id", "String", ["[0"], ""]
      ]],
      ["Action", "Enumerated", [], "", [[1, "scan", ""], [2, "locate", ""], [3, "query", ""]]],
      ["Target", "Choice", [], "", [
        [1, "device", "Device", [], ""],
        [2, "features", "Features", [], ""],
        [3, "ipv4_net", "IPv4-Net", [], ""]
      ]],
      ["Device", "Map", [], "", [
        [1, "hostname", "String", ["/hostname", "[0"], ""],
        [2, "device_id", "String", ["[0"], ""]
      ]],
      ["Features", "ArrayOf", ["*Feature", "q"], ""],
      ["Feature", "Enumerated", [], "", [[1, "versions", ""], [2, "profiles", ""]]],
      ["IPv4-Net", "Array", ["/ipv4-net"], "", [
        [1, "ipv4_addr", "Binary", ["/ipv4-addr"], ""],
        [2, "prefix_length", "Integer", ["[0"], ""]
      ]],
      ["Args", "Map", ["{1"], "", [
        [1, "duration", "Integer", ["{0", "[0"], ""],
        [2, "response_requested", "Boolean", ["[0"], ""]
      ]]
    ]
  }"#
);

#[test]
fn verbose_command() -> Result<(), Box<dyn std::error::Error>> {
  let schema = Schema::loads(COMMAND)?;

  let command = json!({
    "action": "query",
    "target": {"features": ["versions", "profiles"]},
    "args": {"response_requested": true}
  });
  assert_eq!(schema.validate(&command)?, command);

  let command = json!({"action": "scan", "target": {"device": {"hostname": "sensor.example.com"}}});
  assert!(schema.validate(&command).is_ok());

  Ok(())
}

#[test]
fn compact_command_is_expanded() -> Result<(), Box<dyn std::error::Error>> {
  let schema = Schema::loads(COMMAND)?;

  let compact = json!({"1": 3, "2": {"2": [1, 2]}, "3": {"1": 30}});
  assert_eq!(
    schema.validate(&compact)?,
    json!({
      "action": "query",
      "target": {"features": ["versions", "profiles"]},
      "args": {"duration": 30}
    })
  );

  Ok(())
}

#[test]
fn command_violations() -> Result<(), Box<dyn std::error::Error>> {
  let schema = Schema::loads(COMMAND)?;

  let err = schema
    .validate_as(
      "Command",
      &json!({
        "action": "dance",
        "target": {"features": ["versions", "versions"]},
        "args": {},
        "command_id": "a-very-long-command-id"
      }),
    )
    .unwrap_err();

  assert_eq!(
    reasons(err),
    vec![
      "/action `dance` is not a valid value of Action, expected one of [\"scan\", \"locate\", \"query\"]",
      "/target/features duplicate element \"versions\" at index 1",
      "/args minimum of 1 keys not met",
      "/command_id maximum length of 16 characters exceeded",
    ]
  );

  let err = schema
    .validate_as("Command", &json!({"action": "scan", "target": {"device": {}, "features": []}}))
    .unwrap_err();
  assert_eq!(reasons(err), vec!["/target choice requires exactly one key, got 2"]);

  Ok(())
}

#[test]
fn network_formats() -> Result<(), Box<dyn std::error::Error>> {
  let schema = Schema::loads(COMMAND)?;

  let target = json!({"ipv4_net": ["192.168.0.0", 24]});
  assert!(schema.validate_as("Target", &target).is_ok());

  let target = json!({"ipv4_net": ["192.168.0.0", 33]});
  assert!(schema.validate_as("Target", &target).is_err());

  Ok(())
}
