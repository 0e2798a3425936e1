//! Deterministic pretty printer for JADN documents.
//!
//! Objects put each member on its own line. Lists stay on one line unless
//! their first element is itself a list, in which case every element gets its
//! own line. This keeps each type declaration on a single line with its
//! fields listed underneath.

use serde_json::Value;

/// Serializes `value` with the given indent (rounded down to an even number)
pub fn dumps(value: &Value, indent: usize) -> String {
  dumps_level(value, indent, 0)
}

fn dumps_level(value: &Value, indent: usize, level: usize) -> String {
  let width = indent - indent % 2 + level * 2;
  let ind = " ".repeat(width);
  let ind_end = " ".repeat(width.saturating_sub(2));

  match value {
    Value::Object(map) if map.is_empty() => "{}".to_string(),
    Value::Object(map) => {
      let lines = map
        .iter()
        .map(|(k, v)| format!("{}{}: {}", ind, scalar(&Value::String(k.clone())), dumps_level(v, indent, level + 1)))
        .collect::<Vec<_>>();

      format!("{{\n{}\n{}}}", lines.join(",\n"), ind_end)
    }
    Value::Array(items) => {
      let nested = matches!(items.first(), Some(Value::Array(_)));
      let item_level = if nested && matches!(items.last(), Some(Value::Array(_))) {
        level + 1
      } else {
        level
      };

      let lines = items
        .iter()
        .map(|v| dumps_level(v, indent, item_level))
        .collect::<Vec<_>>();

      if nested {
        format!("[\n{}{}\n{}]", ind, lines.join(&format!(",\n{}", ind)), ind_end)
      } else {
        format!("[{}]", lines.join(", "))
      }
    }
    scalar_value => scalar(scalar_value),
  }
}

fn scalar(value: &Value) -> String {
  serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}
