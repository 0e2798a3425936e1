use std::borrow::Cow;

/// Replaces every run of characters that cannot appear in an identifier with
/// `__`. Names that are already valid identifiers are returned unchanged.
pub fn safe_identifier(name: &str) -> Cow<str> {
  let is_ident_char = |c: char| c.is_ascii_alphanumeric() || c == '_';

  let valid = name
    .chars()
    .next()
    .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
    && name.chars().all(is_ident_char);
  if valid {
    return Cow::Borrowed(name);
  }

  let mut out = String::with_capacity(name.len() + 2);
  let mut in_run = false;
  for c in name.chars() {
    if is_ident_char(c) {
      out.push(c);
      in_run = false;
    } else if !in_run {
      out.push_str("__");
      in_run = true;
    }
  }

  if out.starts_with(|c: char| c.is_ascii_digit()) {
    out.insert(0, '_');
  }

  Cow::Owned(out)
}

/// Uppercases the first character
pub fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

/// Heuristic check for an English plural noun
pub fn is_plural(word: &str) -> bool {
  let lower = word.to_ascii_lowercase();
  if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
    return false;
  }
  lower.ends_with('s') || lower.ends_with("data") || lower.ends_with("children")
}

/// Pluralizes a singular English noun, leaving words that already look plural
/// untouched
pub fn pluralize(word: &str) -> String {
  if word.is_empty() || is_plural(word) {
    return word.to_string();
  }

  let lower = word.to_ascii_lowercase();
  if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| lower.ends_with(suffix)) {
    return format!("{}es", word);
  }

  let mut chars = lower.chars().rev();
  if let (Some('y'), Some(prev)) = (chars.next(), chars.next()) {
    if !"aeiou".contains(prev) {
      return format!("{}ies", &word[..word.len() - 1]);
    }
  }

  format!("{}s", word)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn identifiers() {
    assert_eq!(safe_identifier("Person"), "Person");
    assert_eq!(safe_identifier("T-anon$vtype"), "T__anon__vtype");
    assert_eq!(safe_identifier("ns:Type"), "ns__Type");
  }

  #[test]
  fn plurals() {
    assert_eq!(pluralize("sibling"), "siblings");
    assert_eq!(pluralize("siblings"), "siblings");
    assert_eq!(pluralize("address"), "addresses");
    assert_eq!(pluralize("entry"), "entries");
    assert_eq!(pluralize("key"), "keys");
    assert_eq!(pluralize("list"), "lists");
    assert_eq!(capitalize("siblings"), "Siblings");
  }
}
