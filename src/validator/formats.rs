//! Named semantic formats referenced by the `format` option

use std::{
  collections::HashMap,
  convert::TryFrom,
  fmt,
  net::{Ipv4Addr, Ipv6Addr},
  sync::{Arc, OnceLock},
};

use chrono::{DateTime, NaiveDate, NaiveTime};
use data_encoding::{BASE64URL_NOPAD, HEXLOWER_PERMISSIVE};
use itertools::Itertools;
use log::debug;
use regex::Regex;
use serde_json::Value;
use uriparse::{URIReference, URI};

use crate::error::{Error, Result};

/// Outcome of a format check, with the failure reason
pub type FormatResult = std::result::Result<(), String>;

/// Format check function
pub type FormatFn = Arc<dyn Fn(&Value) -> FormatResult + Send + Sync>;

/// Table of format checks, seeded with the built-in formats. `unsigned` is
/// registered as a 64 bit check; other widths use `u<N>` formats, which are
/// handled without registration.
#[derive(Clone)]
pub struct FormatRegistry {
  formats: HashMap<String, FormatFn>,
}

impl fmt::Debug for FormatRegistry {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.debug_struct("FormatRegistry")
      .field("formats", &self.names())
      .finish()
  }
}

impl Default for FormatRegistry {
  fn default() -> Self {
    FormatRegistry::new()
  }
}

const BUILTIN: &[(&str, fn(&Value) -> FormatResult)] = &[
  ("email", email),
  ("idn-email", idn_email),
  ("hostname", hostname),
  ("idn-hostname", idn_hostname),
  ("uri", uri),
  ("uri-reference", uri_reference),
  ("iri", iri),
  ("iri-reference", iri_reference),
  ("json-pointer", json_pointer),
  ("relative-json-pointer", relative_json_pointer),
  ("regex", regex_format),
  ("date-time", date_time),
  ("date", date),
  ("time", time),
  ("ipv4", ipv4),
  ("ipv6", ipv6),
  ("ipv4-addr", address_hook),
  ("ipv6-addr", address_hook),
  ("ipv4-net", ipv4_net),
  ("ipv6-net", ipv6_net),
  ("eui", eui),
  ("i8", i8_format),
  ("i16", i16_format),
  ("i32", i32_format),
  ("unsigned", unsigned_format),
  ("x", hex),
  ("b", base64url),
];

impl FormatRegistry {
  /// Registry seeded with the built-in formats
  pub fn new() -> Self {
    let mut formats: HashMap<String, FormatFn> = HashMap::new();
    for (name, check) in BUILTIN {
      formats.insert(name.to_string(), Arc::new(*check));
    }

    FormatRegistry { formats }
  }

  /// Registry with no formats
  pub fn empty() -> Self {
    FormatRegistry {
      formats: HashMap::new(),
    }
  }

  /// Registers a format check. An existing format is only replaced when
  /// `override_existing` is set.
  pub fn add_format<F>(&mut self, name: &str, check: F, override_existing: bool) -> Result<()>
  where
    F: Fn(&Value) -> FormatResult + Send + Sync + 'static,
  {
    if self.formats.contains_key(name) && !override_existing {
      return Err(Error::Format(format!(
        "format {} is already defined, use `override` to replace it",
        name
      )));
    }

    self.formats.insert(name.to_string(), Arc::new(check));
    Ok(())
  }

  pub fn contains(&self, name: &str) -> bool {
    self.formats.contains_key(name) || unsigned_bits(name).is_some()
  }

  /// Registered format names, sorted
  pub fn names(&self) -> Vec<&str> {
    self.formats.keys().map(String::as_str).sorted().collect()
  }

  /// Checks a value against a format. Unknown formats accept every value.
  pub fn check(&self, name: &str, value: &Value) -> FormatResult {
    if let Some(check) = self.formats.get(name) {
      return check(value);
    }
    if let Some(bits) = unsigned_bits(name) {
      return unsigned(bits, value);
    }

    debug!("format {} is not registered, skipping", name);
    Ok(())
  }
}

/// Bit width of a `u<N>` format name
pub fn unsigned_bits(name: &str) -> Option<u32> {
  let digits = name.strip_prefix('u')?;
  if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
    return None;
  }
  digits.parse().ok()
}

/// Unsigned integer of `bits` bits. Strings and binary values are checked by
/// length instead.
pub fn unsigned(bits: u32, value: &Value) -> FormatResult {
  let max: u128 = if bits >= 128 {
    u128::MAX
  } else {
    (1u128 << bits) - 1
  };

  match value {
    Value::Number(n) => {
      if let Some(u) = n.as_u64() {
        if u as u128 <= max {
          return Ok(());
        }
      }
      Err(format!("{} is not a valid unsigned {} bit integer", n, bits))
    }
    Value::String(s) if (s.len() as u128) <= max => Ok(()),
    Value::String(s) => Err(format!(
      "length {} exceeds the unsigned {} bit maximum",
      s.len(),
      bits
    )),
    other => Err(format!("{} is not a valid unsigned {} bit value", other, bits)),
  }
}

fn string<'a>(value: &'a Value, format: &str) -> std::result::Result<&'a str, String> {
  value
    .as_str()
    .ok_or_else(|| format!("expected a string for format {}, got {}", format, value))
}

fn email_regex() -> std::result::Result<&'static Regex, String> {
  static EMAIL: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
  EMAIL
    .get_or_init(|| {
      Regex::new(r#"(?i)^(?:[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")@(?:(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?|\[(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?|[a-z0-9-]*[a-z0-9]:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\])$"#)
    })
    .as_ref()
    .map_err(|e| e.to_string())
}

fn email(value: &Value) -> FormatResult {
  let s = string(value, "email")?;
  if email_regex()?.is_match(s) {
    return Ok(());
  }
  Err(format!("`{}` is not a valid email address", s))
}

fn idn_email(value: &Value) -> FormatResult {
  let s = string(value, "idn-email")?;
  if s.is_ascii() {
    return email(value);
  }

  match s.rsplit_once('@') {
    Some((local, domain))
      if !local.is_empty()
        && local.chars().count() <= 64
        && !local.chars().any(|c| c.is_whitespace() || c == '@')
        && check_hostname(domain, true) =>
    {
      Ok(())
    }
    _ => Err(format!("`{}` is not a valid internationalized email address", s)),
  }
}

/// Hostname per RFC 1123, with a single trailing dot allowed. Internationalized
/// labels admit any alphanumeric character.
fn check_hostname(name: &str, international: bool) -> bool {
  let name = name.strip_suffix('.').unwrap_or(name);
  let length = name.chars().count();
  if length < 1 || length > 253 {
    return false;
  }

  name.split('.').all(|label| {
    let valid_char = |c: char| {
      c == '-'
        || if international {
          c.is_alphanumeric()
        } else {
          c.is_ascii_alphanumeric()
        }
    };

    let count = label.chars().count();
    (1..=63).contains(&count)
      && !label.starts_with('-')
      && !label.ends_with('-')
      && label.chars().all(valid_char)
  })
}

fn hostname(value: &Value) -> FormatResult {
  let s = string(value, "hostname")?;
  if check_hostname(s, false) {
    return Ok(());
  }
  Err(format!("`{}` is not a valid hostname", s))
}

fn idn_hostname(value: &Value) -> FormatResult {
  let s = string(value, "idn-hostname")?;
  let host = s
    .strip_prefix("https://")
    .or_else(|| s.strip_prefix("http://"))
    .unwrap_or(s);

  if check_hostname(host, true) {
    return Ok(());
  }
  Err(format!("`{}` is not a valid internationalized hostname", s))
}

fn uri(value: &Value) -> FormatResult {
  let s = string(value, "uri")?;
  URI::try_from(s)
    .map(|_| ())
    .map_err(|e| format!("`{}` is not a valid uri: {}", s, e))
}

fn uri_reference(value: &Value) -> FormatResult {
  let s = string(value, "uri-reference")?;
  URIReference::try_from(s)
    .map(|_| ())
    .map_err(|e| format!("`{}` is not a valid uri-reference: {}", s, e))
}

/// Maps an IRI to a URI by percent-encoding every non-ASCII character
fn iri_to_uri(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    if c.is_ascii() {
      out.push(c);
    } else {
      let mut buf = [0; 4];
      for b in c.encode_utf8(&mut buf).bytes() {
        out.push_str(&format!("%{:02X}", b));
      }
    }
  }
  out
}

fn iri(value: &Value) -> FormatResult {
  let s = string(value, "iri")?;
  URI::try_from(iri_to_uri(s).as_str())
    .map(|_| ())
    .map_err(|e| format!("`{}` is not a valid iri: {}", s, e))
}

fn iri_reference(value: &Value) -> FormatResult {
  let s = string(value, "iri-reference")?;
  URIReference::try_from(iri_to_uri(s).as_str())
    .map(|_| ())
    .map_err(|e| format!("`{}` is not a valid iri-reference: {}", s, e))
}

fn check_json_pointer(s: &str) -> bool {
  if s.is_empty() {
    return true;
  }
  if !s.starts_with('/') {
    return false;
  }

  let mut chars = s.chars();
  while let Some(c) = chars.next() {
    if c == '~' && !matches!(chars.next(), Some('0') | Some('1')) {
      return false;
    }
  }
  true
}

fn json_pointer(value: &Value) -> FormatResult {
  let s = string(value, "json-pointer")?;
  if check_json_pointer(s) {
    return Ok(());
  }
  Err(format!("`{}` is not a valid json-pointer", s))
}

fn relative_json_pointer(value: &Value) -> FormatResult {
  let s = string(value, "relative-json-pointer")?;
  let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or_else(|| s.len());
  let (prefix, rest) = s.split_at(split);

  let valid_prefix = !prefix.is_empty() && (prefix == "0" || !prefix.starts_with('0'));
  if valid_prefix && (rest == "#" || check_json_pointer(rest)) {
    return Ok(());
  }
  Err(format!("`{}` is not a valid relative-json-pointer", s))
}

fn regex_format(value: &Value) -> FormatResult {
  let s = string(value, "regex")?;
  Regex::new(s)
    .map(|_| ())
    .map_err(|e| format!("`{}` is not a valid regex: {}", s, e))
}

fn date_time(value: &Value) -> FormatResult {
  let s = string(value, "date-time")?;
  DateTime::parse_from_rfc3339(s)
    .map(|_| ())
    .map_err(|e| format!("`{}` is not a valid date-time: {}", s, e))
}

fn date(value: &Value) -> FormatResult {
  let s = string(value, "date")?;
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map(|_| ())
    .map_err(|e| format!("`{}` is not a valid date: {}", s, e))
}

fn time(value: &Value) -> FormatResult {
  let s = string(value, "time")?;
  if DateTime::parse_from_rfc3339(&format!("1970-01-01T{}", s)).is_ok() {
    return Ok(());
  }
  NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
    .map(|_| ())
    .map_err(|e| format!("`{}` is not a valid time: {}", s, e))
}

fn ipv4(value: &Value) -> FormatResult {
  let s = string(value, "ipv4")?;
  s.parse::<Ipv4Addr>()
    .map(|_| ())
    .map_err(|e| format!("`{}` is not a valid ipv4 address: {}", s, e))
}

fn ipv6(value: &Value) -> FormatResult {
  let s = string(value, "ipv6")?;
  s.parse::<Ipv6Addr>()
    .map(|_| ())
    .map_err(|e| format!("`{}` is not a valid ipv6 address: {}", s, e))
}

/// Binary address formats are checked by length bounds only
fn address_hook(_value: &Value) -> FormatResult {
  Ok(())
}

/// Address and prefix length, given as `"addr/prefix"` or `[addr, prefix]`
fn network(value: &Value, format: &str, max_prefix: u64, check: fn(&str) -> bool) -> FormatResult {
  let invalid = || format!("{} is not a valid {}", value, format);

  let (addr, prefix) = match value {
    Value::String(s) => {
      let (addr, prefix) = s.split_once('/').ok_or_else(invalid)?;
      (addr, prefix.parse::<u64>().map_err(|_| invalid())?)
    }
    Value::Array(pair) if pair.len() == 2 => (
      pair[0].as_str().ok_or_else(invalid)?,
      pair[1].as_u64().ok_or_else(invalid)?,
    ),
    _ => return Err(invalid()),
  };

  if check(addr) && prefix <= max_prefix {
    return Ok(());
  }
  Err(invalid())
}

fn ipv4_net(value: &Value) -> FormatResult {
  network(value, "ipv4-net", 32, |a| a.parse::<Ipv4Addr>().is_ok())
}

fn ipv6_net(value: &Value) -> FormatResult {
  network(value, "ipv6-net", 128, |a| a.parse::<Ipv6Addr>().is_ok())
}

/// EUI-48 or EUI-64 hardware address, octets separated by `:` or `-`
fn eui(value: &Value) -> FormatResult {
  let s = string(value, "eui")?;
  let octets = s.split(|c: char| c == ':' || c == '-').collect::<Vec<_>>();

  let valid = (octets.len() == 6 || octets.len() == 8)
    && octets
      .iter()
      .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()));
  if valid {
    return Ok(());
  }
  Err(format!("`{}` is not a valid eui", s))
}

fn signed(value: &Value, format: &str, min: i64, max: i64) -> FormatResult {
  match value.as_i64() {
    Some(i) if i >= min && i <= max => Ok(()),
    _ => Err(format!("{} is not a valid {} integer", value, format)),
  }
}

fn i8_format(value: &Value) -> FormatResult {
  signed(value, "i8", i8::MIN as i64, i8::MAX as i64)
}

fn i16_format(value: &Value) -> FormatResult {
  signed(value, "i16", i16::MIN as i64, i16::MAX as i64)
}

fn unsigned_format(value: &Value) -> FormatResult {
  unsigned(64, value)
}

fn i32_format(value: &Value) -> FormatResult {
  signed(value, "i32", i32::MIN as i64, i32::MAX as i64)
}

fn hex(value: &Value) -> FormatResult {
  let s = string(value, "x")?;
  HEXLOWER_PERMISSIVE
    .decode(s.as_bytes())
    .map(|_| ())
    .map_err(|e| format!("`{}` is not valid hex: {}", s, e))
}

fn base64url(value: &Value) -> FormatResult {
  let s = string(value, "b")?;
  BASE64URL_NOPAD
    .decode(s.trim_end_matches('=').as_bytes())
    .map(|_| ())
    .map_err(|e| format!("`{}` is not valid base64url: {}", s, e))
}
