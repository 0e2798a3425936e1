//! Schema metadata: the optional `info` section of a JADN document

use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default `$MaxBinary`
pub const DEFAULT_MAX_BINARY: u64 = 255;
/// Default `$MaxString`
pub const DEFAULT_MAX_STRING: u64 = 255;
/// Default `$MaxElements`
pub const DEFAULT_MAX_ELEMENTS: u64 = 100;
/// Default `$Sys` separator used in synthesized type names
pub const DEFAULT_SYS: &str = "$";
/// Default `$TypeName`
pub const DEFAULT_TYPE_NAME: &str = "^[A-Z][-$A-Za-z0-9]{0,63}$";
/// Default `$FieldName`
pub const DEFAULT_FIELD_NAME: &str = "^[a-z][_A-Za-z0-9]{0,63}$";
/// Default `$NSID`
pub const DEFAULT_NSID: &str = "^[A-Za-z][A-Za-z0-9]{0,7}$";

/// Package metadata, namespaces, exports and configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Information {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub package: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub comment: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub copyright: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub license: Option<String>,
  /// Namespace id to URI of imported schemas
  #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
  pub namespaces: IndexMap<String, String>,
  /// Root types of the schema
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub exports: Vec<String>,
  /// Only serialized when given explicitly
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub config: Option<Config>,
}

/// Schema configuration. Absent values take their defaults through the
/// accessor methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
  #[serde(rename = "$MaxBinary", default, skip_serializing_if = "Option::is_none")]
  pub max_binary: Option<u64>,
  #[serde(rename = "$MaxString", default, skip_serializing_if = "Option::is_none")]
  pub max_string: Option<u64>,
  #[serde(rename = "$MaxElements", default, skip_serializing_if = "Option::is_none")]
  pub max_elements: Option<u64>,
  #[serde(rename = "$Sys", default, skip_serializing_if = "Option::is_none")]
  pub sys: Option<String>,
  #[serde(rename = "$TypeName", default, skip_serializing_if = "Option::is_none")]
  pub type_name: Option<String>,
  #[serde(rename = "$FieldName", default, skip_serializing_if = "Option::is_none")]
  pub field_name: Option<String>,
  #[serde(rename = "$NSID", default, skip_serializing_if = "Option::is_none")]
  pub nsid: Option<String>,
}

impl Information {
  /// Effective configuration
  pub fn config(&self) -> Config {
    self.config.clone().unwrap_or_default()
  }

  /// Checks namespace ids and the configuration
  pub fn validate(&self) -> Result<()> {
    let config = self.config();
    config.validate()?;

    let nsid = config.nsid_regex()?;
    if let Some(ns) = self.namespaces.keys().find(|ns| !nsid.is_match(ns)) {
      return Err(Error::Format(format!(
        "namespace id `{}` does not match {}",
        ns,
        config.nsid()
      )));
    }

    Ok(())
  }
}

impl Config {
  pub fn max_binary(&self) -> u64 {
    self.max_binary.unwrap_or(DEFAULT_MAX_BINARY)
  }

  pub fn max_string(&self) -> u64 {
    self.max_string.unwrap_or(DEFAULT_MAX_STRING)
  }

  pub fn max_elements(&self) -> u64 {
    self.max_elements.unwrap_or(DEFAULT_MAX_ELEMENTS)
  }

  pub fn sys(&self) -> &str {
    self.sys.as_deref().unwrap_or(DEFAULT_SYS)
  }

  pub fn type_name(&self) -> &str {
    self.type_name.as_deref().unwrap_or(DEFAULT_TYPE_NAME)
  }

  pub fn field_name(&self) -> &str {
    self.field_name.as_deref().unwrap_or(DEFAULT_FIELD_NAME)
  }

  pub fn nsid(&self) -> &str {
    self.nsid.as_deref().unwrap_or(DEFAULT_NSID)
  }

  pub fn type_name_regex(&self) -> Result<Regex> {
    compile(self.type_name(), "$TypeName")
  }

  pub fn field_name_regex(&self) -> Result<Regex> {
    compile(self.field_name(), "$FieldName")
  }

  pub fn nsid_regex(&self) -> Result<Regex> {
    compile(self.nsid(), "$NSID")
  }

  /// Checks value ranges and that every pattern compiles
  pub fn validate(&self) -> Result<()> {
    for (name, value) in [
      ("$MaxBinary", self.max_binary()),
      ("$MaxString", self.max_string()),
      ("$MaxElements", self.max_elements()),
    ] {
      if value < 1 {
        return Err(Error::Format(format!("{} must be at least 1", name)));
      }
    }

    if self.sys().chars().count() != 1 {
      return Err(Error::Format(format!(
        "$Sys must be a single character, got `{}`",
        self.sys()
      )));
    }

    self.type_name_regex()?;
    self.field_name_regex()?;
    self.nsid_regex()?;

    Ok(())
  }
}

fn compile(pattern: &str, name: &str) -> Result<Regex> {
  Regex::new(pattern).map_err(|e| Error::Format(format!("invalid {} pattern: {}", name, e)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use serde_json::json;

  #[test]
  fn config_defaults() {
    let config = Config::default();

    assert_eq!(config.max_binary(), 255);
    assert_eq!(config.max_string(), 255);
    assert_eq!(config.max_elements(), 100);
    assert_eq!(config.sys(), "$");
    assert!(config.type_name_regex().unwrap().is_match("Person$Siblings"));
    assert!(!config.field_name_regex().unwrap().is_match("Name"));
  }

  #[test]
  fn config_only_serialized_when_present() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let info: Information = serde_json::from_value(json!({
      "package": "http://example.com/people",
      "exports": ["Person"]
    }))?;
    assert_eq!(
      serde_json::to_value(&info)?,
      json!({"package": "http://example.com/people", "exports": ["Person"]})
    );

    let info: Information = serde_json::from_value(json!({"config": {"$Sys": ":", "$MaxString": 64}}))?;
    assert_eq!(info.config().sys(), ":");
    assert_eq!(info.config().max_string(), 64);
    assert_eq!(
      serde_json::to_value(&info)?,
      json!({"config": {"$MaxString": 64, "$Sys": ":"}})
    );

    Ok(())
  }

  #[test]
  fn invalid_config() {
    let config = Config {
      sys: Some("::".into()),
      ..Default::default()
    };
    assert!(config.validate().is_err());

    let config = Config {
      type_name: Some("[".into()),
      ..Default::default()
    };
    assert!(config.validate().is_err());
  }
}
