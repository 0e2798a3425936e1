use std::{
  fmt,
  io::{self, Write},
};

use codespan_reporting::term::termcolor::{Color, ColorSpec, WriteColor};
use serde::Serialize;

/// Instance validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
  /// Error message, naming the violated bound where there is one
  pub reason: String,
  /// Name of the type definition the value failed against
  pub type_name: String,
  /// Location in the instance (in JSONPointer notation) where the error occurred
  pub location: String,
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    if self.location.is_empty() {
      return write!(
        f,
        "error validating {} at the root of the document: {}",
        self.type_name, self.reason
      );
    }

    write!(
      f,
      "error validating {} at location {}: {}",
      self.type_name, self.location, self.reason
    )
  }
}

impl std::error::Error for ValidationError {}

/// Renders validation errors for a terminal
pub struct ValidationErrorReporter {
  /// Whether to use colored output
  pub use_colors: bool,
  /// Whether to print a summary line after the errors
  pub include_summary: bool,
}

impl Default for ValidationErrorReporter {
  fn default() -> Self {
    Self {
      use_colors: true,
      include_summary: true,
    }
  }
}

impl ValidationErrorReporter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_colors(mut self, use_colors: bool) -> Self {
    self.use_colors = use_colors;
    self
  }

  pub fn with_summary(mut self, include_summary: bool) -> Self {
    self.include_summary = include_summary;
    self
  }

  /// Format a single validation error as plain text
  pub fn format_error(&self, error: &ValidationError) -> String {
    let location = if error.location.is_empty() {
      "/"
    } else {
      error.location.as_str()
    };

    format!(
      "✗ {}\n  type: {}\n  location: {}\n",
      error.reason, error.type_name, location
    )
  }

  /// Format a list of errors as plain text
  pub fn format_errors(&self, errors: &[ValidationError]) -> String {
    let mut output = errors
      .iter()
      .map(|e| self.format_error(e))
      .collect::<Vec<_>>()
      .join("\n");

    if self.include_summary {
      output.push_str(&format!("\n{} validation error(s)\n", errors.len()));
    }

    output
  }

  /// Write errors to a color-capable writer
  pub fn write_errors<W: WriteColor>(&self, w: &mut W, errors: &[ValidationError]) -> io::Result<()> {
    for error in errors {
      if self.use_colors {
        w.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
      }
      write!(w, "✗ ")?;
      if self.use_colors {
        w.reset()?;
      }
      writeln!(w, "{}", error.reason)?;

      if self.use_colors {
        w.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
      }
      let location = if error.location.is_empty() {
        "/"
      } else {
        error.location.as_str()
      };
      writeln!(w, "  type: {}\n  location: {}", error.type_name, location)?;
      if self.use_colors {
        w.reset()?;
      }
    }

    if self.include_summary {
      writeln!(w, "\n{} validation error(s)", errors.len())?;
    }

    Ok(())
  }
}
