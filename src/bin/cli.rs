use clap::{Parser, Subcommand};
use codespan_reporting::term::termcolor::{
  Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor,
};
use jadn::{Error as JadnError, Extension, Schema, ValidationErrorReporter};
use log::{debug, LevelFilter};
use simplelog::{ColorChoice as LogColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::{
  error::Error,
  fs,
  io::{self, Read, Write},
  path::{Path, PathBuf},
};

/// Tool for checking, analyzing and unfolding JADN schemas and for validating
/// JSON documents against them
#[derive(Parser, Debug)]
#[clap(name = "jadn", version, author, arg_required_else_help = true)]
struct Cli {
  /// Increase logging verbosity (-v, -vv, -vvv)
  #[clap(short, long, parse(from_occurrences), global = true)]
  verbose: u8,

  #[clap(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Load a schema and report whether it is well formed
  Check {
    /// JADN schema file
    schema: PathBuf,
  },
  /// Validate JSON documents against a schema
  Validate {
    /// JADN schema file
    #[clap(short, long)]
    schema: PathBuf,
    /// Type to validate against, every exported type when omitted
    #[clap(short = 't', long = "type")]
    type_name: Option<String>,
    /// Read a JSON document from stdin
    #[clap(long, conflicts_with = "files")]
    stdin: bool,
    /// JSON document files
    files: Vec<PathBuf>,
  },
  /// Report unreferenced and undefined types
  Analyze {
    /// JADN schema file
    schema: PathBuf,
  },
  /// Unfold schema extensions into explicit type declarations
  Unfold {
    /// JADN schema file
    schema: PathBuf,
    /// Extension to unfold, may be repeated; all when omitted
    #[clap(short, long = "extension", value_name = "EXTENSION")]
    extensions: Vec<Extension>,
    /// Output file, stdout when omitted
    #[clap(short, long)]
    out: Option<PathBuf>,
    /// Indentation width
    #[clap(long, default_value = "2")]
    indent: usize,
  },
  /// Pretty print a schema
  Dump {
    /// JADN schema file
    schema: PathBuf,
    /// Output file, stdout when omitted
    #[clap(short, long)]
    out: Option<PathBuf>,
    /// Indentation width
    #[clap(long, default_value = "2")]
    indent: usize,
  },
}

struct Output {
  stdout_writer: BufferWriter,
  stdout: Buffer,
  stderr_writer: BufferWriter,
  stderr: Buffer,
}

impl Output {
  fn new() -> Self {
    let stdout_writer = BufferWriter::stdout(ColorChoice::Auto);
    let stderr_writer = BufferWriter::stderr(ColorChoice::Auto);

    Output {
      stdout: stdout_writer.buffer(),
      stderr: stderr_writer.buffer(),
      stdout_writer,
      stderr_writer,
    }
  }

  fn success(&mut self, msg: &str) -> io::Result<()> {
    self.stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    writeln!(&mut self.stdout, "{}", msg)?;
    self.stdout.reset()
  }

  fn failure(&mut self, msg: &str) -> io::Result<()> {
    self.stderr.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
    writeln!(&mut self.stderr, "{}", msg)?;
    self.stderr.reset()
  }

  fn flush(&mut self) -> io::Result<()> {
    self.stdout_writer.print(&self.stdout)?;
    self.stderr_writer.print(&self.stderr)?;
    self.stdout.clear();
    self.stderr.clear();
    Ok(())
  }
}

fn init_logging(verbose: u8) {
  let level = match verbose {
    0 => LevelFilter::Warn,
    1 => LevelFilter::Info,
    2 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  };

  let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
  // A logger may already be installed when embedded
  let _ = TermLogger::init(level, config, TerminalMode::Stderr, LogColorChoice::Auto);
}

fn load_schema(path: &Path, out: &mut Output) -> Result<Option<Schema>, Box<dyn Error>> {
  if !path.exists() {
    out.failure(&format!("JADN schema at path {:?} does not exist", path))?;
    return Ok(None);
  }

  match Schema::load(path) {
    Ok(schema) => Ok(Some(schema)),
    Err(e) => {
      out.failure(&format!("{:?} is not a valid JADN schema: {}", path, e))?;
      Ok(None)
    }
  }
}

fn validate(
  schema: &Schema,
  type_name: Option<&str>,
  source: &str,
  input: &str,
  out: &mut Output,
) -> Result<(), Box<dyn Error>> {
  let value: serde_json::Value = match serde_json::from_str(input) {
    Ok(value) => value,
    Err(e) => {
      out.failure(&format!("{} is not valid JSON: {}", source, e))?;
      return Ok(());
    }
  };

  let result = match type_name {
    Some(type_name) => schema.validate_as(type_name, &value),
    None => schema.validate(&value),
  };

  match result {
    Ok(_) => out.success(&format!("Validation of {} is successful", source))?,
    Err(JadnError::Validation(errors)) => {
      out.failure(&format!("Validation of {} failed\n", source))?;
      ValidationErrorReporter::new().write_errors(&mut out.stderr, &errors)?;
    }
    Err(e) => out.failure(&format!("Validation of {} failed: {}", source, e))?,
  }

  Ok(())
}

fn write_output(out_path: Option<&Path>, text: String, out: &mut Output) -> Result<(), Box<dyn Error>> {
  match out_path {
    Some(path) => {
      fs::write(path, text + "\n")?;
      out.success(&format!("Wrote {:?}", path))?;
    }
    None => writeln!(&mut out.stdout, "{}", text)?,
  }

  Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
  let cli = Cli::parse();
  init_logging(cli.verbose);
  debug!("{:?}", cli.command);

  let mut out = Output::new();

  match cli.command {
    Command::Check { schema } => {
      if let Some(s) = load_schema(&schema, &mut out)? {
        out.success(&format!("{:?} is a valid JADN schema with {} types", schema, s.len()))?;
      }
    }
    Command::Validate {
      schema,
      type_name,
      stdin,
      files,
    } => {
      if let Some(s) = load_schema(&schema, &mut out)? {
        if stdin {
          let mut input = String::new();
          io::stdin().lock().read_to_string(&mut input)?;
          validate(&s, type_name.as_deref(), "stdin", &input, &mut out)?;
        } else if files.is_empty() {
          out.failure("Missing files to validate")?;
        }

        for file in files {
          if !file.exists() {
            out.failure(&format!("File at path {:?} does not exist", file))?;
            continue;
          }
          let input = fs::read_to_string(&file)?;
          validate(&s, type_name.as_deref(), &format!("{:?}", file), &input, &mut out)?;
          out.flush()?;
        }
      }
    }
    Command::Analyze { schema } => {
      if let Some(s) = load_schema(&schema, &mut out)? {
        let analysis = s.analyze();
        if analysis.is_clean() {
          out.success("No unreferenced or undefined types")?;
        } else {
          if !analysis.unreferenced.is_empty() {
            out.failure(&format!("Unreferenced: {}", analysis.unreferenced.join(", ")))?;
          }
          if !analysis.undefined.is_empty() {
            out.failure(&format!("Undefined: {}", analysis.undefined.join(", ")))?;
          }
        }
      }
    }
    Command::Unfold {
      schema,
      extensions,
      out: out_path,
      indent,
    } => {
      if let Some(s) = load_schema(&schema, &mut out)? {
        let selected = if extensions.is_empty() {
          None
        } else {
          Some(extensions.as_slice())
        };

        match s.simplify(selected) {
          Ok(simple) => write_output(out_path.as_deref(), simple.dumps(indent)?, &mut out)?,
          Err(e) => out.failure(&format!("Unfolding {:?} failed: {}", schema, e))?,
        }
      }
    }
    Command::Dump {
      schema,
      out: out_path,
      indent,
    } => {
      if let Some(s) = load_schema(&schema, &mut out)? {
        write_output(out_path.as_deref(), s.dumps(indent)?, &mut out)?;
      }
    }
  }

  out.flush()?;

  Ok(())
}
