//! Command-line interface implementation for cutter.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser};
use serde_json::Value;
use std::path::PathBuf;

use crate::context::Variables;

/// Command-line arguments structure for cutter.
#[derive(Parser, Debug)]
#[command(author, version, about = "cutter: generate projects from templated directory trees", long_about = None)]
pub struct Args {
    /// Path to the template repository
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Context overrides given as key=value pairs
    #[arg(value_name = "EXTRA_CONTEXT", value_parser = parse_key_value)]
    pub extra_context: Vec<(String, String)>,

    /// Directory the project is generated in
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Do not prompt, use the template defaults
    #[arg(long)]
    pub no_input: bool,

    /// Do not run pre/post generation hooks
    #[arg(long)]
    pub no_hooks: bool,

    /// User configuration file
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Extra-override layer built from the `key=value` arguments.
    pub fn extra_context(&self) -> Variables {
        self.extra_context
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect()
    }
}

/// Splits a `key=value` argument.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{s}'")),
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 and the help text if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
