//! Error handling for the cutter application.
//! Defines custom error types and results used throughout the application.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use thiserror::Error;

/// Custom error types for cutter operations.
///
/// Every variant aborts the generation run. Variants carry the path, template
/// name or hook involved so the failure can be reproduced.
#[derive(Error, Debug)]
pub enum CutterError {
    /// Represents errors that occur during file system operations
    #[error("IO error on '{}': {source}.", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Raised while walking the template tree
    #[error("Failed to walk template directory: {0}.")]
    WalkDirError(#[from] walkdir::Error),

    /// The template declaration file is missing
    #[error("Configuration error: context file '{}' does not exist.", path.display())]
    ContextFileNotFound { path: PathBuf },

    /// Represents errors that occur during configuration parsing or processing
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    #[error("Template directory '{template_dir}' does not exist.")]
    TemplateDoesNotExistsError { template_dir: String },

    /// No template subtree could be located inside the repository
    #[error("No template directory found in '{}'.", repo_dir.display())]
    TemplateNotFoundError { repo_dir: PathBuf },

    /// The template root name carries no template expression
    #[error("Template directory name '{dirname}' must be templated, e.g. '{{{{cookiecutter.project_name}}}}'.")]
    NonTemplatedInputDirError { dirname: String },

    /// Malformed template syntax in a file or a path name
    #[error("Template syntax error in '{name}' at line {line}: {source}")]
    TemplateSyntaxError {
        name: String,
        line: usize,
        #[source]
        source: minijinja::Error,
    },

    /// Any other rendering failure
    #[error("Template error in '{name}': {source}")]
    TemplateError {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// Represents errors that occur during hook script execution
    #[error("Hook '{hook}' failed with status: {status}.")]
    HookError { hook: String, status: ExitStatus },
}

impl CutterError {
    /// Wraps a MiniJinja error, keeping the name of the template that raised it.
    ///
    /// Syntax errors become [`CutterError::TemplateSyntaxError`] so callers can
    /// report the offending line.
    pub fn from_minijinja<S: Into<String>>(name: S, source: minijinja::Error) -> Self {
        let name = name.into();
        match source.kind() {
            minijinja::ErrorKind::SyntaxError => {
                let line = source.line().unwrap_or(0);
                CutterError::TemplateSyntaxError { name, line, source }
            }
            _ => CutterError::TemplateError { name, source },
        }
    }
}

/// Convenience type alias for Results with CutterError as the error type.
pub type CutterResult<T> = Result<T, CutterError>;

/// Attaches the path involved to I/O failures.
pub trait IoResultExt<T> {
    /// Maps the error into [`CutterError::Io`] naming `path`.
    fn with_path<P: AsRef<Path>>(self, path: P) -> CutterResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path<P: AsRef<Path>>(self, path: P) -> CutterResult<T> {
        self.map_err(|source| CutterError::Io { path: path.as_ref().to_path_buf(), source })
    }
}

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The CutterError to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1.
/// Template errors also print the template source around the failure.
pub fn default_error_handler(err: CutterError) {
    match &err {
        CutterError::TemplateSyntaxError { source, .. } | CutterError::TemplateError { source, .. } => {
            // Alternate form carries the offending source lines.
            eprintln!("{err}\n{source:#}");
        }
        _ => eprintln!("{err}"),
    }
    std::process::exit(1);
}
