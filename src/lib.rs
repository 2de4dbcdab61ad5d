//! cutter generates projects from templated directory trees.
//! It renders directory names, file names and file contents against a
//! variable context, copies selected paths verbatim and runs optional hooks
//! before and after generation.

/// Binary file detection
pub mod binary;

/// Command-line interface module for the cutter application
pub mod cli;

/// User configuration (`~/.cutterrc`)
pub mod config;

/// Common constants
pub mod constants;

/// Context assembly from the template declaration and override layers
pub mod context;

/// Error types and handling for the cutter application
pub mod error;

/// Core generation: the template tree walk and per-path generators
pub mod generate;

/// Pre and post generation hook processing
/// Handles execution of scripts in:
/// - hooks/pre_gen_project
/// - hooks/post_gen_project
pub mod hooks;

/// Template repository location
pub mod loader;

/// Logger setup for the binary
pub mod logger;

/// Render or copy-verbatim decision per path
/// Driven by the `_copy_without_render` glob patterns
pub mod policy;

/// User input and interaction handling
pub mod prompt;

/// Template rendering functionality
pub mod renderer;
