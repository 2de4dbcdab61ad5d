//! Template rendering for cutter.
//! Wraps MiniJinja behind a small trait so path names, file contents and
//! prompt defaults all render through the same environment.
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use minijinja::{AutoEscape, Environment, ErrorKind};

use crate::context::Context;
use crate::error::{CutterError, CutterResult};

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders a literal template string, such as a file or directory name.
    ///
    /// # Arguments
    /// * `template` - Template string to render
    /// * `context` - Context variables for rendering
    ///
    /// # Returns
    /// * `CutterResult<String>` - Rendered template string
    fn render_str(&self, template: &str, context: &Context) -> CutterResult<String>;

    /// Loads `name` from the search root and renders it.
    ///
    /// `name` is slash separated whatever the host convention is.
    fn render_file(&self, name: &str, context: &Context) -> CutterResult<String>;
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
    search_root: PathBuf,
}

impl MiniJinjaRenderer {
    /// Creates a renderer that looks templates up below `search_root`.
    pub fn new<P: AsRef<Path>>(search_root: P) -> Self {
        let search_root = search_root.as_ref().to_path_buf();
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        // Syntax errors carry the offending source line.
        env.set_debug(true);
        // No auto-escaping, whatever the extension.
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_loader(template_loader(search_root.clone()));
        Self { env, search_root }
    }

    /// Directory templates are loaded from.
    pub fn search_root(&self) -> &Path {
        &self.search_root
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    /// Renders a template string using MiniJinja.
    ///
    /// # Errors
    /// * `CutterError::TemplateSyntaxError` if the string is not a valid template,
    ///   named after the string itself
    /// * `CutterError::TemplateError` if rendering fails
    fn render_str(&self, template: &str, context: &Context) -> CutterResult<String> {
        self.env
            .render_str(template, context)
            .map_err(|e| CutterError::from_minijinja(template, e))
    }

    fn render_file(&self, name: &str, context: &Context) -> CutterResult<String> {
        let tmpl = self.env.get_template(name).map_err(|e| CutterError::from_minijinja(name, e))?;
        tmpl.render(context).map_err(|e| CutterError::from_minijinja(name, e))
    }
}

/// Loads templates by slash separated name below `search_root`.
///
/// Unlike MiniJinja's `path_loader` this accepts dotfiles such as
/// `.gitignore`; names with `..` or empty segments are not found.
fn template_loader(
    search_root: PathBuf,
) -> impl Fn(&str) -> std::result::Result<Option<String>, minijinja::Error> + Send + Sync + 'static
{
    move |name| {
        if name.split('/').any(|segment| segment.is_empty() || segment == "..") {
            return Ok(None);
        }
        match fs::read_to_string(search_root.join(name)) {
            Ok(source) => Ok(Some(source)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(minijinja::Error::new(
                ErrorKind::InvalidOperation,
                format!("could not read template '{name}'"),
            )
            .with_source(e)),
        }
    }
}

/// Converts a relative path into the slash separated form used both for
/// template lookups and for `_copy_without_render` matching.
pub fn template_name<P: AsRef<Path>>(path: P) -> String {
    path.as_ref()
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

