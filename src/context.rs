//! Context assembly for cutter templates.
//! Loads the template declaration file and layers user defaults and explicit
//! overrides on top of it.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::debug;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::constants::{COPY_WITHOUT_RENDER, DEFAULT_NAMESPACE};
use crate::error::{CutterError, CutterResult, IoResultExt};

/// Flat variable mapping, as found in override layers.
pub type Variables = IndexMap<String, Value>;

/// The variable mapping every render operation sees during one run.
///
/// Template variables live under a namespace key (by convention the stem of
/// the declaration file). Serializes as the bare mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    namespace: String,
    vars: Variables,
}

impl Context {
    /// Creates a context from an already assembled top-level mapping.
    pub fn new<S: Into<String>>(namespace: S, vars: Variables) -> Self {
        Self { namespace: namespace.into(), vars }
    }

    /// Creates a context holding `vars` under the `namespace` key.
    pub fn from_namespace<S: Into<String>>(namespace: S, vars: Variables) -> Self {
        let namespace = namespace.into();
        let mut top = Variables::new();
        top.insert(namespace.clone(), Value::Object(vars.into_iter().collect()));
        Self { namespace, vars: top }
    }

    pub fn namespace_name(&self) -> &str {
        &self.namespace
    }

    /// Top-level mapping.
    pub fn vars(&self) -> &Variables {
        &self.vars
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    /// Template variables under the namespace key, if present and a mapping.
    pub fn namespace(&self) -> Option<&serde_json::Map<String, Value>> {
        self.vars.get(&self.namespace).and_then(Value::as_object)
    }

    /// Replaces the template variables under the namespace key.
    pub fn set_namespace(&mut self, vars: serde_json::Map<String, Value>) {
        self.vars.insert(self.namespace.clone(), Value::Object(vars));
    }

    /// Shallow-merges `layer` into the template variables.
    ///
    /// Keys of `layer` replace same-named keys wholesale. Without a namespace
    /// mapping the flat context is the namespace, so keys land at the top level.
    pub fn merge(&mut self, layer: &Variables) {
        match self.vars.get_mut(&self.namespace) {
            Some(Value::Object(declared)) => {
                for (key, value) in layer {
                    declared.insert(key.clone(), value.clone());
                }
            }
            _ => {
                for (key, value) in layer {
                    self.vars.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Makes sure the namespace key exists.
    ///
    /// A context lacking it is wrapped so that the flat mapping doubles as its
    /// own namespace. Calling this twice is a no-op.
    pub fn ensure_namespace(&mut self) {
        if !self.vars.contains_key(&self.namespace) {
            let flat: serde_json::Map<String, Value> =
                self.vars.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            self.vars.insert(self.namespace.clone(), Value::Object(flat));
        }
    }

    /// Glob patterns listed under `_copy_without_render`.
    ///
    /// An absent setting yields no patterns.
    ///
    /// # Errors
    /// * `CutterError::ConfigError` if the setting is not a sequence of strings
    pub fn copy_without_render(&self) -> CutterResult<Vec<String>> {
        let Some(setting) = self.namespace().and_then(|ns| ns.get(COPY_WITHOUT_RENDER)) else {
            return Ok(Vec::new());
        };
        let invalid = || {
            CutterError::ConfigError(format!("'{COPY_WITHOUT_RENDER}' must be a list of glob patterns"))
        };
        setting
            .as_array()
            .ok_or_else(invalid)?
            .iter()
            .map(|pattern| pattern.as_str().map(str::to_string).ok_or_else(invalid))
            .collect()
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new(DEFAULT_NAMESPACE, Variables::new())
    }
}

impl Serialize for Context {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.vars.serialize(serializer)
    }
}

/// Parses declaration file content, trying JSON first and YAML second.
///
/// # Errors
/// * `CutterError::ConfigError` if the content is neither a JSON nor a YAML mapping
pub fn parse_context(content: &str) -> CutterResult<Variables> {
    match serde_json::from_str(content) {
        Ok(vars) => Ok(vars),
        Err(json_err) => serde_yaml::from_str(content).map_err(|_| {
            CutterError::ConfigError(format!("Invalid context file format: {json_err}"))
        }),
    }
}

/// Generates the context for a template.
///
/// The declaration file is loaded under a namespace named after its stem.
/// Override layers are merged on top in order: `default_context`, then
/// `extra_context`.
///
/// # Arguments
/// * `context_file` - Declaration file, e.g. `cookiecutter.json`
/// * `default_context` - Defaults from the user configuration
/// * `extra_context` - Explicit overrides, highest precedence
///
/// # Errors
/// * `CutterError::ContextFileNotFound` if the declaration file does not exist
/// * `CutterError::ConfigError` if it cannot be parsed
pub fn generate_context<P: AsRef<Path>>(
    context_file: P,
    default_context: Option<&Variables>,
    extra_context: Option<&Variables>,
) -> CutterResult<Context> {
    let context_file = context_file.as_ref();
    if !context_file.is_file() {
        return Err(CutterError::ContextFileNotFound { path: context_file.to_path_buf() });
    }

    let content = fs::read_to_string(context_file).with_path(context_file)?;
    let declared = parse_context(&content)?;
    let namespace = context_file
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(DEFAULT_NAMESPACE);

    let mut context = Context::from_namespace(namespace, declared);
    for layer in [default_context, extra_context].into_iter().flatten() {
        context.merge(layer);
    }

    debug!("Context generated is {:?}", context.vars());
    Ok(context)
}
