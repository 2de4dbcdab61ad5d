//! Interactive completion of the template variables.
//! Defaults may themselves be templates referring to earlier variables, e.g.
//! `"repo_name": "{{ cookiecutter.project_name|lower }}"`.

use dialoguer::{Input, Select};
use serde_json::Value;

use crate::context::{Context, Variables};
use crate::error::{CutterError, CutterResult};
use crate::renderer::TemplateRenderer;

/// Source of answers for template variables.
pub trait Prompter {
    /// Asks for a free-form value, offering `default`.
    fn read_text(&self, key: &str, default: &str) -> CutterResult<String>;

    /// Asks to pick one of `choices`; returns its index.
    fn choose(&self, key: &str, choices: &[String]) -> CutterResult<usize>;
}

/// Terminal prompter backed by dialoguer.
#[derive(Default)]
pub struct DialoguerPrompter;

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for DialoguerPrompter {
    fn read_text(&self, key: &str, default: &str) -> CutterResult<String> {
        Input::<String>::new()
            .with_prompt(key)
            .default(default.to_string())
            .interact_text()
            .map_err(|e| CutterError::ConfigError(e.to_string()))
    }

    fn choose(&self, key: &str, choices: &[String]) -> CutterResult<usize> {
        Select::new()
            .with_prompt(key)
            .default(0)
            .items(choices)
            .interact()
            .map_err(|e| CutterError::ConfigError(e.to_string()))
    }
}

/// Resolves every template variable, prompting unless `no_input` is set.
///
/// Variables are handled in declaration order:
/// - keys starting with `_` are private and kept untouched
/// - strings are rendered against the answers so far and offered as default
/// - sequences are choices; the first one is the default
/// - anything else is kept as declared
///
/// # Returns
/// * `CutterResult<Context>` - Context whose namespace holds the final answers
pub fn prompt_for_config(
    context: &Context,
    renderer: &dyn TemplateRenderer,
    prompter: &dyn Prompter,
    no_input: bool,
) -> CutterResult<Context> {
    let Some(declared) = context.namespace() else {
        return Ok(context.clone());
    };

    let mut answers = serde_json::Map::new();
    for (key, raw) in declared {
        if key.starts_with('_') {
            answers.insert(key.clone(), raw.clone());
            continue;
        }

        let current = Context::from_namespace(
            context.namespace_name(),
            answers.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Variables>(),
        );

        let value = match raw {
            Value::String(default) => {
                let default = renderer.render_str(default, &current)?;
                if no_input {
                    Value::String(default)
                } else {
                    Value::String(prompter.read_text(key, &default)?)
                }
            }
            Value::Array(items) if !items.is_empty() => {
                let choices = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => renderer.render_str(s, &current),
                        other => Ok(other.to_string()),
                    })
                    .collect::<CutterResult<Vec<_>>>()?;
                let index = if no_input { 0 } else { prompter.choose(key, &choices)? };
                let choice = choices.get(index).cloned().ok_or_else(|| {
                    CutterError::ConfigError(format!("invalid choice {index} for '{key}'"))
                })?;
                Value::String(choice)
            }
            other => other.clone(),
        };
        answers.insert(key.clone(), value);
    }

    let mut resolved = context.clone();
    resolved.set_namespace(answers);
    Ok(resolved)
}
