//! Render policy for template paths.
//! Decides which paths are rendered and which are copied byte-for-byte,
//! based on the `_copy_without_render` glob patterns of the context.

use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use log::debug;

use crate::context::Context;
use crate::error::{CutterError, CutterResult};
use crate::renderer::template_name;

/// Compiled `_copy_without_render` patterns.
///
/// Patterns are matched fnmatch-style against the full template-relative path
/// with `/` separators, so `*` also crosses directory boundaries. Braces are
/// plain characters, which lets a pattern name a templated directory such as
/// `{{cookiecutter.module}}/static`.
#[derive(Debug, Clone)]
pub struct RenderPolicy {
    copy_set: GlobSet,
}

impl RenderPolicy {
    /// Compiles the given glob patterns.
    ///
    /// # Errors
    /// * `CutterError::ConfigError` if a pattern is not a valid glob
    pub fn new<I, S>(patterns: I) -> CutterResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(&fnmatch_to_glob(pattern.as_ref()))
                .backslash_escape(false)
                .build()
                .map_err(|e| {
                    CutterError::ConfigError(format!("invalid copy-without-render pattern: {e}"))
                })?;
            builder.add(glob);
        }
        let copy_set = builder.build().map_err(|e| {
            CutterError::ConfigError(format!("copy-without-render patterns failed to compile: {e}"))
        })?;

        Ok(Self { copy_set })
    }

    /// Builds the policy from the context's `_copy_without_render` setting.
    pub fn from_context(context: &Context) -> CutterResult<Self> {
        let patterns = context.copy_without_render()?;
        debug!("Copy without render patterns: {patterns:?}");
        Self::new(patterns)
    }

    /// Returns true if `path`, relative to the template root, must be copied
    /// without rendering its contents.
    pub fn copy_without_render<P: AsRef<Path>>(&self, path: P) -> bool {
        !self.copy_set.is_empty() && self.copy_set.is_match(template_name(path))
    }
}

/// Rewrites an fnmatch pattern in globset syntax.
///
/// `{` and `}` become one-character classes instead of alternation, and a `[`
/// without a closing `]` is a literal bracket. Classes keep their fnmatch
/// reading: a leading `!` negates, a `]` right after the opening is literal.
fn fnmatch_to_glob(pattern: &str) -> String {
    let chars = pattern.chars().collect::<Vec<_>>();
    let mut glob = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '[' => {
                let mut end = i + 1;
                if chars.get(end) == Some(&'!') {
                    end += 1;
                }
                if chars.get(end) == Some(&']') {
                    end += 1;
                }
                while end < chars.len() && chars[end] != ']' {
                    end += 1;
                }
                if end < chars.len() {
                    glob.extend(chars[i..=end].iter());
                    i = end + 1;
                    continue;
                }
                glob.push_str("[[]");
            }
            '{' => glob.push_str("[{]"),
            '}' => glob.push_str("[}]"),
            c => glob.push(c),
        }
        i += 1;
    }
    glob
}

/// One-shot check of `path` against the context's `_copy_without_render` setting.
pub fn copy_without_render<P: AsRef<Path>>(path: P, context: &Context) -> CutterResult<bool> {
    Ok(RenderPolicy::from_context(context)?.copy_without_render(path))
}
