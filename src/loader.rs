//! Template repository location.
//! Resolves the repository directory and the template subtree inside it.
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::constants::{DEFAULT_NAMESPACE, HOOKS_DIR};
use crate::error::{CutterError, CutterResult, IoResultExt};

/// Trait for loading template repositories from different sources.
pub trait TemplateLoader {
    /// Returns a local path to the template repository.
    fn load(&self) -> CutterResult<PathBuf>;
}

/// Loader for templates from the local filesystem.
pub struct LocalLoader<P: AsRef<Path>> {
    path: P,
}

impl<P: AsRef<Path>> LocalLoader<P> {
    /// Creates a new LocalLoader instance.
    pub fn new(path: P) -> Self {
        Self { path }
    }
}

impl<P: AsRef<Path>> TemplateLoader for LocalLoader<P> {
    /// Loads a template from the local filesystem.
    ///
    /// The returned path is absolute, so it stays valid for hooks running in
    /// the project directory.
    ///
    /// # Errors
    /// * `CutterError::TemplateDoesNotExistsError` if path doesn't exist
    fn load(&self) -> CutterResult<PathBuf> {
        let path = self.path.as_ref();
        if !path.is_dir() {
            return Err(CutterError::TemplateDoesNotExistsError {
                template_dir: path.display().to_string(),
            });
        }

        std::path::absolute(path).with_path(path)
    }
}

/// Finds the template subtree inside a repository.
///
/// Prefers the first directory (by name) whose name contains `cookiecutter`.
/// Otherwise a lone directory, ignoring `hooks` and hidden ones, is taken.
///
/// # Errors
/// * `CutterError::TemplateNotFoundError` if no candidate stands out
pub fn find_template<P: AsRef<Path>>(repo_dir: P) -> CutterResult<PathBuf> {
    let repo_dir = repo_dir.as_ref();
    debug!("Searching {} for the template directory", repo_dir.display());

    let mut candidates = fs::read_dir(repo_dir)
        .and_then(|entries| {
            entries
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<Vec<_>>>()
        })
        .with_path(repo_dir)?
        .into_iter()
        .filter(|path| path.is_dir())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name != HOOKS_DIR && !name.starts_with('.'))
        })
        .collect::<Vec<_>>();
    candidates.sort();

    let preferred = candidates.iter().position(|path| {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.contains(DEFAULT_NAMESPACE))
    });

    match (preferred, candidates.len()) {
        (Some(index), _) => Ok(candidates.swap_remove(index)),
        (None, 1) => Ok(candidates.remove(0)),
        _ => Err(CutterError::TemplateNotFoundError { repo_dir: repo_dir.to_path_buf() }),
    }
}

