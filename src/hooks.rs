//! Pre and post generation hooks.
//! Scripts live in the `hooks/` directory of the template repository and are
//! matched by file stem, so `pre_gen_project`, `pre_gen_project.sh` and
//! `pre_gen_project.py` all serve the `pre_gen_project` event.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info};
use serde::Serialize;

use crate::constants::HOOKS_DIR;
use crate::context::Context;
use crate::error::{CutterError, CutterResult, IoResultExt};

/// Document written to a hook's stdin.
#[derive(Serialize)]
pub struct Output<'a> {
    /// Template repository the hook belongs to
    pub template_dir: &'a Path,
    /// Generated project directory
    pub output_dir: &'a Path,
    pub context: &'a Context,
}

/// Runs the scripts bracketing a generation run.
pub trait HookRunner {
    /// Runs the script registered for `hook`, if any.
    ///
    /// # Errors
    /// * `CutterError::HookError` if the script exits unsuccessfully
    fn run_hook(&self, hook: &str, project_dir: &Path, context: &Context) -> CutterResult<()>;
}

/// Runs hook scripts found in a template repository.
///
/// Hooks run inside the project directory, so the repository path is made
/// absolute before any script is looked up.
pub struct ScriptHookRunner {
    repo_dir: PathBuf,
}

impl ScriptHookRunner {
    pub fn new<P: AsRef<Path>>(repo_dir: P) -> Self {
        Self { repo_dir: repo_dir.as_ref().to_path_buf() }
    }
}

impl HookRunner for ScriptHookRunner {
    fn run_hook(&self, hook: &str, project_dir: &Path, context: &Context) -> CutterResult<()> {
        let repo_dir = std::path::absolute(&self.repo_dir).with_path(&self.repo_dir)?;
        match find_hook(&repo_dir, hook)? {
            Some(script) => run_script(&script, hook, &repo_dir, project_dir, context),
            None => {
                debug!("No {hook} hook found");
                Ok(())
            }
        }
    }
}

/// Hook runner that never runs anything.
pub struct NoopHookRunner;

impl HookRunner for NoopHookRunner {
    fn run_hook(&self, hook: &str, _project_dir: &Path, _context: &Context) -> CutterResult<()> {
        debug!("Skipping {hook} hook");
        Ok(())
    }
}

/// Looks up the script for `hook` in `<repo_dir>/hooks`.
///
/// Hidden files and editor backups (`~` suffix) are ignored. When several
/// scripts share the stem, the first one by name wins.
pub fn find_hook<P: AsRef<Path>>(repo_dir: P, hook: &str) -> CutterResult<Option<PathBuf>> {
    let hooks_dir = repo_dir.as_ref().join(HOOKS_DIR);
    if !hooks_dir.is_dir() {
        return Ok(None);
    }

    let mut scripts = fs::read_dir(&hooks_dir)
        .and_then(|entries| {
            entries
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<Vec<_>>>()
        })
        .with_path(&hooks_dir)?;
    scripts.sort();

    Ok(scripts.into_iter().find(|script| {
        let Some(name) = script.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        script.is_file()
            && !name.starts_with('.')
            && !name.ends_with('~')
            && script.file_stem().and_then(|s| s.to_str()) == Some(hook)
    }))
}

/// Executes `script` with the project directory as working directory.
///
/// The hook receives an [`Output`] document as JSON on stdin. Relative
/// `script` and `repo_dir` paths are resolved against the current directory
/// first.
pub fn run_script(
    script: &Path,
    hook: &str,
    repo_dir: &Path,
    project_dir: &Path,
    context: &Context,
) -> CutterResult<()> {
    let script = std::path::absolute(script).with_path(script)?;
    let repo_dir = std::path::absolute(repo_dir).with_path(repo_dir)?;
    info!("Running {hook} hook: {}", script.display());

    let output = Output { template_dir: &repo_dir, output_dir: project_dir, context };
    let payload = serde_json::to_vec(&output)
        .map_err(|e| CutterError::ConfigError(format!("failed to serialize hook input: {e}")))?;

    let mut child = Command::new(&script)
        .current_dir(project_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .with_path(&script)?;

    // Write context to stdin; scripts that exit without reading it are fine.
    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(&payload) {
            if e.kind() != ErrorKind::BrokenPipe {
                return Err(CutterError::Io { path: script, source: e });
            }
        }
    }

    let status = child.wait().with_path(&script)?;
    if !status.success() {
        return Err(CutterError::HookError { hook: hook.to_string(), status });
    }

    Ok(())
}
