//! Project generation.
//! Walks the template tree, renders directory names, file names and file
//! contents against the context, and writes the result below the output
//! directory. Hooks bracket the walk.

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::binary::is_binary;
use crate::constants::{POST_GEN_HOOK, PRE_GEN_HOOK};
use crate::context::Context;
use crate::error::{CutterError, CutterResult, IoResultExt};
use crate::hooks::HookRunner;
use crate::loader::find_template;
use crate::policy::RenderPolicy;
use crate::renderer::{template_name, MiniJinjaRenderer, TemplateRenderer};

/// Fails unless `dirname` holds a `{{ ... }}` expression.
///
/// # Errors
/// * `CutterError::NonTemplatedInputDirError` if no delimiter pair is found
pub fn ensure_dir_is_templated(dirname: &str) -> CutterResult<()> {
    let templated = dirname
        .find("{{")
        .is_some_and(|start| dirname[start + 2..].contains("}}"));
    if templated {
        Ok(())
    } else {
        Err(CutterError::NonTemplatedInputDirError { dirname: dirname.to_string() })
    }
}

/// Checks a rendered relative path before it is used.
///
/// Empty paths, absolute paths and paths with an empty segment come from
/// conditional names that rendered to nothing; they are skipped.
pub fn is_rendered_path_valid(path: &str) -> bool {
    !path.trim().is_empty() && !path.starts_with('/') && !path.split('/').any(str::is_empty)
}

/// Lexically normalizes `path`, dropping `.` and resolving `..`.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Copies the permission bits of `source` onto `dest`.
fn copy_mode(source: &Path, dest: &Path) -> CutterResult<()> {
    let permissions = fs::metadata(source).with_path(source)?.permissions();
    fs::set_permissions(dest, permissions).with_path(dest)?;
    Ok(())
}

fn ensure_parent(path: &Path) -> CutterResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }
    Ok(())
}

/// Renders a directory name and creates it below `output_dir`.
///
/// Existing directories are fine. Returns the normalized path, or `None` if
/// the name rendered to a path that must be skipped.
///
/// # Errors
/// * Template errors from rendering the name
/// * `CutterError::Io` if the directory cannot be created
pub fn render_and_create_dir(
    dirname: &str,
    context: &Context,
    output_dir: &Path,
    renderer: &dyn TemplateRenderer,
) -> CutterResult<Option<PathBuf>> {
    let rendered_dirname = renderer.render_str(dirname, context)?;
    if !is_rendered_path_valid(&rendered_dirname) {
        debug!("Skipping dir '{dirname}', it rendered to '{rendered_dirname}'");
        return Ok(None);
    }

    let dir_to_create = normalize_path(&output_dir.join(&rendered_dirname));
    debug!(
        "Rendered dir {} must exist in output_dir {}",
        rendered_dirname,
        output_dir.display()
    );
    fs::create_dir_all(&dir_to_create).with_path(&dir_to_create)?;
    Ok(Some(dir_to_create))
}

/// Generates one file of the project.
///
/// 1. Renders `infile` (relative to `template_dir`) into the output path.
/// 2. Binary files are copied as-is, text files are rendered through the
///    renderer and written as UTF-8.
/// 3. Permission bits of the input file are applied to the output file.
///
/// Returns the written path, or `None` if the name rendered to a skipped path.
///
/// # Errors
/// * `CutterError::TemplateSyntaxError` naming `infile` on malformed content
/// * `CutterError::Io` on read or write failures
pub fn generate_file(
    project_dir: &Path,
    template_dir: &Path,
    infile: &Path,
    context: &Context,
    renderer: &dyn TemplateRenderer,
) -> CutterResult<Option<PathBuf>> {
    let name = template_name(infile);
    debug!("Generating file {name}");

    let rendered_name = renderer.render_str(&name, context)?;
    if !is_rendered_path_valid(&rendered_name) {
        debug!("Skipping file '{name}', it rendered to '{rendered_name}'");
        return Ok(None);
    }
    let outfile = project_dir.join(&rendered_name);
    debug!("outfile is {}", outfile.display());

    let source = template_dir.join(infile);
    ensure_parent(&outfile)?;
    if is_binary(&source)? {
        debug!("Copying binary {} to {} without rendering", name, outfile.display());
        fs::copy(&source, &outfile).with_path(&outfile)?;
    } else {
        let rendered = renderer.render_file(&name, context)?;
        debug!("Writing {}", outfile.display());
        fs::write(&outfile, rendered).with_path(&outfile)?;
    }

    copy_mode(&source, &outfile)?;
    Ok(Some(outfile))
}

/// Copies a file matched by `_copy_without_render`. Only its name is rendered.
fn copy_file_without_render(
    project_dir: &Path,
    template_dir: &Path,
    infile: &Path,
    context: &Context,
    renderer: &dyn TemplateRenderer,
) -> CutterResult<()> {
    let name = template_name(infile);
    let rendered_name = renderer.render_str(&name, context)?;
    if !is_rendered_path_valid(&rendered_name) {
        debug!("Skipping file '{name}', it rendered to '{rendered_name}'");
        return Ok(());
    }

    let source = template_dir.join(infile);
    let outfile = project_dir.join(&rendered_name);
    debug!("Copying file {} to {} without rendering", name, outfile.display());
    ensure_parent(&outfile)?;
    fs::copy(&source, &outfile).with_path(&outfile)?;
    copy_mode(&source, &outfile)
}

/// Copies a directory matched by `_copy_without_render`.
///
/// The directory's own path is rendered, everything below it keeps its name
/// and bytes.
fn copy_dir_without_render(
    project_dir: &Path,
    template_dir: &Path,
    indir: &Path,
    context: &Context,
    renderer: &dyn TemplateRenderer,
) -> CutterResult<()> {
    let Some(outdir) = render_and_create_dir(&template_name(indir), context, project_dir, renderer)?
    else {
        return Ok(());
    };
    let source = template_dir.join(indir);
    debug!("Copying dir {} to {} without rendering", source.display(), outdir.display());

    for entry in WalkDir::new(&source).min_depth(1).follow_links(true) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(&source)
            .map_err(|e| CutterError::ConfigError(e.to_string()))?;
        let target = outdir.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).with_path(&target)?;
        } else {
            fs::copy(entry.path(), &target).with_path(&target)?;
            copy_mode(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Walks `template_dir` top-down, generating every path below `project_dir`.
///
/// Entries are visited depth-first in name order; symlinks are followed, so a
/// linked directory is generated like a real one. Directories matched by the
/// policy are copied whole and not descended into. Any error stops the walk;
/// files already written stay on disk.
pub fn walk_template(
    template_dir: &Path,
    project_dir: &Path,
    context: &Context,
    policy: &RenderPolicy,
    renderer: &dyn TemplateRenderer,
) -> CutterResult<()> {
    let mut walker = WalkDir::new(template_dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(template_dir)
            .map_err(|e| CutterError::ConfigError(e.to_string()))?
            .to_path_buf();

        if entry.file_type().is_dir() {
            if policy.copy_without_render(&relative) {
                walker.skip_current_dir();
                copy_dir_without_render(project_dir, template_dir, &relative, context, renderer)?;
            } else if render_and_create_dir(
                &template_name(&relative),
                context,
                project_dir,
                renderer,
            )?
            .is_none()
            {
                walker.skip_current_dir();
            }
        } else if policy.copy_without_render(&relative) {
            copy_file_without_render(project_dir, template_dir, &relative, context, renderer)?;
        } else {
            generate_file(project_dir, template_dir, &relative, context, renderer)?;
        }
    }

    Ok(())
}

/// Renders the templates of a repository into `output_dir`.
///
/// # Arguments
/// * `repo_dir` - Template repository, holding the template subtree and `hooks/`
/// * `context` - Assembled context for the run
/// * `output_dir` - Directory the project directory is created in
/// * `hooks` - Runner for the `pre_gen_project` and `post_gen_project` hooks
///
/// # Returns
/// * `CutterResult<PathBuf>` - Absolute path of the generated project directory
///
/// # Flow
/// 1. Locates the template subtree and checks its name is templated
/// 2. Creates the rendered project directory
/// 3. Runs the pre-generation hook
/// 4. Walks the template subtree
/// 5. Runs the post-generation hook
pub fn generate_files<P: AsRef<Path>, Q: AsRef<Path>>(
    repo_dir: P,
    context: Context,
    output_dir: Q,
    hooks: &dyn HookRunner,
) -> CutterResult<PathBuf> {
    let repo_dir = repo_dir.as_ref();
    let template_dir = find_template(repo_dir)?;
    info!("Generating project from {}", template_dir.display());

    let unrendered_dir = template_dir
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            CutterError::ConfigError(format!("invalid template directory: {}", template_dir.display()))
        })?;
    ensure_dir_is_templated(unrendered_dir)?;

    let mut context = context;
    context.ensure_namespace();
    let policy = RenderPolicy::from_context(&context)?;
    let renderer = MiniJinjaRenderer::new(&template_dir);

    let output_dir = output_dir.as_ref();
    let output_dir = std::path::absolute(output_dir).with_path(output_dir)?;
    let project_dir = render_and_create_dir(unrendered_dir, &context, &output_dir, &renderer)?
        .ok_or_else(|| {
            CutterError::ConfigError(format!(
                "template directory '{unrendered_dir}' rendered to an empty name"
            ))
        })?;
    debug!("project_dir is {}", project_dir.display());

    hooks.run_hook(PRE_GEN_HOOK, &project_dir, &context)?;
    walk_template(&template_dir, &project_dir, &context, &policy, &renderer)?;
    hooks.run_hook(POST_GEN_HOOK, &project_dir, &context)?;

    Ok(project_dir)
}
