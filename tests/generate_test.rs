use std::fs;
use std::path::{Path, PathBuf};

use cutter::context::{generate_context, Context, Variables};
use cutter::error::CutterError;
use cutter::generate::{
    ensure_dir_is_templated, generate_file, generate_files, is_rendered_path_valid,
    normalize_path, render_and_create_dir,
};
use cutter::hooks::NoopHookRunner;
use cutter::renderer::MiniJinjaRenderer;
use serde_json::json;
use tempfile::TempDir;

const ROOT: &str = "{{cookiecutter.project_name}}";

fn write<P: AsRef<Path>>(path: P, content: impl AsRef<[u8]>) {
    let path = path.as_ref();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Template repository with a `cookiecutter.json` and a templated root.
fn make_repo(declaration: serde_json::Value) -> (TempDir, PathBuf) {
    let repo = TempDir::new().unwrap();
    write(repo.path().join("cookiecutter.json"), declaration.to_string());
    let template_dir = repo.path().join(ROOT);
    fs::create_dir(&template_dir).unwrap();
    (repo, template_dir)
}

fn context_for(repo: &Path) -> Context {
    generate_context(repo.join("cookiecutter.json"), None, None).unwrap()
}

fn generate(repo: &Path, output: &Path) -> cutter::error::CutterResult<PathBuf> {
    generate_files(repo, context_for(repo), output, &NoopHookRunner)
}

#[test_log::test]
fn test_generates_readme() {
    let (repo, template_dir) = make_repo(json!({"project_name": "Demo"}));
    write(template_dir.join("README.md"), "# {{cookiecutter.project_name}}");
    let output = TempDir::new().unwrap();
    let out = output.path().join("out");

    let project_dir = generate(repo.path(), &out).unwrap();

    assert_eq!(project_dir, out.join("Demo"));
    assert_eq!(fs::read_to_string(out.join("Demo/README.md")).unwrap(), "# Demo");
}

#[test]
fn test_renders_nested_names_and_dotfiles() {
    let (repo, template_dir) =
        make_repo(json!({"project_name": "Demo", "module": "demo_core"}));
    write(
        template_dir.join("src/{{cookiecutter.module}}/__init__.py"),
        "NAME = '{{ cookiecutter.module }}'\n",
    );
    write(template_dir.join(".gitignore"), "/{{ cookiecutter.module }}.egg-info\n");
    fs::create_dir_all(template_dir.join("empty")).unwrap();
    let output = TempDir::new().unwrap();

    let project_dir = generate(repo.path(), output.path()).unwrap();

    assert_eq!(
        fs::read_to_string(project_dir.join("src/demo_core/__init__.py")).unwrap(),
        "NAME = 'demo_core'\n"
    );
    assert_eq!(
        fs::read_to_string(project_dir.join(".gitignore")).unwrap(),
        "/demo_core.egg-info\n"
    );
    assert!(project_dir.join("empty").is_dir());
}

#[test]
fn test_overrides_reach_the_output() {
    let (repo, template_dir) = make_repo(json!({"project_name": "Demo", "author": "nobody"}));
    write(template_dir.join("AUTHORS"), "{{ cookiecutter.author }}");
    let output = TempDir::new().unwrap();

    let mut extra = Variables::new();
    extra.insert("project_name".to_string(), json!("Other"));
    extra.insert("author".to_string(), json!("Jane"));
    let context =
        generate_context(repo.path().join("cookiecutter.json"), None, Some(&extra)).unwrap();

    let project_dir = generate_files(repo.path(), context, output.path(), &NoopHookRunner).unwrap();

    assert_eq!(project_dir, output.path().join("Other"));
    assert_eq!(fs::read_to_string(project_dir.join("AUTHORS")).unwrap(), "Jane");
}

#[test]
fn test_copy_without_render_file() {
    let (repo, template_dir) =
        make_repo(json!({"project_name": "Demo", "_copy_without_render": ["*.bin"]}));
    let raw = b"header {{ cookiecutter.project_name }} \x01\x02 {% broken".to_vec();
    write(template_dir.join("asset.bin"), &raw);
    write(template_dir.join("{{cookiecutter.project_name}}.bin"), "{{ kept }}");
    let output = TempDir::new().unwrap();

    let project_dir = generate(repo.path(), output.path()).unwrap();

    assert_eq!(fs::read(project_dir.join("asset.bin")).unwrap(), raw);
    assert_eq!(fs::read_to_string(project_dir.join("Demo.bin")).unwrap(), "{{ kept }}");
}

#[test]
fn test_copy_without_render_dir() {
    let (repo, template_dir) =
        make_repo(json!({"project_name": "Demo", "_copy_without_render": ["static"]}));
    write(template_dir.join("static/{{cookiecutter.project_name}}.html"), "{{ raw }}");
    write(template_dir.join("static/js/app.js"), "const t = `{% raw %}`;");
    write(template_dir.join("page.html"), "{{ cookiecutter.project_name }}");
    let output = TempDir::new().unwrap();

    let project_dir = generate(repo.path(), output.path()).unwrap();

    let copied = dir_diff::is_different(template_dir.join("static"), project_dir.join("static"));
    assert!(!copied.unwrap());
    assert_eq!(fs::read_to_string(project_dir.join("page.html")).unwrap(), "Demo");
}

#[test]
fn test_copy_without_render_templated_dir() {
    let (repo, template_dir) = make_repo(json!({
        "project_name": "Demo",
        "module": "core",
        "_copy_without_render": ["{{cookiecutter.module}}/static"]
    }));
    write(template_dir.join("{{cookiecutter.module}}/static/app.js"), "{{ raw }}");
    write(template_dir.join("{{cookiecutter.module}}/views.py"), "{{ cookiecutter.module }}");
    let output = TempDir::new().unwrap();

    let project_dir = generate(repo.path(), output.path()).unwrap();

    assert_eq!(fs::read_to_string(project_dir.join("core/static/app.js")).unwrap(), "{{ raw }}");
    assert_eq!(fs::read_to_string(project_dir.join("core/views.py")).unwrap(), "core");
}

#[test]
fn test_binary_passthrough() {
    let (repo, template_dir) = make_repo(json!({"project_name": "Demo"}));
    let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR{{ cookiecutter.project_name }}\xff".to_vec();
    write(template_dir.join("logo.png"), &png);
    let output = TempDir::new().unwrap();

    let project_dir = generate(repo.path(), output.path()).unwrap();

    assert_eq!(fs::read(project_dir.join("logo.png")).unwrap(), png);
}

#[test]
fn test_conditional_names_are_skipped() {
    let (repo, template_dir) = make_repo(json!({"project_name": "Demo", "use_docker": "no"}));
    write(
        template_dir.join("{% if cookiecutter.use_docker == 'yes' %}Dockerfile{% endif %}"),
        "FROM scratch",
    );
    write(
        template_dir.join("{% if cookiecutter.use_docker == 'yes' %}docker{% endif %}/compose.yml"),
        "services: {}",
    );
    write(template_dir.join("README.md"), "readme");
    let output = TempDir::new().unwrap();

    let project_dir = generate(repo.path(), output.path()).unwrap();

    let entries: Vec<_> = fs::read_dir(&project_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries, vec!["README.md"]);
}

#[test]
fn test_non_templated_root_fails_before_writing() {
    let repo = TempDir::new().unwrap();
    write(repo.path().join("cookiecutter.json"), r#"{"project_name": "Demo"}"#);
    write(repo.path().join("project/README.md"), "# {{cookiecutter.project_name}}");
    let output = TempDir::new().unwrap();
    let out = output.path().join("out");

    match generate(repo.path(), &out) {
        Err(CutterError::NonTemplatedInputDirError { dirname }) => assert_eq!(dirname, "project"),
        other => panic!("Expected NonTemplatedInputDirError, got {other:?}"),
    }
    assert!(!out.exists());
}

#[test]
fn test_syntax_error_leaves_earlier_files() {
    let (repo, template_dir) = make_repo(json!({"project_name": "Demo"}));
    write(template_dir.join("a.txt"), "{{ cookiecutter.project_name }}");
    write(template_dir.join("b.txt"), "line\n{{ cookiecutter.project_name ");
    write(template_dir.join("c.txt"), "never written");
    let output = TempDir::new().unwrap();

    match generate(repo.path(), output.path()) {
        Err(CutterError::TemplateSyntaxError { name, line, .. }) => {
            assert_eq!(name, "b.txt");
            assert_eq!(line, 2);
        }
        other => panic!("Expected TemplateSyntaxError, got {other:?}"),
    }
    assert_eq!(fs::read_to_string(output.path().join("Demo/a.txt")).unwrap(), "Demo");
    assert!(!output.path().join("Demo/c.txt").exists());
}

#[test]
fn test_missing_template_dir() {
    let repo = TempDir::new().unwrap();
    write(repo.path().join("cookiecutter.json"), r#"{"project_name": "Demo"}"#);
    fs::create_dir(repo.path().join("a")).unwrap();
    fs::create_dir(repo.path().join("b")).unwrap();
    let output = TempDir::new().unwrap();

    assert!(matches!(
        generate(repo.path(), output.path()),
        Err(CutterError::TemplateNotFoundError { .. })
    ));
}

#[test]
fn test_ensure_dir_is_templated() {
    assert!(ensure_dir_is_templated("{{cookiecutter.project_name}}").is_ok());
    assert!(ensure_dir_is_templated("prefix-{{ cookiecutter.slug }}").is_ok());
    assert!(ensure_dir_is_templated("project").is_err());
    assert!(ensure_dir_is_templated("}}project{{").is_err());
}

#[test]
fn test_is_rendered_path_valid() {
    assert!(!is_rendered_path_valid(""));
    assert!(!is_rendered_path_valid("  "));
    assert!(!is_rendered_path_valid("output//filename.txt"));
    assert!(!is_rendered_path_valid("/filename.txt"));
    assert!(!is_rendered_path_valid("docs/"));
    assert!(is_rendered_path_valid("filename.txt"));
    assert!(is_rendered_path_valid("output/filename.txt"));
}

#[test]
fn test_normalize_path() {
    assert_eq!(normalize_path(Path::new("/out/./a/../b")), PathBuf::from("/out/b"));
    assert_eq!(normalize_path(Path::new("/out/a/")), PathBuf::from("/out/a"));
}

#[test]
fn test_render_and_create_dir_is_idempotent() {
    let output = TempDir::new().unwrap();
    let renderer = MiniJinjaRenderer::new(output.path());
    let context = Context::from_namespace(
        "cookiecutter",
        serde_json::from_value(json!({"project_name": "Demo"})).unwrap(),
    );

    let create = |dirname: &str| {
        render_and_create_dir(dirname, &context, output.path(), &renderer).unwrap().unwrap()
    };
    let first = create("{{cookiecutter.project_name}}/./docs");
    let second = create("{{cookiecutter.project_name}}/docs");

    assert_eq!(first, output.path().join("Demo").join("docs"));
    assert_eq!(first, second);
    assert!(first.is_dir());
}

#[test]
fn test_generate_file_round_trip() {
    let template = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let content = "plain text\nno expressions here\n\n";
    write(template.path().join("notes/plain.txt"), content);

    let renderer = MiniJinjaRenderer::new(template.path());
    let outfile = generate_file(
        project.path(),
        template.path(),
        &Path::new("notes").join("plain.txt"),
        &Context::default(),
        &renderer,
    )
    .unwrap()
    .unwrap();

    assert_eq!(outfile, project.path().join("notes/plain.txt"));
    assert_eq!(fs::read_to_string(&outfile).unwrap(), content);
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn mode(path: &Path) -> u32 {
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    fn write_hook(repo: &Path, name: &str, body: &str) {
        let script = repo.join("hooks").join(name);
        write(&script, body);
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_permissions_are_preserved() {
        let (repo, template_dir) =
            make_repo(json!({"project_name": "Demo", "_copy_without_render": ["raw/*"]}));
        write(template_dir.join("run.sh"), "#!/bin/sh\necho {{ cookiecutter.project_name }}\n");
        fs::set_permissions(template_dir.join("run.sh"), fs::Permissions::from_mode(0o750)).unwrap();
        write(template_dir.join("raw/data.txt"), "{{ raw }}");
        fs::set_permissions(template_dir.join("raw/data.txt"), fs::Permissions::from_mode(0o600))
            .unwrap();
        let output = TempDir::new().unwrap();

        let project_dir = generate(repo.path(), output.path()).unwrap();

        let script = fs::read_to_string(project_dir.join("run.sh")).unwrap();
        assert_eq!(script, "#!/bin/sh\necho Demo\n");
        assert_eq!(mode(&project_dir.join("run.sh")), 0o750);
        assert_eq!(mode(&project_dir.join("raw/data.txt")), 0o600);
    }

    #[test_log::test]
    fn test_hook_ordering() {
        let (repo, template_dir) = make_repo(json!({"project_name": "Demo"}));
        write(template_dir.join("README.md"), "# {{cookiecutter.project_name}}");
        write(template_dir.join("docs/index.md"), "docs");
        write_hook(repo.path(), "pre_gen_project.sh", "#!/bin/sh\nls -A > ../pre.txt\n");
        write_hook(repo.path(), "post_gen_project.sh", "#!/bin/sh\nLC_ALL=C ls -A > ../post.txt\n");
        let output = TempDir::new().unwrap();

        let hooks = cutter::hooks::ScriptHookRunner::new(repo.path());
        generate_files(repo.path(), context_for(repo.path()), output.path(), &hooks).unwrap();

        assert_eq!(fs::read_to_string(output.path().join("pre.txt")).unwrap(), "");
        assert_eq!(
            fs::read_to_string(output.path().join("post.txt")).unwrap(),
            "README.md\ndocs\n"
        );
    }

    #[test]
    fn test_pre_hook_failure_stops_generation() {
        let (repo, template_dir) = make_repo(json!({"project_name": "Demo"}));
        write(template_dir.join("README.md"), "# {{cookiecutter.project_name}}");
        write_hook(repo.path(), "pre_gen_project", "#!/bin/sh\nexit 1\n");
        let output = TempDir::new().unwrap();

        let hooks = cutter::hooks::ScriptHookRunner::new(repo.path());
        let result = generate_files(repo.path(), context_for(repo.path()), output.path(), &hooks);

        assert!(matches!(result, Err(CutterError::HookError { .. })));
        assert!(output.path().join("Demo").is_dir());
        assert!(!output.path().join("Demo/README.md").exists());
    }

    #[test]
    fn test_symlinked_dir_is_generated() {
        let (repo, template_dir) = make_repo(json!({"project_name": "Demo"}));
        write(template_dir.join("real/a.txt"), "{{ cookiecutter.project_name }}");
        std::os::unix::fs::symlink("real", template_dir.join("link")).unwrap();
        let output = TempDir::new().unwrap();

        let project_dir = generate(repo.path(), output.path()).unwrap();

        assert!(project_dir.join("link").is_dir());
        assert!(!project_dir.join("link").is_symlink());
        assert_eq!(fs::read_to_string(project_dir.join("link/a.txt")).unwrap(), "Demo");
        assert_eq!(fs::read_to_string(project_dir.join("real/a.txt")).unwrap(), "Demo");
    }

    #[test]
    fn test_symlinked_dir_copied_without_render() {
        let (repo, template_dir) =
            make_repo(json!({"project_name": "Demo", "_copy_without_render": ["assets"]}));
        write(repo.path().join("shared/js/app.js"), "{{ raw }}");
        std::os::unix::fs::symlink(repo.path().join("shared"), template_dir.join("assets")).unwrap();
        let output = TempDir::new().unwrap();

        let project_dir = generate(repo.path(), output.path()).unwrap();

        assert_eq!(
            fs::read_to_string(project_dir.join("assets/js/app.js")).unwrap(),
            "{{ raw }}"
        );
    }

    #[test]
    fn test_hook_spawn_failure_names_script() {
        let (repo, template_dir) = make_repo(json!({"project_name": "Demo"}));
        write(template_dir.join("README.md"), "# {{cookiecutter.project_name}}");
        let script = repo.path().join("hooks/pre_gen_project.sh");
        write(&script, "#!/bin/sh\nexit 0\n");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();
        let output = TempDir::new().unwrap();

        let hooks = cutter::hooks::ScriptHookRunner::new(repo.path());
        let result = generate_files(repo.path(), context_for(repo.path()), output.path(), &hooks);

        match &result {
            Err(CutterError::Io { path, .. }) => assert_eq!(path, &script),
            other => panic!("Expected Io error, got {other:?}"),
        }
        assert!(result.unwrap_err().to_string().contains("pre_gen_project.sh"));
    }

    #[test]
    fn test_post_hook_failure_is_reported() {
        let (repo, template_dir) = make_repo(json!({"project_name": "Demo"}));
        write(template_dir.join("README.md"), "# {{cookiecutter.project_name}}");
        write_hook(repo.path(), "post_gen_project", "#!/bin/sh\nexit 2\n");
        let output = TempDir::new().unwrap();

        let hooks = cutter::hooks::ScriptHookRunner::new(repo.path());
        let result = generate_files(repo.path(), context_for(repo.path()), output.path(), &hooks);

        match result {
            Err(CutterError::HookError { hook, .. }) => assert_eq!(hook, "post_gen_project"),
            other => panic!("Expected HookError, got {other:?}"),
        }
        assert!(output.path().join("Demo/README.md").is_file());
    }
}
