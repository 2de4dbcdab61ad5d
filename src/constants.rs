//! Common constants used throughout the cutter application.

/// Template declaration file looked up at the repository root.
pub const CONTEXT_FILE: &str = "cookiecutter.json";

/// Namespace under which the template variables live.
/// Matches the stem of [`CONTEXT_FILE`].
pub const DEFAULT_NAMESPACE: &str = "cookiecutter";

/// Namespace entry holding the glob patterns copied without rendering.
pub const COPY_WITHOUT_RENDER: &str = "_copy_without_render";

/// Directory, relative to the template repository, holding hook scripts.
pub const HOOKS_DIR: &str = "hooks";

/// Hook executed after the project directory is created, before any file.
pub const PRE_GEN_HOOK: &str = "pre_gen_project";

/// Hook executed once every file has been generated.
pub const POST_GEN_HOOK: &str = "post_gen_project";

/// User configuration file name, looked up in the home directory.
pub const USER_CONFIG_FILE: &str = ".cutterrc";

/// Environment variable overriding the user configuration path.
pub const USER_CONFIG_ENV: &str = "CUTTER_CONFIG";
