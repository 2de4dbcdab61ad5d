//! cutter's main application entry point.
//! Parses arguments, assembles the context and drives generation.

use cutter::{
    cli::{get_args, Args},
    config::get_user_config,
    constants::CONTEXT_FILE,
    context::generate_context,
    error::{default_error_handler, CutterResult},
    generate::generate_files,
    hooks::{HookRunner, NoopHookRunner, ScriptHookRunner},
    loader::{LocalLoader, TemplateLoader},
    logger::init_logger,
    prompt::{prompt_for_config, DialoguerPrompter},
    renderer::MiniJinjaRenderer,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Resolves the template repository
/// 2. Loads the user configuration
/// 3. Assembles the context: declaration, user defaults, extra context
/// 4. Prompts for the template variables
/// 5. Generates the project, running hooks unless disabled
fn run(args: Args) -> CutterResult<()> {
    let repo_dir = LocalLoader::new(&args.template).load()?;
    let user_config = get_user_config(args.config_file.as_deref())?;
    let extra_context = args.extra_context();

    let context = generate_context(
        repo_dir.join(CONTEXT_FILE),
        Some(&user_config.default_context),
        Some(&extra_context),
    )?;

    let renderer = MiniJinjaRenderer::new(&repo_dir);
    let context = prompt_for_config(&context, &renderer, &DialoguerPrompter::new(), args.no_input)?;

    let hooks: Box<dyn HookRunner> = if args.no_hooks {
        Box::new(NoopHookRunner)
    } else {
        Box::new(ScriptHookRunner::new(&repo_dir))
    };

    let project_dir = generate_files(&repo_dir, context, &args.output_dir, &*hooks)?;
    println!("Project generated in {}.", project_dir.display());
    Ok(())
}
