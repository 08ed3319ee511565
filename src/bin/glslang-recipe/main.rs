//! glslang-recipe CLI - build and describe the Khronos glslang package

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use glslang_recipe::util::diagnostic::emit;
use glslang_recipe::util::Shell;
use glslang_recipe::RecipeError;

fn main() {
    // Parse CLI
    let cli = Cli::parse();
    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.no_color);

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("glslang_recipe=debug")
    } else if cli.quiet {
        EnvFilter::new("glslang_recipe=error")
    } else {
        EnvFilter::new("glslang_recipe=info")
    };

    // stdout carries command results
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli, &shell) {
        match e.downcast_ref::<RecipeError>() {
            Some(err) => emit(&err.to_diagnostic(), shell.use_color()),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    let home = cli.home;

    // Execute command
    match cli.command {
        Commands::Options => commands::options::execute(),
        Commands::Validate(args) => commands::validate::execute(args, home.as_deref()),
        Commands::Flags(args) => commands::flags::execute(args, home.as_deref()),
        Commands::Describe(args) => commands::describe::execute(args, home.as_deref()),
        Commands::Build(args) => commands::build::execute(args, home.as_deref(), shell),
        Commands::Verify(args) => commands::verify::execute(args, home.as_deref(), shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
