// paramcheck/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    // RUST_LOG=paramcheck_core=debug paramcheck check ... overrides -v
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check {
            project_dir,
            mo,
            instance,
            format,
            strict,
        } => commands::check::execute(project_dir, mo, instance, format, strict),
        Commands::Lint { project_dir } => commands::lint::execute(project_dir),
        Commands::Eval { expression, params } => commands::eval::execute(&expression, &params),
        Commands::Init { dir, name } => commands::init::execute(dir, name),
    }
}
