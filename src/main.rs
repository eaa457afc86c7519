use clap::Parser;
use stockscope::cli::{log_level, run, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    run(cli)
}
