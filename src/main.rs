use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();
    match cli::run(cli) {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("cardsynth failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
