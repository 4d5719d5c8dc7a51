use anyhow::Result;
use clap::Parser;
use quicknotes::cli::Args;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Log setup
    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(format!("quicknotes={level}").parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    quicknotes::cli::run(args).await
}
