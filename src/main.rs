use anyhow::Result;
use clap::Parser;
use recap::{
    cli::{handle_process_command, Cli},
    config::Config,
    pipeline::PipelineError,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    // Incomplete environment is fatal before any recording is touched.
    let mut config = Config::from_env().map_err(PipelineError::Configuration)?;
    config.output_dir = cli.output_dir.clone();

    handle_process_command(&cli, &config).await
}
