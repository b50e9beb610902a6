mod cli;
mod logging;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use common_values_engine::{load_config, run, PostgresStore, ReqwestStatsSource, RunReport};
use engine_logging::{engine_debug, engine_error};

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.verbosity(), cli.log_file.as_deref());

    match run_cli(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            engine_error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run_cli(cli: &Cli) -> anyhow::Result<()> {
    let mut config = load_config(&cli.config)
        .with_context(|| format!("could not load {}", cli.config.display()))?;
    config.database.apply(cli.database_overrides());
    engine_debug!("Loaded {} keys from {}", config.keys.len(), cli.config.display());

    let source = ReqwestStatsSource::new(
        config.service.base_url.clone(),
        config.service.fetch.clone(),
    )
    .context("could not build HTTP client")?;
    let store = PostgresStore::from_settings(&config.database);

    let report = run(&config, &source, &store, cli.run_options()).await?;
    if cli.no_update {
        print!("{}", render_report(&report));
    }
    Ok(())
}

/// One line per key: `key: value, value, ...`.
fn render_report(report: &RunReport) -> String {
    let mut out = String::new();
    for key in &report.keys {
        out.push_str(&key.key);
        out.push_str(": ");
        out.push_str(&key.candidates.join(", "));
        out.push('\n');
    }
    out
}
