use anyhow::Context;
use cinema_hub::utils::{logger, validation::Validate};
use cinema_hub::{CinemaAggregator, CinemaConfig, CinemaError, CliConfig};
use clap::Parser;
use std::time::Duration;

fn fail(e: CinemaError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.severity().exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting cinema-hub lookup for movie {}", cli.movie_id);
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = cli.validate() {
        fail(e);
    }

    let config = match CinemaConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => fail(e),
    };
    if let Err(e) = config.validate() {
        fail(e);
    }

    let aggregator = match CinemaAggregator::from_config(&config) {
        Ok(aggregator) => aggregator,
        Err(e) => fail(e),
    };

    let cinemas = match cli.deadline_seconds {
        Some(seconds) => {
            aggregator
                .get_cinemas_for_movie_within(&cli.movie_id, Duration::from_secs(seconds))
                .await
        }
        None => aggregator.get_cinemas_for_movie(&cli.movie_id).await,
    };

    let output = serde_json::to_string_pretty(&cinemas).context("Failed to serialize cinemas")?;
    println!("{}", output);

    tracing::info!("✅ Found {} cinema(s) for movie {}", cinemas.len(), cli.movie_id);
    Ok(())
}
