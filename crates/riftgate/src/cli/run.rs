//! Command handlers.

use super::{Cli, Commands};
use riftgate::{CancelHandle, CancelSignal, ConfigError, RiftgateConfig, RiftgateResult, RiotClient};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Execute the parsed command line.
///
/// # Errors
///
/// Returns configuration errors and any error of the requested lookup.
pub async fn run_command(cli: Cli) -> RiftgateResult<()> {
    let config = match &cli.config {
        Some(path) => RiftgateConfig::from_file(path)?,
        None => RiftgateConfig::load()?,
    };
    debug!(?config, "Configuration loaded");

    let api_key = cli
        .api_key
        .as_deref()
        .ok_or_else(|| ConfigError::new("No API key: pass --api-key or set RIOT_API_KEY"))?;
    let client = RiotClient::new(api_key, &config)?;

    match cli.command {
        Commands::Account {
            game_name,
            tag_line,
        } => print_json(&client.account_by_riot_id(&game_name, &tag_line).await?),

        Commands::History {
            puuid,
            start,
            count,
        } => {
            let matches = client.match_history(&puuid, start, count).await?;
            info!(fetched = matches.len(), requested = count, "Match history fetched");
            print_json(&matches)
        }

        Commands::Live { puuid, wait: false } => print_json(&client.current_game(&puuid).await?),

        Commands::Live { puuid, wait: true } => {
            let (handle, cancel) = CancelSignal::pair();
            cancel_on_ctrl_c(handle);
            info!("Waiting for a live match");
            print_json(&client.wait_for_live_game(&puuid, &cancel).await?)
        }

        Commands::Featured => {
            let (handle, cancel) = CancelSignal::pair();
            cancel_on_ctrl_c(handle);
            print_json(&client.featured_classic_games(&cancel).await?)
        }
    }
}

fn cancel_on_ctrl_c(handle: CancelHandle) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupted, stopping");
                handle.cancel();
            }
            Err(e) => warn!(error = %e, "Cannot listen for Ctrl-C"),
        }
    });
}

fn print_json<T: Serialize>(value: &T) -> RiftgateResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| riftgate::JsonError::new(format!("Cannot render output: {}", e)))?;
    println!("{}", text);
    Ok(())
}
