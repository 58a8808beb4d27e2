use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;

use backend_application::{rollback_player_actions, run_raid_scan, RollbackRequest};
use backend_bootstrap::{logging, run_watch, scan_all_servers, AppContext};
use backend_infrastructure::{current_unix_seconds, CONFIG_ENV};

#[derive(Parser, Debug)]
#[command(name = "raidguard")]
#[command(about = "Raid detection and rollback for ER:LC servers", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Also write JSON logs to this directory (rotated daily)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan recent command logs once and print the reports
    Scan {
        /// Only scan this server instead of every configured one
        #[arg(short, long)]
        server: Option<String>,
    },
    /// Queue inverse commands for everything a player did recently
    Rollback {
        #[arg(short, long)]
        server: String,
        #[arg(short, long)]
        player: String,
        #[arg(long)]
        lookback_seconds: Option<i64>,
        #[arg(long)]
        priority: Option<u8>,
        #[arg(long)]
        requested_by: Option<String>,
    },
    /// Poll all servers until interrupted
    Watch,
    /// Check that the alert webhook is reachable
    Check,
}

// AppConfig::load reads the path from the environment.
fn apply_config_override(config: Option<&str>) {
    if let Some(path) = config {
        std::env::set_var(CONFIG_ENV, path);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = logging::init_logging(args.log_dir.as_deref())?;

    apply_config_override(args.config.as_deref());

    let context = AppContext::new().await?;
    let state = context.state;

    match args.command {
        Command::Scan { server } => {
            let now = current_unix_seconds();
            let reports = match server {
                Some(server) => vec![run_raid_scan(&state, &server, now).await?],
                None => scan_all_servers(&state, now).await,
            };
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        Command::Rollback {
            server,
            player,
            lookback_seconds,
            priority,
            requested_by,
        } => {
            let request = RollbackRequest {
                server_id: server,
                player_id: player,
                lookback_seconds,
                priority,
                requested_by,
            };
            let outcome = rollback_player_actions(&state, request, current_unix_seconds()).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Watch => run_watch(state).await?,
        Command::Check => {
            state
                .alert_service
                .check_alert_target(&state.config.alert)
                .await?;
            info!("alert webhook reachable");
            println!("{}", json!({ "ok": true }));
        }
    }
    Ok(())
}
