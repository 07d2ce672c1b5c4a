//! Sync command - resolves the group and runs the invite loop.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;

use crate::config::{AppConfig, SyncConfig, resolve_group_name};
use crate::domain::SyncReport;
use crate::infrastructure::graph::{GraphClient, TokenProvider};
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::port::PortClient;
use crate::infrastructure::services::SyncService;
use crate::infrastructure::logging;

/// Exit code when at least one invite hard-failed.
const EXIT_INVITE_FAILURES: u8 = 2;
/// Exit code for fatal setup or resolution errors.
const EXIT_FATAL: u8 = 1;

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Group displayName to sync
    #[arg(long)]
    pub group: Option<String>,

    /// Report what would be sent without calling the Port API
    #[arg(long)]
    pub dry_run: bool,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,
}

/// Run the sync command end to end, mapping outcomes to exit codes:
/// 0 all invites succeeded or were tolerated, 2 at least one hard failure,
/// 1 fatal error before dispatch completed.
pub async fn run(args: SyncArgs) -> ExitCode {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    init_logging(&config, args.verbose);

    match execute(args, &config).await {
        Ok(report) if report.failed == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(EXIT_INVITE_FAILURES),
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

async fn execute(args: SyncArgs, app: &AppConfig) -> anyhow::Result<SyncReport> {
    let group_name = resolve_group_name(args.group)?;
    let config = SyncConfig::from_env(group_name, args.dry_run, args.verbose)?;

    let http = Arc::new(HttpClient::new());

    let token = TokenProvider::new(http.clone(), &app.graph.login_base_url, &config)
        .acquire()
        .await?;

    let graph = GraphClient::new(http.clone(), &app.graph.base_url, &token);
    let port = PortClient::new(http, &app.port.base_url, &config);

    let report = SyncService::new(graph, port).run(&config.group_name).await?;
    Ok(report)
}

fn init_logging(config: &AppConfig, verbose: bool) {
    let level = if verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };

    logging::init_logging(&logging::LoggingConfig {
        level,
        format: config.logging.format.clone(),
    });
}
