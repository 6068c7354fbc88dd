//! Atlas - a terminal client for browsing databases through a data service.

mod cli;
mod logging;

use cli::{Cli, Mode};
use db_atlas::config::Config;
use db_atlas::console::ExecutionStatus;
use db_atlas::error::{AtlasError, Result};
use db_atlas::gateway::{DataGateway, HttpGateway, MockGateway, RowSet};
use db_atlas::session::Session;
use db_atlas::tabular::TabularView;
use db_atlas::tui;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse_args();
    let mode = match cli.mode() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    if mode == Mode::Interactive {
        logging::init_file_logging();
    } else {
        logging::init_stderr_logging();
    }

    match run(&cli, mode).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}: {}", e.category(), e);
            eprintln!("{}: {}", e.category(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, mode: Mode) -> Result<ExitCode> {
    let (gateway, source_info) = build_gateway(cli)?;

    match mode {
        Mode::Interactive => {
            info!("Starting TUI against {}", source_info);
            tui::run(Session::new(gateway), source_info).await?;
            Ok(ExitCode::SUCCESS)
        }
        Mode::ListDatabases => {
            for database in gateway.list_databases().await? {
                println!("{database}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Mode::ListTables(database) => {
            for table in gateway.database_detail(&database).await?.tables {
                println!("{table}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Mode::Preview { database, table } => {
            let rows = gateway.table_preview(&database, &table).await?;
            print_rows(&rows, "No data available");
            Ok(ExitCode::SUCCESS)
        }
        Mode::Execute { query, database } => execute(gateway, query, database).await,
        Mode::Check => {
            let health = gateway.health().await?;
            println!(
                "{}: {} (database: {})",
                source_info,
                health.status,
                health.database.as_deref().unwrap_or("unknown")
            );
            Ok(if health.is_healthy() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

/// Builds the gateway and a description of it for display.
///
/// Precedence for the service URL:
/// 1. `--url` flag or `ATLAS_GATEWAY_URL` (highest)
/// 2. Config file
/// 3. Built-in default
fn build_gateway(cli: &Cli) -> Result<(Arc<dyn DataGateway>, String)> {
    if cli.mock {
        info!("Using the built-in demo catalog");
        return Ok((Arc::new(MockGateway::demo()), "demo".to_string()));
    }

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;
    let gateway_config = config.resolve_gateway(cli.url.as_deref(), cli.timeout)?;
    info!("Data service: {}", gateway_config.url);

    let gateway = HttpGateway::new(&gateway_config)?;
    Ok((Arc::new(gateway), gateway_config.display_string()))
}

/// Runs a query through the console so messages match the interactive UI.
async fn execute(
    gateway: Arc<dyn DataGateway>,
    query: String,
    database: Option<String>,
) -> Result<ExitCode> {
    let mut session = Session::new(gateway);
    session.set_query_text(query);
    session.set_target_database(database);
    session.execute();
    session.settle().await;

    let console = session.console();
    match console.status() {
        ExecutionStatus::Succeeded => {
            match (console.rows(), console.message()) {
                (_, Some(message)) => println!("{message}"),
                (Some(rows), None) => print_rows(rows, ""),
                (None, None) => {}
            }
            Ok(ExitCode::SUCCESS)
        }
        ExecutionStatus::Failed => {
            eprintln!("{}", console.message().unwrap_or_default());
            Ok(ExitCode::FAILURE)
        }
        ExecutionStatus::Idle | ExecutionStatus::Running => Err(AtlasError::config(
            "Nothing to execute: the query is blank",
        )),
    }
}

fn print_rows(rows: &RowSet, empty_message: &str) {
    match TabularView::from_rows(rows) {
        Some(view) => print!("{}", view.to_plain_text()),
        None => println!("{empty_message}"),
    }
}
