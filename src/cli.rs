//! Command-line argument parsing for Atlas.
//!
//! Without a mode flag Atlas starts the terminal UI; the mode flags run a
//! single operation against the data service and print the result.

use db_atlas::config::Config;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// What the binary should do once started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Interactive terminal UI.
    Interactive,
    /// Print the database names.
    ListDatabases,
    /// Print the tables of a database.
    ListTables(String),
    /// Print the preview of a table.
    Preview { database: String, table: String },
    /// Run a query, optionally inside a database.
    Execute {
        query: String,
        database: Option<String>,
    },
    /// Check service health.
    Check,
}

/// A terminal client for browsing databases and running ad-hoc queries.
#[derive(Parser, Debug)]
#[command(name = "atlas")]
#[command(version, about, long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .args(["list", "tables", "preview", "execute", "check"])
        .multiple(false)
))]
pub struct Cli {
    /// Base URL of the data service (e.g., http://localhost:8000)
    #[arg(short = 'u', long, value_name = "URL", env = "ATLAS_GATEWAY_URL")]
    pub url: Option<String>,

    /// Request timeout in seconds
    #[arg(short = 't', long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use the built-in demo catalog instead of a data service
    #[arg(long)]
    pub mock: bool,

    /// Print the database names and exit
    #[arg(short = 'l', long)]
    pub list: bool,

    /// Print the tables of a database and exit
    #[arg(long, value_name = "DATABASE")]
    pub tables: Option<String>,

    /// Print the preview rows of a table and exit
    #[arg(long, value_name = "DATABASE.TABLE")]
    pub preview: Option<String>,

    /// Execute a query, print its result and exit
    #[arg(short = 'e', long, value_name = "QUERY")]
    pub execute: Option<String>,

    /// Database to run --execute in
    #[arg(short = 'd', long, value_name = "DATABASE", requires = "execute")]
    pub database: Option<String>,

    /// Check data service health and exit
    #[arg(long)]
    pub check: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Resolves the requested mode.
    pub fn mode(&self) -> Result<Mode, String> {
        if self.list {
            return Ok(Mode::ListDatabases);
        }
        if let Some(database) = &self.tables {
            return Ok(Mode::ListTables(database.clone()));
        }
        if let Some(target) = &self.preview {
            let (database, table) = parse_table_ref(target)?;
            return Ok(Mode::Preview { database, table });
        }
        if let Some(query) = &self.execute {
            return Ok(Mode::Execute {
                query: query.clone(),
                database: self.database.clone(),
            });
        }
        if self.check {
            return Ok(Mode::Check);
        }
        Ok(Mode::Interactive)
    }
}

/// Splits `database.table` at the first dot.
fn parse_table_ref(target: &str) -> Result<(String, String), String> {
    match target.split_once('.') {
        Some((database, table)) if !database.is_empty() && !table.is_empty() => {
            Ok((database.to_string(), table.to_string()))
        }
        _ => Err(format!(
            "Invalid table reference: '{target}'. Expected DATABASE.TABLE"
        )),
    }
}
