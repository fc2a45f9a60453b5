use super::Overrides;
use crate::core::report::{ReportFormat, ReportKind};
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "small-theater")]
#[command(about = "Room scheduling and ticket sales for a small theater")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    /// PostgreSQL URL; the in-memory store is used when none is configured
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve the HTTP API (default)
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print an admin listing with derived figures
    Report {
        #[arg(value_parser = parse_kind)]
        kind: ReportKind,
        #[arg(long, default_value = "csv", value_parser = parse_format)]
        format: ReportFormat,
    },
    /// Delete a room together with its movies and tickets
    RemoveRoom { id: i64 },
}

fn parse_kind(s: &str) -> Result<ReportKind, String> {
    s.parse()
}

fn parse_format(s: &str) -> Result<ReportFormat, String> {
    s.parse()
}

impl CliConfig {
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Serve { bind: None })
    }

    pub fn overrides(&self) -> Overrides {
        let bind = match &self.command {
            Some(Command::Serve { bind }) => bind.clone(),
            _ => None,
        };
        Overrides {
            bind,
            database_url: self.database_url.clone(),
            json_logs: self.json_logs,
        }
    }
}
