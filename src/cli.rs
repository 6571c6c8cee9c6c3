//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// Privacy Shield - backend for the Privacy Shield browser extension
#[derive(Parser, Debug)]
#[command(name = "privacy-shield")]
#[command(version)]
#[command(about = "Tracker ingest, blocklist sync, dashboard statistics and AI security reports", long_about = None)]
pub struct Cli {
    /// Configuration file (default: config.toml if present)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Generate a sample configuration file
    ConfigGen {
        /// Output path (default: print to stdout)
        #[arg(long, short = 'o')]
        output: Option<String>,
    },
}

impl Cli {
    /// 未指定子命令时默认启动服务
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}
