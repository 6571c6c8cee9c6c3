use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;

use privacy_shield::cli::{Cli, Commands};
use privacy_shield::config::AppConfig;
use privacy_shield::errors::PrivacyShieldError;
use privacy_shield::runtime::modes::run_server;
use privacy_shield::system::init_logging;

fn fail(message: impl std::fmt::Display) -> ExitCode {
    eprintln!("{} {}", "[ERROR]".red().bold(), message);
    ExitCode::FAILURE
}

#[actix_web::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command() {
        Commands::ConfigGen { output } => match output {
            Some(path) => match AppConfig::default().save_to_file(&path) {
                Ok(()) => {
                    println!("{} Sample configuration written to {}", "✓".green(), path);
                    ExitCode::SUCCESS
                }
                Err(e) => fail(format!("{:#}", e)),
            },
            None => {
                println!("{}", AppConfig::generate_sample_config());
                ExitCode::SUCCESS
            }
        },
        Commands::Serve => {
            let config = match AppConfig::load(cli.config.as_deref()) {
                Ok(config) => config,
                Err(e) => return fail(format!("Failed to load configuration: {:#}", e)),
            };

            let _guard = match init_logging(&config.logging) {
                Ok(guard) => guard,
                Err(e) => return fail(format!("{:#}", e)),
            };

            match run_server(config).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => match e.downcast_ref::<PrivacyShieldError>() {
                    Some(err) => {
                        eprintln!("{}", err.format_colored());
                        ExitCode::FAILURE
                    }
                    None => fail(format!("{:#}", e)),
                },
            }
        }
    }
}
