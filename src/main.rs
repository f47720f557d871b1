//! Javalens CLI entry point.

use clap::Parser;
use javalens::cli::{self, Cli, Commands, EXIT_ERROR};
use javalens::config::LoggingConfig;
use javalens::logging;

fn main() {
    let cli = Cli::parse();
    javalens::init();

    let exit_code = match cli.command {
        Commands::Analyze(args) => match cli::load_config(&args) {
            Ok(config) => {
                if let Err(e) = logging::init(&config.logging) {
                    eprintln!("Warning: {:#}", e);
                }
                match cli::run_analyze(&args, &config) {
                    Ok(code) => code,
                    Err(e) => {
                        tracing::error!(error = %format!("{:#}", e), "analysis failed");
                        eprintln!("Error: {:#}", e);
                        EXIT_ERROR
                    }
                }
            }
            Err(e) => {
                eprintln!("Error: {:#}", e);
                EXIT_ERROR
            }
        },
        Commands::Init(args) => {
            let _ = logging::init(&LoggingConfig::default());
            match cli::run_init(&args) {
                Ok(code) => code,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    EXIT_ERROR
                }
            }
        }
    };

    std::process::exit(exit_code);
}
