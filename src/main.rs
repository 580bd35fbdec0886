use std::fs::File;

use showdeck::config::{self, Config};
use showdeck::tui;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Log to a file so output doesn't interfere with the TUI
    let log_file = File::create(std::env::temp_dir().join("showdeck.log")).ok();

    if let Some(file) = log_file {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_ansi(false)
            .with_writer(file)
            .init();
    } else {
        // Fallback to stderr if can't create log file
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_target(false)
            .init();
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            if let Ok(path) = Config::config_path() {
                eprintln!("\nConfig file: {}", path.display());
            }
            if let config::ConfigError::ValidationError(_) | config::ConfigError::ParseError(_) = &e {
                eprintln!("\nExample config.toml:");
                eprintln!(
                    r#"
startup_show_id = 82

[catalog]
base_url = "https://api.tvmaze.com"
"#
                );
            }
            std::process::exit(1);
        }
    };

    if let Err(e) = tui::run(config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
