use std::fs::File;

use streampick::catalog::MediaKind;
use streampick::config::{self, Config};
use streampick::{dispatch, doctor, tui};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: streampick [movie|series|doctor]";

#[tokio::main]
async fn main() {
    // Log to a file so the TUI is not interfered with
    let log_path = std::env::temp_dir().join("streampick.log");
    let log_file = File::create(&log_path).ok();

    if let Some(file) = log_file {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with_target(false)
            .with_ansi(false)
            .with_writer(file)
            .init();
    } else {
        // Fallback to stderr if can't create log file
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
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
[streams]
provider = "realdebrid"
apikey = "your-api-key"

[player]
command = "mpv '{{}}'"
"#
                );
            }
            std::process::exit(1);
        }
    };

    let arg = std::env::args().nth(1);
    let kind = match arg.as_deref() {
        None => MediaKind::Movie,
        Some("doctor") => {
            let results = doctor::run_checks(&config).await;
            doctor::print_results(&results);
            return;
        }
        Some("-h" | "--help") => {
            println!("{}", USAGE);
            return;
        }
        Some(other) => match MediaKind::parse(other) {
            Some(kind) => kind,
            None => {
                eprintln!("{}", USAGE);
                std::process::exit(2);
            }
        },
    };

    match tui::run(&config, kind).await {
        Ok(Some(url)) => dispatch::dispatch(&config.player.command, &url).await,
        Ok(None) => info!("closed without choosing a source"),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
