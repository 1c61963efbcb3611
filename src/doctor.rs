use crate::catalog::{CatalogClient, MediaKind};
use crate::config::Config;
use crate::streams::StreamClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckStatus {
    fn icon(self) -> &'static str {
        match self {
            CheckStatus::Ok => "✓",
            CheckStatus::Warning => "⚠",
            CheckStatus::Error => "✗",
        }
    }

    /// ANSI foreground colour
    fn color(self) -> &'static str {
        match self {
            CheckStatus::Ok => "\x1b[32m",
            CheckStatus::Warning => "\x1b[33m",
            CheckStatus::Error => "\x1b[31m",
        }
    }
}

/// Outcome of one doctor check
#[derive(Debug)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
}

impl CheckResult {
    fn new(name: &'static str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name,
            status,
            message: message.into(),
        }
    }

    /// One coloured report line, e.g. `  ✓ Player  mpv found at /usr/bin/mpv`
    pub fn line(&self) -> String {
        format!(
            "  {}{} {}{}  {}",
            self.status.color(),
            self.status.icon(),
            self.name,
            RESET,
            self.message
        )
    }
}

const RESET: &str = "\x1b[0m";

pub async fn run_checks(config: &Config) -> Vec<CheckResult> {
    vec![
        check_catalog(config).await,
        check_streams(config).await,
        check_credential(config),
        check_player(config),
    ]
}

async fn check_catalog(config: &Config) -> CheckResult {
    let client = CatalogClient::new(&config.catalog);

    match client.trending_titles(MediaKind::Movie).await {
        Ok(titles) if titles.is_empty() => CheckResult::new(
            "Catalog",
            CheckStatus::Warning,
            "Reachable but returned no trending titles",
        ),
        Ok(titles) => CheckResult::new(
            "Catalog",
            CheckStatus::Ok,
            format!("Connected, {} trending titles", titles.len()),
        ),
        Err(e) => CheckResult::new("Catalog", CheckStatus::Error, format!("Connection failed: {}", e)),
    }
}

async fn check_streams(config: &Config) -> CheckResult {
    let client = StreamClient::new(&config.streams);

    match client.check_manifest().await {
        Ok(()) => CheckResult::new(
            "Streams",
            CheckStatus::Ok,
            format!("Connected to {}", config.streams.url),
        ),
        Err(e) => CheckResult::new("Streams", CheckStatus::Error, format!("Connection failed: {}", e)),
    }
}

fn check_credential(config: &Config) -> CheckResult {
    let provider = config.streams.provider.key();

    match config.streams.apikey {
        Some(_) => CheckResult::new("Debrid", CheckStatus::Ok, format!("{} key configured", provider)),
        None => CheckResult::new(
            "Debrid",
            CheckStatus::Warning,
            format!("No apikey for {}. Only uncached sources will resolve.", provider),
        ),
    }
}

/// First word of the command template, the program the shell will run
fn player_program(command: &str) -> Option<&str> {
    command
        .split_whitespace()
        .next()
        .map(|p| p.trim_matches(|c| c == '"' || c == '\''))
}

fn check_player(config: &Config) -> CheckResult {
    let Some(program) = player_program(&config.player.command) else {
        return CheckResult::new("Player", CheckStatus::Error, "player.command is empty");
    };

    match which::which(program) {
        Ok(path) => CheckResult::new(
            "Player",
            CheckStatus::Ok,
            format!("{} found at {}", program, path.display()),
        ),
        Err(_) => CheckResult::new(
            "Player",
            CheckStatus::Error,
            format!("'{}' is not on PATH", program),
        ),
    }
}

/// Closing line of the report, judged by the worst status seen
fn summary(results: &[CheckResult]) -> String {
    let count = |status: CheckStatus| results.iter().filter(|r| r.status == status).count();
    let (errors, warnings) = (count(CheckStatus::Error), count(CheckStatus::Warning));

    match (errors, warnings) {
        (0, 0) => "All checks passed.".to_string(),
        (0, w) => format!("{} warning(s). Browsing works, some sources may not resolve.", w),
        (e, w) => format!("{} error(s), {} warning(s). Fix the errors before launching.", e, w),
    }
}

pub fn print_results(results: &[CheckResult]) {
    println!("\nstreampick doctor\n");
    for result in results {
        println!("{}", result.line());
    }
    println!("\n  {}\n", summary(results));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_program() {
        assert_eq!(player_program("mpv {}"), Some("mpv"));
        assert_eq!(player_program("  \"/usr/bin/vlc\" '{}'"), Some("/usr/bin/vlc"));
        assert_eq!(player_program("   "), None);
    }

    #[test]
    fn test_summary_reports_worst_status() {
        let ok = CheckResult::new("Catalog", CheckStatus::Ok, "fine");
        let warn = CheckResult::new("Debrid", CheckStatus::Warning, "no key");
        let err = CheckResult::new("Player", CheckStatus::Error, "missing");

        assert_eq!(summary(&[]), "All checks passed.");
        assert!(summary(&[ok]).starts_with("All checks passed"));
        assert!(summary(std::slice::from_ref(&warn)).starts_with("1 warning(s)"));
        assert!(summary(&[warn, err]).starts_with("1 error(s), 1 warning(s)"));
    }

    #[test]
    fn test_result_line_carries_icon_and_message() {
        let line = CheckResult::new("Player", CheckStatus::Error, "'mpv' is not on PATH").line();
        assert!(line.contains("✗ Player"));
        assert!(line.ends_with("'mpv' is not on PATH"));
    }

    #[test]
    fn test_credential_check() {
        let mut config = Config::default();
        assert_eq!(check_credential(&config).status, CheckStatus::Warning);

        config.streams.apikey = Some("key".to_string());
        assert_eq!(check_credential(&config).status, CheckStatus::Ok);
    }
}
