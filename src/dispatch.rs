use std::process::ExitStatus;

use thiserror::Error;
use tokio::process::Command;
use tracing::{error, info};

use crate::config::URL_PLACEHOLDER;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}")]
    Exit { command: String, status: ExitStatus },
}

/// Replace the first `{}` in `template` with `url`
pub fn format_command(template: &str, url: &str) -> String {
    template.replacen(URL_PLACEHOLDER, url, 1)
}

fn shell_command(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    }

    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}

/// Run the player command for `url` through the platform shell and wait for it.
///
/// The terminal is already restored at this point, so the player inherits stdio.
pub async fn run(template: &str, url: &str) -> Result<(), DispatchError> {
    let command = format_command(template, url);
    info!(command = %command, "dispatching");

    let status = shell_command(&command)
        .status()
        .await
        .map_err(|source| DispatchError::Spawn {
            command: command.clone(),
            source,
        })?;

    if !status.success() {
        return Err(DispatchError::Exit { command, status });
    }

    Ok(())
}

/// Best effort: failures are logged only, the launcher is already gone by now
pub async fn dispatch(template: &str, url: &str) {
    if let Err(e) = run(template, url).await {
        error!(error = %e, "dispatch failed");
    }
}
