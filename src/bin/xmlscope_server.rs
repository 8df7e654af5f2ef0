use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use xmlscope::config::Settings;
use xmlscope::server::{handle_line, util::init_logging, ServerState};

/// Settings file from the first argument, else `XMLSCOPE_SETTINGS`
fn settings_path() -> Option<PathBuf> {
    std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("XMLSCOPE_SETTINGS"))
        .map(PathBuf::from)
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    match path {
        Some(path) if path.exists() => Settings::load(path),
        Some(path) => {
            tracing::info!(path = %path.display(), "settings file not found, using defaults");
            Ok(Settings::default())
        }
        None => Ok(Settings::default()),
    }
}

fn main() -> Result<()> {
    init_logging();
    tracing::info!("starting xmlscope server");

    let path = settings_path();
    let settings = load_settings(path.as_ref())?;
    let mut state = ServerState::new(settings, path);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::error!(error = %e, "error reading stdin");
                continue;
            }
        };

        let Some(response) = handle_line(&mut state, &line) else {
            continue;
        };
        let json = serde_json::to_string(&response).context("Failed to serialize response")?;
        writeln!(stdout, "{}", json).context("Failed to write response")?;
        stdout.flush()?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
