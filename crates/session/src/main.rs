use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use geodraw_session_lib::channel::RemoteChannel;
use geodraw_session_lib::command::{execute_json, execute_json_batch, CommandResponse};
use geodraw_session_lib::render::LogSink;
use geodraw_session_lib::session::Session;
use geodraw_session_lib::state::SessionSettings;

type RemoteSession = Session<RemoteChannel, LogSink>;

/// Drive a geodraw session from JSON commands (stdin or a script file)
#[derive(Parser)]
#[command(name = "geodraw-session", version)]
struct Args {
    /// Settings file to use instead of the user config dir
    #[arg(long)]
    config: Option<PathBuf>,
    /// OBJ-style mesh to import before running commands
    #[arg(long)]
    object: Option<PathBuf>,
    /// JSON array of commands; stdin is read line by line otherwise
    #[arg(long)]
    script: Option<PathBuf>,
    /// Write the loaded settings to the user config dir
    #[arg(long)]
    save_config: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geodraw_session=info".into()),
        )
        .init();

    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => match SessionSettings::load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => SessionSettings::load(),
    };
    if args.save_config {
        settings.save();
    }
    let settings = settings.with_env_overrides();
    let settle = Duration::from_millis(settings.service.settle_millis);

    let channel = match RemoteChannel::connect(&settings.service) {
        Ok(channel) => channel,
        Err(e) => {
            tracing::error!("Failed to connect to {}: {e}", settings.service.base_url);
            return ExitCode::FAILURE;
        }
    };
    let mut session = Session::new(channel, LogSink::default(), settings);

    if let Some(path) = &args.object {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                if let Err(e) = session.import_object(&text) {
                    tracing::error!("Failed to import {}: {e}", path.display());
                }
            }
            Err(e) => tracing::error!("Failed to read {}: {e}", path.display()),
        }
    }

    let ok = match &args.script {
        Some(path) => run_script(&mut session, path),
        None => run_stdin(&mut session),
    };

    // Results of the last commands may still be in flight
    let messages = session.channel_mut().wait_inbound(settle);
    let applied = session.apply_inbound(messages);
    tracing::info!(
        "Done: {applied} late results, {} pixels, {} wireframe edges drawn, {} payloads ignored",
        session.sink().pixels_drawn,
        session.sink().edges_drawn,
        session.ignored_payloads()
    );
    for notice in session.take_notices() {
        tracing::info!("[{:?}] {}", notice.level, notice.text);
    }

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Execute a JSON array of commands from a file
fn run_script(session: &mut RemoteSession, path: &Path) -> bool {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to read script {}: {e}", path.display());
            return false;
        }
    };
    match execute_json_batch(session, &json) {
        Ok(responses) => {
            tracing::info!("Script {}: {} commands", path.display(), responses.len());
            responses.iter().for_each(print_response);
            session.pump();
            true
        }
        Err(e) => {
            tracing::error!("{e}");
            false
        }
    }
}

/// Execute one JSON command per stdin line
fn run_stdin(session: &mut RemoteSession) -> bool {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to read stdin: {e}");
                return false;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        session.pump();
        match execute_json(session, &line) {
            Ok(response) => print_response(&response),
            Err(e) => print_response(&CommandResponse {
                success: false,
                error: Some(e),
                data: None,
            }),
        }
    }
    true
}

fn print_response(response: &CommandResponse) {
    match serde_json::to_string(response) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("Failed to encode response: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let argv = ["geodraw-session", "--script", "cmds.json", "--save-config"];
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.script, Some(PathBuf::from("cmds.json")));
        assert!(args.save_config);
        assert!(args.config.is_none());
        assert!(args.object.is_none());

        assert!(Args::try_parse_from(["geodraw-session", "--bogus"]).is_err());
        assert!(Args::try_parse_from(["geodraw-session", "--config"]).is_err());
    }
}
