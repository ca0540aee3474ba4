//! ssdl entrypoint: argument parsing, dependency checks, then the interactive session.
//!
//! The terminal is held by a [`TerminalRestoreGuard`] for the whole session, so every
//! exit path (normal return, error, panic, Ctrl+C) hands it back in cooked mode.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use crossbeam_channel::bounded;
use ssdl::config::{AppConfig, ConfigStore};
use ssdl::doctor::{base_doctor_report, check_dependencies, render_missing};
use ssdl::flow::{App, Collaborators, Outcome};
use ssdl::input::{spawn_input_thread, KeyDispatcher, INPUT_CHANNEL_CAPACITY};
use ssdl::render::{Palette, TerminalScreen};
use ssdl::screens::Ui;
use ssdl::telemetry::init_tracing;
use ssdl::terminal_restore::{clear_screen, install_terminal_panic_hook, TerminalRestoreGuard};
use ssdl::{init_logging, log_debug, log_file_path};
use std::env;
use std::ffi::OsString;
use std::process;

fn main() {
    let mut config = match parse_config(normalize_args(env::args_os())) {
        Ok(config) => config,
        Err(err) => fatal(&err),
    };
    if let Err(err) = config.validate() {
        fatal(&err);
    }

    init_logging(&config);
    init_tracing(&config);
    install_terminal_panic_hook();
    log_debug("=== ssdl started ===");
    log_debug(&format!("log file: {:?}", log_file_path()));

    if config.doctor {
        println!("{}", base_doctor_report(&config).render());
        return;
    }

    let palette = Palette::new(config.color_enabled());
    let missing = check_dependencies(&config.ytdlp_cmd, &config.ffmpeg_cmd);
    if !missing.is_empty() {
        log_debug(&format!("missing dependencies: {}", missing.len()));
        eprint!("{}", render_missing(&missing, &palette));
        process::exit(1);
    }

    match run_session(&config, palette) {
        Ok(outcome) => {
            if outcome == Outcome::Finished {
                clear_screen();
            }
            if let Some(farewell) = outcome.farewell() {
                println!("\n  {}\n", palette.paint(palette.accent, farewell));
            }
            log_debug(&format!("session ended: {outcome:?}"));
            process::exit(outcome.exit_code());
        }
        Err(err) => fatal(&err),
    }
}

/// clap only knows `-V`; keep the lowercase short flag working.
fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    args.into_iter()
        .map(|arg| if arg == "-v" { OsString::from("-V") } else { arg })
        .collect()
}

fn parse_config(args: Vec<OsString>) -> Result<AppConfig> {
    match AppConfig::try_parse_from(args) {
        Ok(config) => Ok(config),
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => Err(anyhow::anyhow!(err.render().to_string().trim().to_string())),
    }
}

fn run_session(config: &AppConfig, palette: Palette) -> Result<Outcome> {
    let store = ConfigStore::new(
        config
            .resolved_config_path()
            .context("failed to locate the settings file")?,
    );
    let user_config = store.load();

    let guard = TerminalRestoreGuard::acquire().context("failed to prepare the terminal")?;
    let (tx, rx) = bounded(INPUT_CHANNEL_CAPACITY);
    let _input_thread = spawn_input_thread(tx);
    let mut keys = KeyDispatcher::new(rx);
    let mut screen = TerminalScreen::stdout();

    let outcome = {
        let ui = Ui::new(&mut keys, &mut screen, palette);
        let mut app = App::new(
            ui,
            store,
            user_config,
            config.output_dir.clone(),
            Collaborators::production(config),
        );
        app.run(config.url.as_deref())
    };
    guard.restore();
    outcome
}

fn fatal(err: &anyhow::Error) -> ! {
    log_debug(&format!("fatal: {err:#}"));
    let palette = Palette::new(env::var_os("NO_COLOR").is_none());
    eprintln!(
        "\n  {}\n",
        palette.paint(palette.error, &format!("✗ Fatal error: {err:#}"))
    );
    process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn lowercase_v_becomes_version_flag() {
        assert_eq!(normalize_args(os(&["ssdl", "-v"])), os(&["ssdl", "-V"]));
        assert_eq!(
            normalize_args(os(&["ssdl", "spotify:track:abc", "--logs"])),
            os(&["ssdl", "spotify:track:abc", "--logs"])
        );
    }

    #[test]
    fn unknown_flag_is_an_error() {
        let err = parse_config(os(&["ssdl", "--bogus"])).unwrap_err();
        assert!(err.to_string().contains("--bogus"));
    }

    #[test]
    fn positional_url_is_parsed() {
        let config = parse_config(os(&["ssdl", "spotify:album:xyz"])).unwrap();
        assert_eq!(config.url.as_deref(), Some("spotify:album:xyz"));
    }
}
