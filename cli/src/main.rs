//! whorl CLI - Binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI bridges [`whorl_engine`] (enrollment state) and [`whorl_tui`] (rendering),
//! providing RAII-based terminal management with guaranteed cleanup.
//!
//! ```text
//! main() -> TerminalSession::new() -> run_app() -> App + TUI
//!                                        |
//!                                        v
//!                              SessionExit reports -> log / stdout
//! ```
//!
//! # Event Loop
//!
//! A fixed 8ms (~120 FPS) render cadence:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`whorl_tui::InputPump`])
//! 3. Advance application state (`app.tick()`)
//! 4. Apply finished captures
//! 5. Report dialog exits
//! 6. Render frame

mod crash_hardening;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    fs::{self, OpenOptions},
    io::{Stdout, Write, stdout},
    path::PathBuf,
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use whorl_engine::{App, SessionExit, WhorlConfig};
use whorl_tui::{InputPump, draw, handle_events};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than write over the TUI.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.whorl/logs/whorl.log
    if let Some(config_path) = WhorlConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("whorl.log"));
    }

    // Fallback: ./.whorl/logs/whorl.log
    candidates.push(PathBuf::from(".whorl").join("logs").join("whorl.log"));

    candidates
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Raw mode and the alternate screen are restored on drop, so the terminal
/// stays usable after panics or early returns.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }

        match Terminal::new(CrosstermBackend::new(out)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen);
                Err(err.into())
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

fn load_config() -> Option<WhorlConfig> {
    match WhorlConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %err.path().display(), "Ignoring config: {err}");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    if let Err(err) = crash_hardening::apply() {
        tracing::warn!("{err:#}");
    }

    let config = load_config();
    let mut app = App::from_config(config.as_ref());

    let run_result = {
        let mut session = TerminalSession::new()?;
        run_app(&mut session.terminal, &mut app).await
    };

    app.shutdown();

    if let Err(err) = run_result {
        eprintln!("Error: {err:?}");
    }

    if let Some(enrolled) = app.last_finished() {
        let mut out = stdout().lock();
        for id in enrolled {
            writeln!(out, "{id}")?;
        }
    }

    Ok(())
}

const FRAME_DURATION: Duration = Duration::from_millis(8);

async fn run_app<B>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut input = InputPump::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: Result<()> = loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        let quit_now = match handle_events(app, &mut input) {
            Ok(q) => q,
            Err(e) => break Err(e),
        };
        if quit_now {
            break Ok(());
        }

        app.tick();
        app.process_capture_events();
        report_exits(app);

        if let Err(e) = terminal.draw(|frame| draw(frame, app)) {
            break Err(e.into());
        }
    };

    // The event that ended the loop may have queued an exit.
    report_exits(app);
    input.shutdown().await;
    result
}

/// Log every queued dialog exit. Returns how many were reported.
fn report_exits(app: &mut App) -> usize {
    let mut reported = 0;
    while let Some(exit) = app.take_exit() {
        reported += 1;
        match exit {
            SessionExit::Cancelled => tracing::info!("Enrollment dialog cancelled"),
            SessionExit::Finished { enrolled } => {
                tracing::info!(count = enrolled.len(), "Enrollment session saved");
            }
        }
    }
    reported
}

#[cfg(test)]
mod tests {
    use whorl_engine::App;

    use super::report_exits;

    #[test]
    fn quitting_from_an_open_dialog_reports_the_cancel() {
        let mut app = App::from_config(None);
        app.open_modal();

        // Ctrl+C path: close the dialog, then the loop stops.
        app.close_modal();
        app.request_quit();

        assert!(!app.is_modal_open());
        assert_eq!(report_exits(&mut app), 1);
        assert_eq!(report_exits(&mut app), 0);
    }
}
