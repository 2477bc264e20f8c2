mod actions;
mod app;
mod input;
mod view;

use anyhow::{Context, Result};
use app::{App, UiLocale};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyEventKind, MouseButton,
    MouseEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::execute;
use input::InputAction;
use molegrid_data::{apply_overrides, resolve_game_config, ConfigOverrides, LANG_ENV};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io::{self, stdout, IsTerminal};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub locale: Option<String>,
    pub config_path: Option<PathBuf>,
    pub grid_size: Option<usize>,
    pub seed: Option<u64>,
}

pub fn run(options: LaunchOptions) -> Result<()> {
    let config = resolve_game_config(options.config_path.as_deref())?;
    let config = apply_overrides(
        config,
        ConfigOverrides {
            grid_size: options.grid_size,
            seed: options.seed,
        },
    )?;
    let locale = UiLocale::from_opt(options.locale.as_deref());
    let mut app = App::bootstrap(locale, config);
    log::info!(
        "terminal ui starting: grid {} seed {} locale {}",
        app.grid_size(),
        app.store.seed(),
        app.locale.code()
    );

    ensure_interactive_terminal()?;

    enable_raw_mode().map_err(|err| {
        anyhow::anyhow!(
            "failed to enable raw mode; ensure the process owns an interactive terminal: {err}"
        )
    })?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let run_result = run_loop(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    run_result
}

pub fn run_with_args(args: &[String]) -> Result<()> {
    let options = parse_options(args);
    run(options)
}

fn parse_options(args: &[String]) -> LaunchOptions {
    let mut options = LaunchOptions {
        locale: std::env::var(LANG_ENV).ok(),
        ..LaunchOptions::default()
    };
    let mut idx = 0usize;
    while idx < args.len() {
        let value = args.get(idx + 1);
        match (args[idx].as_str(), value) {
            ("--lang" | "-l", Some(value)) => {
                options.locale = Some(value.clone());
                idx += 1;
            }
            ("--seed", Some(value)) => {
                options.seed = value.parse::<u64>().ok();
                idx += 1;
            }
            ("--grid" | "-g", Some(value)) => {
                options.grid_size = value.parse::<usize>().ok();
                idx += 1;
            }
            ("--config" | "-c", Some(value)) => {
                options.config_path = Some(PathBuf::from(value));
                idx += 1;
            }
            _ => {}
        }
        idx += 1;
    }
    options
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(120);
    while !app.should_quit {
        terminal.draw(|frame| view::draw(frame, app))?;
        let pending = if event::poll(tick_rate)? {
            Some(event::read()?)
        } else {
            None
        };
        let size = terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);
        step(app, pending, area, Instant::now());
    }
    Ok(())
}

/// Handles one terminal event, if any, then advances notice timers. Timers
/// tick on every iteration, input or not.
fn step(app: &mut App, pending: Option<CEvent>, area: Rect, now: Instant) {
    if let Some(pending) = pending {
        handle_event(app, pending, area);
    }
    app.on_tick(now);
}

fn handle_event(app: &mut App, pending: CEvent, area: Rect) {
    match pending {
        CEvent::Key(key) => {
            if key.kind != KeyEventKind::Press || app.handle_confirm_key(key) {
                return;
            }
            actions::dispatch(app, input::map_key(key));
        }
        CEvent::Mouse(mouse) => {
            if mouse.kind != MouseEventKind::Down(MouseButton::Left)
                || app.confirm_stop
                || app.show_help
            {
                return;
            }
            if let Some(index) = view::cell_at(area, app.grid_size(), mouse.column, mouse.row) {
                actions::dispatch(app, InputAction::ClickCell(index));
            }
        }
        _ => {}
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("leave alternate screen")?;
    terminal.show_cursor().context("show cursor")?;
    Ok(())
}

fn ensure_interactive_terminal() -> Result<()> {
    if io::stdin().is_terminal() && io::stdout().is_terminal() {
        return Ok(());
    }
    anyhow::bail!(
        "molegrid-cui requires an interactive TTY (run directly in a terminal, not a piped/headless shell)"
    );
}

#[cfg(test)]
mod tests {
    use super::{parse_options, step, App, UiLocale};
    use crossterm::event::{Event as CEvent, KeyModifiers, MouseEvent, MouseEventKind};
    use molegrid_core::GameConfig;
    use ratatui::layout::Rect;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_launch_flags() {
        let options = parse_options(&args(&[
            "--grid", "4", "--seed", "9", "--config", "game.json", "-l", "zh",
        ]));
        assert_eq!(options.grid_size, Some(4));
        assert_eq!(options.seed, Some(9));
        assert_eq!(options.config_path, Some(PathBuf::from("game.json")));
        assert_eq!(options.locale.as_deref(), Some("zh"));
    }

    #[test]
    fn ignores_dangling_and_bad_values() {
        let options = parse_options(&args(&["--seed", "abc", "--grid"]));
        assert_eq!(options.seed, None);
        assert_eq!(options.grid_size, None);
    }

    #[test]
    fn notices_expire_while_input_keeps_arriving() {
        let mut app = App::bootstrap(
            UiLocale::EnUs,
            GameConfig {
                seed: Some(2),
                notice_ms: 60_000,
                ..GameConfig::default()
            },
        );
        app.start();
        assert!(app.notices.current().is_some());
        let area = Rect::new(0, 0, 80, 24);
        let moved = || {
            Some(CEvent::Mouse(MouseEvent {
                kind: MouseEventKind::Moved,
                column: 3,
                row: 3,
                modifiers: KeyModifiers::NONE,
            }))
        };
        let start = Instant::now();
        step(&mut app, moved(), area, start);
        assert!(app.notices.current().is_some());
        step(&mut app, moved(), area, start + Duration::from_secs(120));
        assert!(app.notices.current().is_none());
    }
}
