//! Terminal setup and event loop for tfm.
//!
//! Handles setup/teardown of raw mode and the alternate screen, turns crossterm
//! events into [Message]s for the app state, runs the tasks it hands back and
//! redraws after every change.

use crate::app::AppState;
use crate::core::proc::run_attached;
use crate::core::worker::{Message, Task, Workers};
use crate::ui::{self, ImagePlacement, draw::Appearance};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};

use std::io::{self, Stdout, Write};
use std::time::Duration;

type Term = Terminal<CrosstermBackend<Stdout>>;

const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Converts a key press into the token the keymap and command line expect.
///
/// Plain characters are themselves (space is `space`), control and alt
/// combinations are `ctrl+x` and `alt+x`. Keys tfm has no name for give `None`.
pub fn key_token(key: KeyEvent) -> Option<String> {
    let token = match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            format!("ctrl+{}", c.to_ascii_lowercase())
        }
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::ALT) => format!("alt+{c}"),
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::BackTab => "shift+tab".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::PageUp => "pgup".to_string(),
        KeyCode::PageDown => "pgdown".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::F(n) => format!("f{n}"),
        _ => return None,
    };
    Some(token)
}

/// Initializes the terminal in raw mode and alternate screen and runs the main event loop.
///
/// Blocks until quit. Returns an io::Error if terminal setup or teardown fails.
pub fn run_terminal(app: &mut AppState) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let workers = Workers::spawn();
    let result = event_loop(&mut terminal, app, &workers);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)?;
    info!("terminal restored");
    result
}

fn event_loop(terminal: &mut Term, app: &mut AppState, workers: &Workers) -> io::Result<()> {
    let size = terminal.size()?;
    let mut pending = app.handle(Message::Resize {
        width: size.width,
        height: size.height,
    });
    let mut last_images: Vec<ImagePlacement> = Vec::new();
    let mut dirty = true;

    loop {
        while let Some(task) = pending.take() {
            pending = run_task(terminal, app, workers, task)?;
            dirty = true;
        }
        if app.is_quitting() {
            break;
        }

        // worker results
        for msg in workers.response_rx().try_iter() {
            if let Some(task) = app.handle(msg) {
                pending = Some(task);
                break;
            }
            dirty = true;
        }
        if pending.is_some() {
            continue;
        }

        if dirty {
            draw(terminal, app, &mut last_images)?;
            dirty = false;
        }

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let msg = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => key_token(key).map(Message::Key),
            Event::Resize(width, height) => Some(Message::Resize { width, height }),
            _ => None,
        };
        if let Some(msg) = msg {
            pending = app.handle(msg);
            dirty = true;
        }
    }
    Ok(())
}

/// Draws the frame, then writes inline images over their blank areas.
fn draw(terminal: &mut Term, app: &AppState, last_images: &mut Vec<ImagePlacement>) -> io::Result<()> {
    let screen = ui::render(app);
    if screen.images != *last_images {
        // old image pixels are not tracked by the cell buffer
        terminal.clear()?;
    }
    let theme = app.config().theme();
    let look = Appearance::of(app);
    terminal.draw(|f| ui::draw::draw(f, &screen, theme, look))?;

    if screen.images != *last_images {
        let out = terminal.backend_mut();
        for img in &screen.images {
            queue!(out, MoveTo(img.x as u16, img.y as u16), Print(&img.sequence))?;
        }
        out.flush()?;
        *last_images = screen.images;
    }
    Ok(())
}

/// Hands `task` to the workers. Interactive commands come back and are run
/// here with the terminal released; their completion is fed to the state.
fn run_task(
    terminal: &mut Term,
    app: &mut AppState,
    workers: &Workers,
    task: Task,
) -> io::Result<Option<Task>> {
    match workers.submit(task) {
        Ok(()) => Ok(None),
        Err(Task::RunInteractive { command, cwd }) => {
            info!(%command, "running interactive command");
            disable_raw_mode()?;
            execute!(terminal.backend_mut(), LeaveAlternateScreen, Show)?;

            let result = match run_attached(&command, &cwd) {
                Ok(status) if status.success() => Ok(()),
                Ok(status) => Err(status.to_string()),
                Err(e) => Err(e.to_string()),
            };

            enable_raw_mode()?;
            execute!(terminal.backend_mut(), EnterAlternateScreen, Hide)?;
            terminal.clear()?;
            Ok(app.handle(Message::InteractiveFinished { command, result }))
        }
        Err(task) => {
            warn!(?task, "worker channel closed, task dropped");
            Ok(None)
        }
    }
}
