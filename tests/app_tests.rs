//! End-to-end tests for tfm
//!
//! These drive [AppState] the way the terminal loop does: key tokens in,
//! tasks out to real worker threads, their messages back in. Rendering is
//! checked on the resulting [Screen].
//!
//! Every test works in its own temporary directory.

use tfm::app::{AppState, Focus, Mode, RightMode};
use tfm::config::Config;
use tfm::core::{Message, Task, Workers};
use tfm::ui::render;

use std::error;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::{TempDir, tempdir};

const WAIT: Duration = Duration::from_secs(5);

/// Adir/ Bdir/ z.txt and a hidden file.
fn tree() -> Result<TempDir, Box<dyn error::Error>> {
    let dir = tempdir()?;
    fs::create_dir(dir.path().join("Adir"))?;
    fs::create_dir(dir.path().join("Bdir"))?;
    fs::write(dir.path().join("Bdir/inside.txt"), "inside")?;
    fs::write(dir.path().join("z.txt"), "hello")?;
    fs::write(dir.path().join(".hidden"), "")?;
    Ok(dir)
}

fn names(app: &AppState) -> Vec<String> {
    app.focused_tab()
        .panel()
        .entries()
        .iter()
        .map(|e| e.display_name())
        .collect()
}

fn press(app: &mut AppState, token: &str) -> Option<Task> {
    app.handle(Message::Key(token.to_string()))
}

/// Sends `task` through the workers and feeds the single answer back.
fn run_through(
    app: &mut AppState,
    workers: &Workers,
    task: Task,
) -> Result<Option<Task>, Box<dyn error::Error>> {
    workers.submit(task).map_err(|t| format!("refused: {t:?}"))?;
    let msg = workers.response_rx().recv_timeout(WAIT)?;
    Ok(app.handle(msg))
}

#[test]
fn listing_is_sorted_and_hidden_toggles() -> Result<(), Box<dyn error::Error>> {
    let dir = tree()?;
    let config = Config::default();
    let mut app = AppState::new(&config, dir.path(), false)?;

    assert_eq!(names(&app), ["Adir/", "Bdir/", "z.txt"]);

    press(&mut app, ".");
    assert_eq!(names(&app), ["Adir/", "Bdir/", ".hidden", "z.txt"]);
    press(&mut app, ".");
    assert_eq!(names(&app), ["Adir/", "Bdir/", "z.txt"]);
    Ok(())
}

#[test]
fn prefetch_round_trip_feeds_the_cache() -> Result<(), Box<dyn error::Error>> {
    let dir = tree()?;
    let config = Config::parse("[display]\npreview = false")?;
    let mut app = AppState::new(&config, dir.path(), false)?;
    let workers = Workers::spawn();
    let bdir = dir.path().join("Bdir");

    let task = press(&mut app, "j").ok_or("expected a prefetch")?;
    assert_eq!(
        task,
        Task::Prefetch {
            path: bdir.clone(),
            show_hidden: false
        }
    );
    assert!(app.is_in_flight(&bdir));

    // moving away and back does not ask again while the read is pending
    assert_eq!(
        press(&mut app, "k"),
        Some(Task::Prefetch {
            path: dir.path().join("Adir"),
            show_hidden: false
        })
    );
    assert_eq!(press(&mut app, "j"), None);

    assert_eq!(run_through(&mut app, &workers, task)?, None);
    assert!(!app.is_in_flight(&bdir));
    assert!(app.dir_cache().has(&bdir));

    press(&mut app, "l");
    assert_eq!(app.focused_tab().panel().cwd(), bdir.as_path());
    assert_eq!(names(&app), ["inside.txt"]);
    Ok(())
}

#[test]
fn chord_timer_resolves_the_shorter_binding() -> Result<(), Box<dyn error::Error>> {
    let dir = tree()?;
    let config = Config::parse("[display]\npreview = false\n\n[keys]\n\"g\" = \"bottom\"")?;
    let mut app = AppState::new(&config, dir.path(), false)?;
    let workers = Workers::spawn();

    // "gg" still wins when typed quickly
    press(&mut app, "G");
    assert!(matches!(press(&mut app, "g"), Some(Task::ChordTimeout { .. })));
    press(&mut app, "g");
    assert_eq!(app.focused_tab().selected(), 0);

    // a lone "g" waits for the timer
    let task = press(&mut app, "g").ok_or("expected a timer")?;
    assert_eq!(app.focused_tab().selected(), 0);
    run_through(&mut app, &workers, task)?;
    assert_eq!(app.focused_tab().selected(), 2);
    Ok(())
}

#[test]
fn custom_command_output_lands_in_a_modal() -> Result<(), Box<dyn error::Error>> {
    let dir = tree()?;
    let config = Config::parse("[display]\npreview = false\n\n[commands]\ncount = \"wc -c\"")?;
    let mut app = AppState::new(&config, dir.path(), false)?;
    let workers = Workers::spawn();

    press(&mut app, "G");
    press(&mut app, ":");
    for c in "count".chars() {
        press(&mut app, &c.to_string());
    }
    let task = press(&mut app, "enter").ok_or("expected a command")?;
    let Task::RunCommand { command, cwd } = &task else {
        return Err(format!("unexpected task {task:?}").into());
    };
    assert!(command.starts_with("wc -c '"));
    assert!(command.ends_with("z.txt'"));
    assert_eq!(cwd.as_path(), dir.path());

    run_through(&mut app, &workers, task)?;
    let Mode::Modal { title, lines } = app.mode() else {
        return Err("expected the output modal".into());
    };
    assert_eq!(title, "Command output");
    assert!(lines.iter().any(|l| l.trim_start().starts_with('5')));

    // any key closes it
    press(&mut app, "x");
    assert_eq!(app.mode(), &Mode::Normal);
    Ok(())
}

#[test]
fn interactive_commands_are_refused_by_workers() -> Result<(), Box<dyn error::Error>> {
    let dir = tree()?;
    let config = Config::parse("[display]\npreview = false\n\n[commands]\nedit = \"!vi {path}\"")?;
    let mut app = AppState::new(&config, dir.path(), false)?;
    let workers = Workers::spawn();

    press(&mut app, ":");
    for c in "edit".chars() {
        press(&mut app, &c.to_string());
    }
    let task = press(&mut app, "enter").ok_or("expected a command")?;
    assert!(matches!(task, Task::RunInteractive { .. }));
    assert!(workers.submit(task).is_err());
    Ok(())
}

#[test]
fn screen_matches_viewport_in_every_layout() -> Result<(), Box<dyn error::Error>> {
    let dir = tree()?;
    let config = Config::parse("[general]\nopen_dirs_right = true")?;
    let mut app = AppState::new(&config, dir.path(), false)?;

    let check = |app: &AppState, w: usize, h: usize| -> Result<(), Box<dyn error::Error>> {
        let screen = render(app);
        assert_eq!(screen.rows.len(), h);
        for y in 0..h {
            assert_eq!(
                unicode_width::UnicodeWidthStr::width(screen.line(y).as_str()),
                w,
                "row {y} at {w}x{h}"
            );
        }
        Ok(())
    };

    for (w, h) in [(80u16, 24u16), (30, 6), (120, 3)] {
        app.handle(Message::Resize { width: w, height: h });
        check(&app, w as usize, h as usize)?;
    }

    // left panel plus one right column
    app.handle(Message::Resize { width: 90, height: 12 });
    press(&mut app, "j");
    press(&mut app, "l");
    assert_eq!(app.right_mode(), RightMode::Panel);
    assert_eq!(app.focus(), Focus::Right);
    assert_eq!(app.right_columns().len(), 1);
    check(&app, 90, 12)?;

    let header = render(&app).line(0);
    assert!(header.starts_with("tfm | tab 1/1"));
    Ok(())
}

#[test]
fn resolve_start_and_state_agree_on_path() -> Result<(), Box<dyn error::Error>> {
    let dir = tree()?;
    let arg = dir.path().join("Adir").to_string_lossy().into_owned();
    let start = tfm::utils::cli::resolve_start(Some(&arg))?;
    let config = Config::default();
    let app = AppState::new(&config, &start, false)?;
    assert_eq!(app.focused_tab().panel().cwd(), start.as_path());
    assert!(app.focused_tab().panel().is_empty());
    assert!(Path::new(&arg).ends_with("Adir"));
    Ok(())
}
