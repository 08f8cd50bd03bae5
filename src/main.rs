//! main.rs
//! Entry point for tfm

use tfm::app::AppState;
use tfm::config::Config;
use tfm::core::terminal;
use tfm::utils::cli::{handle_args, resolve_start};
use tfm::utils::logging;

use tracing::{error, info, warn};

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let mut stdout = std::io::stdout();
        let _ = crossterm::execute!(
            stdout,
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        );

        eprintln!("\n[tfm] Error occurred: {}", info);

        #[cfg(debug_assertions)]
        {
            let bt = std::backtrace::Backtrace::force_capture();
            eprintln!("\nStack Backtrace:\n{}", bt);
        }
    }));

    let Some(opts) = handle_args() else {
        return Ok(());
    };

    let (config, config_error) = Config::load(opts.config.as_deref());
    let level = opts
        .log_level
        .as_deref()
        .unwrap_or(config.general().log_level());
    let log_path = logging::init(level);
    if let Some(e) = config_error {
        warn!(error = %e, "config not loaded, using defaults");
    }

    let start = match resolve_start(opts.path.as_deref()) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("[tfm] Error: {e}");
            std::process::exit(1);
        }
    };
    info!(start = %start.display(), log = ?log_path, "tfm starting");

    let mut app = match AppState::new(&config, &start, config.general().show_hidden()) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "cannot open start directory");
            eprintln!("[tfm] Error: {e}");
            std::process::exit(1);
        }
    };

    let result = terminal::run_terminal(&mut app);
    info!("tfm exiting");
    result
}
