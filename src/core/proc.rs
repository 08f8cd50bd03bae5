//! The tfm processes module.
//!
//! Runs user-defined commands through `sh -c`. Captured commands are executed
//! on the job worker and their combined output is shown in a modal; interactive
//! ones are run by the terminal loop with the screen handed over to the child.

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

/// Commands that always need the terminal, even without a leading `!`.
pub const INTERACTIVE_PROGRAMS: &[&str] = &["nano", "vim", "nvim", "vi", "less", "more", "micro"];

/// Single-quotes `s` so `sh -c` sees it as one word.
pub fn shell_quote(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Output of a captured shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellOutput {
    pub success: bool,
    pub text: String,
}

/// Runs `command` with `sh -c` in `cwd` and collects stdout followed by stderr.
///
/// Only a failure to spawn is an error; a non-zero exit is reported through
/// [ShellOutput::success].
pub fn run_captured(command: &str, cwd: &Path) -> io::Result<ShellOutput> {
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok(ShellOutput {
        success: output.status.success(),
        text,
    })
}

/// Runs `command` attached to the current TTY and waits for it.
pub fn run_attached(command: &str, cwd: &Path) -> io::Result<ExitStatus> {
    Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .status()
}
