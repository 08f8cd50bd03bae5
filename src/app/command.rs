//! Ex command line for tfm.
//!
//! `:` puts the state into [Mode::CommandLine]. Keys are collected into the
//! buffer until enter submits it. A submitted line is either one of the
//! built-in commands or a name from the `[commands]` config section, which is
//! expanded into a shell command and handed out as a [Task].

use crate::app::keymap::FileAction;
use crate::app::state::{AppState, Mode};
use crate::config::display::normalize_opacity;
use crate::core::proc::{INTERACTIVE_PROGRAMS, ShellOutput, shell_quote};
use crate::core::worker::Task;
use crate::error::Error;
use crate::utils::helpers::resolve_path;

use tracing::{debug, info};

use std::fs;
use std::path::Path;

const PLACEHOLDERS: &[&str] = &["{cwd}", "{file}", "{path}"];

/// Fills the placeholders of a custom command template.
///
/// `{cwd}`, `{file}` and `{path}` are replaced with shell quoted values. A
/// template without any placeholder gets the quoted `path` appended.
pub fn expand_template(template: &str, cwd: &Path, file: &str, path: &Path) -> String {
    let template = template.trim();
    let path_q = shell_quote(&path.to_string_lossy());
    if !PLACEHOLDERS.iter().any(|p| template.contains(p)) {
        return format!("{template} {path_q}");
    }
    template
        .replace("{cwd}", &shell_quote(&cwd.to_string_lossy()))
        .replace("{file}", &shell_quote(file))
        .replace("{path}", &path_q)
}

fn help_lines() -> Vec<String> {
    [
        "Ex commands:",
        ":help | :h | :?          show this help",
        ":q | :quit | :exit       quit",
        ":cd <path>               change directory",
        ":preview [on|off|toggle] control the preview column",
        ":copy                    copy the selected entry",
        ":paste                   paste into the current directory",
        ":copy-path               copy the full path of the selection",
        ":paste-path              go to the copied path",
        ":opacity [0..1|0..100]   show or set the background opacity",
        ":blur [on|off]           show or set the blur hint",
        "",
        "Custom commands go in [commands] in config.toml:",
        "  name = \"shell snippet\"",
        "Placeholders: {cwd} {file} {path}",
        "A leading '!' runs the command in the terminal.",
        "Example: open = \"xdg-open {path}\"",
        "",
        "Press any key to close",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl<'a> AppState<'a> {
    /// One key while the command line is open.
    pub(super) fn handle_command_key(&mut self, token: &str) -> Option<Task> {
        let Mode::CommandLine { buffer } = &mut self.mode else {
            return None;
        };
        match token {
            "esc" => {
                self.mode = Mode::Normal;
                None
            }
            "enter" => {
                let line = buffer.trim().to_string();
                self.mode = Mode::Normal;
                self.submit_command(&line)
            }
            "backspace" => {
                buffer.pop();
                None
            }
            "space" => {
                buffer.push(' ');
                None
            }
            t => {
                let mut chars = t.chars();
                if let (Some(c), None) = (chars.next(), chars.next()) {
                    buffer.push(c);
                }
                None
            }
        }
    }

    /// Runs one submitted command line.
    pub(super) fn submit_command(&mut self, line: &str) -> Option<Task> {
        let line = line.trim();
        let line = line.strip_prefix(':').unwrap_or(line).trim();
        if line.is_empty() {
            return None;
        }
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };
        let name = name.to_lowercase();
        debug!(command = %name, arg, "ex command");

        match name.as_str() {
            "help" | "h" | "?" => {
                self.show_help();
                None
            }
            "q" | "quit" | "exit" => {
                info!("quit requested");
                self.quit = true;
                None
            }
            "cd" => {
                self.change_dir(arg);
                None
            }
            "preview" => {
                match arg.to_lowercase().as_str() {
                    "" | "toggle" => self.set_preview(!self.show_preview),
                    "on" => self.set_preview(true),
                    "off" => self.set_preview(false),
                    _ => self.set_error(Error::Usage(":preview [on|off|toggle]".into())),
                }
                None
            }
            "opacity" => {
                self.set_opacity(arg);
                None
            }
            "blur" => {
                self.set_blur(arg);
                None
            }
            "copy" => self.handle_file_action(FileAction::Copy),
            "paste" => self.handle_file_action(FileAction::Paste),
            "copy-path" => self.handle_file_action(FileAction::CopyPath),
            "paste-path" => self.handle_file_action(FileAction::PastePath),
            _ => self.custom_command(&name),
        }
    }

    pub(super) fn show_help(&mut self) {
        let mut lines = help_lines();
        let names: Vec<&str> = self.config.commands().names().collect();
        if !names.is_empty() {
            lines.insert(lines.len() - 2, format!("Configured: {}", names.join(", ")));
        }
        self.show_modal("tfm help", lines);
    }

    fn change_dir(&mut self, arg: &str) {
        if arg.is_empty() {
            self.set_error(Error::Usage(":cd <path>".into()));
            return;
        }
        let base = self.focused_tab().panel().cwd().to_path_buf();
        let target = resolve_path(&base, arg);
        match fs::canonicalize(&target) {
            Ok(dir) => {
                self.chdir_focused(&dir, None);
            }
            Err(e) => self.set_error(Error::from_io(&target, e)),
        }
    }

    /// No argument shows the current value. Below 1.0 backgrounds are not drawn.
    fn set_opacity(&mut self, arg: &str) {
        if arg.is_empty() {
            let pct = format!("background_opacity = {:.0}%", self.background_opacity * 100.0);
            self.show_modal("Opacity", vec![pct]);
            return;
        }
        match arg.parse::<f64>() {
            Ok(value) if value.is_finite() => {
                self.background_opacity = normalize_opacity(value);
                debug!(opacity = self.background_opacity, "background opacity set");
                self.clear_error();
            }
            _ => self.set_error(Error::Usage(":opacity <0..1 | 0..100>".into())),
        }
    }

    fn set_blur(&mut self, arg: &str) {
        let on = match arg.to_lowercase().as_str() {
            "" => {
                let line = format!("blur = {} (requires terminal/compositor support)", self.blur);
                self.show_modal("Blur", vec![line]);
                return;
            }
            "on" | "1" | "true" | "yes" => true,
            "off" | "0" | "false" | "no" => false,
            _ => {
                self.set_error(Error::Usage(":blur on|off".into()));
                return;
            }
        };
        self.blur = on;
        self.clear_error();
    }

    fn custom_command(&mut self, name: &str) -> Option<Task> {
        let config = self.config;
        let Some(template) = config.commands().get(name) else {
            self.show_modal("Unknown command", vec![format!("Unknown: {name}")]);
            return None;
        };

        let tab = self.focused_tab();
        let cwd = tab.panel().cwd().to_path_buf();
        let (file, path) = match tab.selected_entry() {
            Some(entry) => (entry.name_str().into_owned(), tab.panel().join(entry)),
            None => (String::new(), cwd.clone()),
        };

        let template = template.trim();
        let (bang, template) = match template.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, template),
        };
        let command = expand_template(template, &cwd, &file, &path);
        let interactive = bang || INTERACTIVE_PROGRAMS.contains(&name);

        info!(name, %command, interactive, "custom command");
        if interactive {
            Some(Task::RunInteractive { command, cwd })
        } else {
            Some(Task::RunCommand { command, cwd })
        }
    }

    pub(super) fn on_command_finished(
        &mut self,
        command: &str,
        output: std::result::Result<ShellOutput, String>,
    ) {
        match output {
            Ok(out) => {
                debug!(command, success = out.success, "command finished");
                let title = if out.success {
                    "Command output"
                } else {
                    "Command error"
                };
                let lines = out
                    .text
                    .trim_end_matches('\n')
                    .split('\n')
                    .map(String::from)
                    .collect();
                self.show_modal(title, lines);
            }
            Err(e) => self.show_modal("Command error", vec![e]),
        }
    }

    /// The loop resumes after an interactive command whatever its exit status.
    pub(super) fn on_interactive_finished(
        &mut self,
        command: &str,
        result: std::result::Result<(), String>,
    ) {
        if let Err(e) = result {
            self.set_error(Error::Command(format!("{command}: {e}")));
        }
        let tab = self.focused_tab_mut();
        let refreshed = tab.panel_mut().refresh();
        tab.clamp_selection();
        if let Err(e) = refreshed {
            self.set_error(e);
        }
    }
}
