//! Interactive line input with history and tab completion.
//!
//! A crossterm-based replacement for raw `stdin.read_line()`:
//! - Up/Down arrow history navigation with draft preservation
//! - Tab completion for command names and tree-declared arguments,
//!   extending the typed token to the longest common prefix and listing
//!   the alternatives when more than one remains
//! - Ctrl-C clears the line (with a quit hint), Ctrl-D on an empty line
//!   signals EOF
//! - Persistent history at `.treeline/history`

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use treeline_core::{CommandRegistry, ShellConfig, longest_common_prefix};

/// Persistent command history with arrow-key recall.
///
/// Recall state is modeled explicitly: the editor is either live (typing
/// a fresh line) or browsing at some position with the fresh line parked
/// as a draft. Policy knobs (capacity, duplicate folding) come from
/// [`ShellConfig`].
pub struct InputHistory {
    entries: VecDeque<String>,
    browse: Browse,
    file_path: PathBuf,
    max_entries: usize,
    dedup: bool,
}

enum Browse {
    /// Typing a fresh line.
    Live,
    /// Browsing saved entries, with the fresh line parked as `draft`.
    At { pos: usize, draft: String },
}

impl InputHistory {
    /// Load the history file from the workspace, applying config policy.
    pub fn new(workspace: &Path, config: &ShellConfig) -> Self {
        let file_path = workspace.join(".treeline").join("history");
        let entries = std::fs::read_to_string(&file_path)
            .unwrap_or_default()
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            entries,
            browse: Browse::Live,
            file_path,
            max_entries: config.max_history,
            dedup: config.history_dedup,
        }
    }

    /// Record an executed line and persist the file.
    pub fn push(&mut self, entry: &str) {
        let entry = entry.trim();
        if entry.is_empty() {
            return;
        }
        if self.dedup && self.entries.back().is_some_and(|last| last == entry) {
            self.reset_browsing();
            return;
        }
        self.entries.push_back(entry.to_string());
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
        self.persist();
        self.reset_browsing();
    }

    fn persist(&self) {
        if let Some(parent) = self.file_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let mut content = String::new();
        for entry in &self.entries {
            content.push_str(entry);
            content.push('\n');
        }
        let _ = std::fs::write(&self.file_path, content);
    }

    /// Step towards older entries, parking the in-progress line first.
    /// The oldest entry is sticky; stepping past it stays put.
    fn older(&mut self, current: &str) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let (pos, draft) = match std::mem::replace(&mut self.browse, Browse::Live) {
            Browse::Live => (self.entries.len() - 1, current.to_string()),
            Browse::At { pos, draft } => (pos.saturating_sub(1), draft),
        };
        self.browse = Browse::At { pos, draft };
        Some(self.entries[pos].clone())
    }

    /// Step back towards the present; past the newest entry the parked
    /// draft comes back and browsing ends.
    fn newer(&mut self) -> Option<String> {
        let Browse::At { pos, draft } = std::mem::replace(&mut self.browse, Browse::Live) else {
            return None;
        };
        if pos + 1 < self.entries.len() {
            self.browse = Browse::At {
                pos: pos + 1,
                draft,
            };
            Some(self.entries[pos + 1].clone())
        } else {
            Some(draft)
        }
    }

    fn reset_browsing(&mut self) {
        self.browse = Browse::Live;
    }

    #[cfg(test)]
    fn entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}

/// Interactive line editor bound to a workspace history file.
pub struct LineEditor {
    history: InputHistory,
    prompt: String,
    color: bool,
}

impl LineEditor {
    pub fn new(workspace: &Path, config: &ShellConfig) -> Self {
        Self {
            history: InputHistory::new(workspace, config),
            prompt: config.prompt.clone(),
            color: config.color,
        }
    }

    /// Read one line. Returns `None` on Ctrl-D with an empty buffer (EOF).
    /// Enables raw mode for the duration, restores it on return.
    pub fn read_line(&mut self, registry: &CommandRegistry) -> io::Result<Option<String>> {
        self.print_prompt()?;

        terminal::enable_raw_mode()?;
        let result = self.read_line_raw(registry);
        terminal::disable_raw_mode()?;

        print!("\r\n");
        io::stdout().flush()?;
        result
    }

    fn print_prompt(&self) -> io::Result<()> {
        if self.color {
            print!("\x1b[32m{}\x1b[0m", self.prompt);
        } else {
            print!("{}", self.prompt);
        }
        io::stdout().flush()
    }

    fn read_line_raw(&mut self, registry: &CommandRegistry) -> io::Result<Option<String>> {
        let mut buffer = String::new();
        let mut cursor_pos: usize = 0; // byte offset, always a char boundary

        loop {
            if !event::poll(Duration::from_millis(100))? {
                continue;
            }

            let evt = event::read()?;
            let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = evt
            else {
                continue;
            };
            if kind != KeyEventKind::Press {
                continue;
            }

            match (code, modifiers) {
                // Ctrl-C: clear the line and hint at the exit paths.
                (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                    print!("\r\n\x1b[33mUse 'exit' or Ctrl+D to quit\x1b[0m");
                    io::stdout().flush()?;
                    return Ok(Some(String::new()));
                }
                // Ctrl-D on empty line: EOF
                (KeyCode::Char('d'), KeyModifiers::CONTROL) => {
                    if buffer.is_empty() {
                        return Ok(None);
                    }
                }
                (KeyCode::Tab, _) => {
                    self.complete(&mut buffer, &mut cursor_pos, registry)?;
                }
                (KeyCode::Enter, _) => {
                    let line = buffer.trim().to_string();
                    if !line.is_empty() {
                        self.history.push(&line);
                    }
                    return Ok(Some(line));
                }
                (KeyCode::Up, _) => {
                    if let Some(entry) = self.history.older(&buffer) {
                        buffer = entry;
                        cursor_pos = buffer.len();
                        self.redraw(&buffer, cursor_pos)?;
                    }
                }
                (KeyCode::Down, _) => {
                    if let Some(entry) = self.history.newer() {
                        buffer = entry;
                        cursor_pos = buffer.len();
                        self.redraw(&buffer, cursor_pos)?;
                    }
                }
                (KeyCode::Left, _) => {
                    if let Some(c) = buffer[..cursor_pos].chars().next_back() {
                        cursor_pos -= c.len_utf8();
                        self.redraw(&buffer, cursor_pos)?;
                    }
                }
                (KeyCode::Right, _) => {
                    if let Some(c) = buffer[cursor_pos..].chars().next() {
                        cursor_pos += c.len_utf8();
                        self.redraw(&buffer, cursor_pos)?;
                    }
                }
                (KeyCode::Home, _) => {
                    cursor_pos = 0;
                    self.redraw(&buffer, cursor_pos)?;
                }
                (KeyCode::End, _) => {
                    cursor_pos = buffer.len();
                    self.redraw(&buffer, cursor_pos)?;
                }
                (KeyCode::Backspace, _) => {
                    if let Some(c) = buffer[..cursor_pos].chars().next_back() {
                        cursor_pos -= c.len_utf8();
                        buffer.remove(cursor_pos);
                        self.redraw(&buffer, cursor_pos)?;
                    }
                }
                (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                    buffer.insert(cursor_pos, c);
                    cursor_pos += c.len_utf8();
                    self.history.reset_browsing();
                    self.redraw(&buffer, cursor_pos)?;
                }
                _ => {}
            }
        }
    }

    /// Tab completion for the token ending at the cursor.
    ///
    /// The first token completes against registered command names, later
    /// tokens against the command's parameter tree. A single candidate is
    /// accepted outright; several extend the token to their longest
    /// common prefix and are listed below the input line.
    fn complete(
        &mut self,
        buffer: &mut String,
        cursor_pos: &mut usize,
        registry: &CommandRegistry,
    ) -> io::Result<()> {
        let head = &buffer[..*cursor_pos];
        let tokens: Vec<String> = head.split_whitespace().map(str::to_string).collect();
        let mid_token = !head.is_empty() && !head.ends_with(char::is_whitespace);
        let partial = if mid_token {
            tokens.last().cloned().unwrap_or_default()
        } else {
            String::new()
        };

        let candidates = if tokens.is_empty() || (tokens.len() == 1 && mid_token) {
            registry.command_completions(&partial)
        } else {
            let param_index = if mid_token {
                tokens.len() - 1
            } else {
                tokens.len()
            };
            registry.complete_args(&tokens, param_index, &partial)
        };

        match candidates.len() {
            0 => Ok(()),
            1 => {
                let replacement = format!("{} ", candidates[0]);
                self.replace_partial(buffer, cursor_pos, partial.len(), &replacement);
                self.redraw(buffer, *cursor_pos)
            }
            _ => {
                let prefix = longest_common_prefix(&candidates);
                if prefix.len() > partial.len() {
                    self.replace_partial(buffer, cursor_pos, partial.len(), &prefix);
                }
                self.list_candidates(&candidates)?;
                self.redraw(buffer, *cursor_pos)
            }
        }
    }

    /// Splice a completed token over the partial one ending at the cursor.
    fn replace_partial(
        &self,
        buffer: &mut String,
        cursor_pos: &mut usize,
        partial_len: usize,
        replacement: &str,
    ) {
        let start = *cursor_pos - partial_len;
        buffer.replace_range(start..*cursor_pos, replacement);
        *cursor_pos = start + replacement.len();
    }

    /// Print the candidate set below the input line, readline style.
    fn list_candidates(&self, candidates: &[String]) -> io::Result<()> {
        let mut stdout = io::stdout();
        write!(stdout, "\r\n")?;
        if self.color {
            for candidate in candidates {
                write!(stdout, "\x1b[36m{candidate}\x1b[0m  ")?;
            }
        } else {
            for candidate in candidates {
                write!(stdout, "{candidate}  ")?;
            }
        }
        write!(stdout, "\r\n")?;
        stdout.flush()
    }

    /// Redraw prompt and buffer on the current line.
    fn redraw(&self, buffer: &str, cursor_pos: usize) -> io::Result<()> {
        let mut stdout = io::stdout();
        write!(stdout, "\r\x1b[2K")?;
        stdout.flush()?;
        self.print_prompt()?;
        write!(stdout, "{buffer}")?;
        let chars_after = buffer[cursor_pos..].chars().count();
        if chars_after > 0 {
            write!(stdout, "{}", cursor::MoveLeft(chars_after as u16))?;
        }
        stdout.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn history(dir: &Path) -> InputHistory {
        InputHistory::new(dir, &ShellConfig::default())
    }

    #[test]
    fn test_history_push_and_persist() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = history(dir.path());
        h.push("set timeout 45");
        h.push("help");

        let reloaded = history(dir.path());
        assert_eq!(reloaded.entries(), vec!["set timeout 45", "help"]);
    }

    #[test]
    fn test_history_folds_blank_and_consecutive_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = history(dir.path());
        h.push("help");
        h.push("  ");
        h.push("help");
        h.push("clear");
        h.push("help");
        assert_eq!(h.entries(), vec!["help", "clear", "help"]);
    }

    #[test]
    fn test_history_dedup_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let config = ShellConfig {
            history_dedup: false,
            ..Default::default()
        };
        let mut h = InputHistory::new(dir.path(), &config);
        h.push("help");
        h.push("help");
        assert_eq!(h.entries(), vec!["help", "help"]);
    }

    #[test]
    fn test_history_trims_to_capacity() {
        let dir = tempfile::tempdir().unwrap();
        let config = ShellConfig {
            max_history: 3,
            ..Default::default()
        };
        let mut h = InputHistory::new(dir.path(), &config);
        for i in 0..5 {
            h.push(&format!("cmd{i}"));
        }
        assert_eq!(h.entries(), vec!["cmd2", "cmd3", "cmd4"]);
    }

    #[test]
    fn test_history_recall_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = history(dir.path());
        h.push("first");
        h.push("second");

        assert_eq!(h.older("draft"), Some("second".to_string()));
        assert_eq!(h.older("draft"), Some("first".to_string()));
        // The oldest entry is sticky.
        assert_eq!(h.older("draft"), Some("first".to_string()));
        assert_eq!(h.newer(), Some("second".to_string()));
        // Walking past the newest entry restores the draft.
        assert_eq!(h.newer(), Some("draft".to_string()));
        assert_eq!(h.newer(), None);
    }
}
