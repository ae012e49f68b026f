use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::cmp;
use std::path::PathBuf;

use linecore::{BufferError, LineBuffer};

use crate::command_processor::CommandProcessor;
use crate::config::Config;
use crate::ui_state::UIState;

/// Editor mode. The accumulated command text lives inside the `Command`
/// variant, so it cannot outlive the mode it belongs to.
#[derive(Clone)]
pub enum Mode {
    Edit,
    Command(String),
}

pub struct App {
    pub buffer: LineBuffer,
    pub config: Config,
    pub ui_state: UIState,
    pub command_processor: CommandProcessor,
    mode: Mode,
    cursor_line: usize,
    cursor_col: usize, // byte column; column arithmetic is byte-based throughout
    viewport_offset: usize,
    viewport_height: usize,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            buffer: LineBuffer::new(),
            config,
            ui_state: UIState::new(),
            command_processor: CommandProcessor::new(),
            mode: Mode::Edit,
            cursor_line: 0,
            cursor_col: 0,
            viewport_offset: 0,
            viewport_height: 24, // Default, will be updated on first draw
        }
    }

    /// Replaces the buffer with one loaded from `path` (or an empty buffer
    /// bound to `path` if it does not exist yet).
    pub fn open(&mut self, path: PathBuf) -> Result<()> {
        self.buffer = LineBuffer::from_path(path)?;
        self.cursor_line = 0;
        self.cursor_col = 0;
        self.viewport_offset = 0;
        Ok(())
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Pending command text, when in command mode.
    pub fn command_text(&self) -> Option<&str> {
        match &self.mode {
            Mode::Command(command) => Some(command),
            Mode::Edit => None,
        }
    }

    pub fn cursor_position(&self) -> (usize, usize) {
        (self.cursor_line, self.cursor_col)
    }

    pub fn viewport_offset(&self) -> usize {
        self.viewport_offset
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height;
    }

    /// Lines currently in view, lossily decoded for display. The buffer is
    /// re-queried on every draw; there is no change notification to listen
    /// for.
    pub fn visible_lines(&self) -> Vec<String> {
        let end = cmp::min(
            self.viewport_offset + self.viewport_height,
            self.buffer.line_count(),
        );
        (self.viewport_offset..end)
            .map(|i| String::from_utf8_lossy(self.buffer.line(i).unwrap_or(&[])).into_owned())
            .collect()
    }

    pub fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        match self.mode {
            Mode::Edit => self.handle_edit_key(key),
            Mode::Command(_) => self.handle_command_key(key),
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('s') => self.save(),
                KeyCode::Char('p') => {
                    self.mode = Mode::Command(String::new());
                    self.ui_state.clear_status_message();
                }
                _ => log::debug!("unhandled control key: {:?}", key.code),
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Up => self.move_cursor_up(),
            KeyCode::Down => self.move_cursor_down(),
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            KeyCode::Enter => self.break_line()?,
            KeyCode::Backspace => self.backspace()?,
            KeyCode::Tab => self.insert_tab()?,
            KeyCode::Char(c) => self.insert_char(c)?,
            KeyCode::Esc => {}
            _ => log::debug!("unhandled key: {:?}", key.code),
        }
        Ok(())
    }

    fn handle_command_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Edit;
                self.ui_state.clear_status_message();
            }
            KeyCode::Enter => {
                if let Mode::Command(command) = std::mem::replace(&mut self.mode, Mode::Edit) {
                    let mut should_quit = false;
                    match self.command_processor.execute(
                        &command,
                        &mut self.buffer,
                        &mut should_quit,
                    ) {
                        Ok(message) => self.ui_state.set_info_message(message),
                        Err(e) => self.ui_state.set_error_message(e.to_string()),
                    }
                    if should_quit {
                        self.ui_state.quit();
                    }
                }
            }
            KeyCode::Backspace => {
                if let Mode::Command(command) = &mut self.mode {
                    command.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Mode::Command(command) = &mut self.mode {
                    command.push(c);
                }
            }
            _ => log::debug!("unhandled key in command mode: {:?}", key.code),
        }
        Ok(())
    }

    /// Saves to the bound path, surfacing the outcome on the status line.
    /// I/O failures end up in front of the user, never swallowed.
    pub fn save(&mut self) {
        match self.buffer.save() {
            Ok(()) => self
                .ui_state
                .set_info_message(format!("{} 行を書き込みました", self.buffer.line_count())),
            Err(BufferError::PathUnset) => self.ui_state.set_error_message(
                "ファイルパスが設定されていません (:w <path> で保存してください)".to_string(),
            ),
            Err(e) => self
                .ui_state
                .set_error_message(format!("保存に失敗しました: {}", e)),
        }
    }

    fn insert_char(&mut self, c: char) -> Result<()> {
        // Same gate as a classic isprint(): ASCII text and space only.
        if !c.is_ascii_graphic() && c != ' ' {
            log::debug!("unhandled key: {:?}", c);
            return Ok(());
        }
        let mut line = self.buffer.line(self.cursor_line)?.to_vec();
        let at = cmp::min(self.cursor_col, line.len());
        line.insert(at, c as u8);
        self.buffer.set_line(self.cursor_line, &line)?;
        self.cursor_col = at + 1;
        Ok(())
    }

    fn insert_tab(&mut self) -> Result<()> {
        if self.config.editor.use_spaces {
            for _ in 0..self.config.editor.tab_size {
                self.insert_char(' ')?;
            }
        } else {
            let mut line = self.buffer.line(self.cursor_line)?.to_vec();
            let at = cmp::min(self.cursor_col, line.len());
            line.insert(at, b'\t');
            self.buffer.set_line(self.cursor_line, &line)?;
            self.cursor_col = at + 1;
        }
        Ok(())
    }

    /// Enter: break the current line at the cursor. The tail moves onto a
    /// freshly inserted line below.
    fn break_line(&mut self) -> Result<()> {
        let line = self.buffer.line(self.cursor_line)?.to_vec();
        let split = cmp::min(self.cursor_col, line.len());
        self.buffer.insert_line_after(self.cursor_line)?;
        self.buffer.set_line(self.cursor_line, &line[..split])?;
        self.buffer.set_line(self.cursor_line + 1, &line[split..])?;
        self.cursor_line += 1;
        self.cursor_col = 0;
        self.adjust_viewport();
        Ok(())
    }

    /// Backspace: delete the byte before the cursor, or join with the line
    /// above when at column zero.
    fn backspace(&mut self) -> Result<()> {
        if self.cursor_col > 0 {
            let mut line = self.buffer.line(self.cursor_line)?.to_vec();
            let at = cmp::min(self.cursor_col, line.len());
            line.remove(at - 1);
            self.buffer.set_line(self.cursor_line, &line)?;
            self.cursor_col = at - 1;
        } else if self.cursor_line > 0 {
            let mut joined = self.buffer.line(self.cursor_line - 1)?.to_vec();
            let tail = self.buffer.line(self.cursor_line)?.to_vec();
            self.buffer.remove_line(self.cursor_line)?;
            self.cursor_line -= 1;
            self.cursor_col = joined.len();
            joined.extend_from_slice(&tail);
            self.buffer.set_line(self.cursor_line, &joined)?;
            self.adjust_viewport();
        }
        Ok(())
    }

    fn move_cursor_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.clamp_cursor_col();
            self.adjust_viewport();
        }
    }

    fn move_cursor_down(&mut self) {
        if self.cursor_line + 1 < self.buffer.line_count() {
            self.cursor_line += 1;
            self.clamp_cursor_col();
            self.adjust_viewport();
        }
    }

    fn move_cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        }
    }

    fn move_cursor_right(&mut self) {
        if self.cursor_col < self.line_len(self.cursor_line) {
            self.cursor_col += 1;
        }
    }

    fn line_len(&self, index: usize) -> usize {
        self.buffer.line(index).map(|line| line.len()).unwrap_or(0)
    }

    fn clamp_cursor_col(&mut self) {
        self.cursor_col = cmp::min(self.cursor_col, self.line_len(self.cursor_line));
    }

    fn adjust_viewport(&mut self) {
        if self.cursor_line < self.viewport_offset {
            self.viewport_offset = self.cursor_line;
        } else if self.cursor_line >= self.viewport_offset + self.viewport_height {
            self.viewport_offset = self.cursor_line.saturating_sub(self.viewport_height - 1);
        }
    }
}
