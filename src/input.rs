//! Input-line model for a command-entry widget.
//!
//! Owns the edit buffer, the submit history, and this widget's
//! [`TabCompleteSession`]. Rendering is up to the embedding UI; this module
//! only manages text. Each widget instance owns its own session, so two
//! chat boxes never share cycling state.

use crate::registry::CommandRegistry;
use crate::session::{TabCompleteResult, TabCompleteSession};
use crate::ExecutionContext;

pub struct InputArea {
    pub buffer: String,
    pub cursor_position: usize,
    pub history: Vec<String>,
    pub history_index: Option<usize>,
    pub temp_input: String,
    session: TabCompleteSession,
}

impl InputArea {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor_position: 0,
            history: Vec::new(),
            history_index: None,
            temp_input: String::new(),
            session: TabCompleteSession::new(),
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            // Find the previous character boundary
            let mut new_pos = self.cursor_position - 1;
            while new_pos > 0 && !self.buffer.is_char_boundary(new_pos) {
                new_pos -= 1;
            }
            self.cursor_position = new_pos;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.buffer.len() {
            // Find the next character boundary
            let mut new_pos = self.cursor_position + 1;
            while new_pos < self.buffer.len() && !self.buffer.is_char_boundary(new_pos) {
                new_pos += 1;
            }
            self.cursor_position = new_pos;
        }
    }

    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor_position, c);
        self.cursor_position += c.len_utf8();
        self.history_index = None;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let mut new_pos = self.cursor_position - 1;
            while new_pos > 0 && !self.buffer.is_char_boundary(new_pos) {
                new_pos -= 1;
            }
            self.buffer.remove(new_pos);
            self.cursor_position = new_pos;
        }
    }

    pub fn delete_char_forward(&mut self) {
        if self.cursor_position < self.buffer.len() {
            self.buffer.remove(self.cursor_position);
        }
    }

    pub fn delete_word_before_cursor(&mut self) {
        if self.cursor_position == 0 {
            return;
        }

        // Work with characters, not bytes
        let before_cursor: String = self.buffer[..self.cursor_position].to_string();
        let mut chars: Vec<char> = before_cursor.chars().collect();

        // Skip whitespace immediately before cursor
        while !chars.is_empty() && chars.last().is_some_and(|c| c.is_whitespace()) {
            chars.pop();
        }

        // Delete word characters until we hit whitespace or start
        while !chars.is_empty() && chars.last().is_some_and(|c| !c.is_whitespace()) {
            chars.pop();
        }

        let new_before: String = chars.into_iter().collect();
        let after_cursor = &self.buffer[self.cursor_position..];
        self.cursor_position = new_before.len();
        self.buffer = new_before + after_cursor;
    }

    pub fn home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn end(&mut self) {
        self.cursor_position = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor_position = 0;
        self.history_index = None;
        self.session.reset();
    }

    /// Take the current line for submission, recording it in history.
    pub fn take_input(&mut self) -> String {
        let input = self.buffer.clone();
        if !input.is_empty() {
            self.history.push(input.clone());
        }
        self.clear();
        input
    }

    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }

        match self.history_index {
            None => {
                self.temp_input = self.buffer.clone();
                self.history_index = Some(self.history.len() - 1);
            }
            Some(idx) if idx > 0 => {
                self.history_index = Some(idx - 1);
            }
            _ => return,
        }

        if let Some(idx) = self.history_index {
            self.buffer = self.history[idx].clone();
            self.cursor_position = self.buffer.len();
        }
    }

    pub fn history_next(&mut self) {
        match self.history_index {
            Some(idx) if idx < self.history.len() - 1 => {
                self.history_index = Some(idx + 1);
                self.buffer = self.history[idx + 1].clone();
            }
            Some(_) => {
                self.history_index = None;
                self.buffer = self.temp_input.clone();
            }
            None => return,
        }
        self.cursor_position = self.buffer.len();
    }

    /// Tab-complete the current buffer through this widget's session.
    ///
    /// Only slash commands complete; plain chat text is left alone. The
    /// slash stays outside the engine: it is stripped before the registry
    /// sees the line and re-applied to the returned text and to every
    /// option's replace value, so both are full input-box lines.
    pub fn tab_complete(
        &mut self,
        registry: &CommandRegistry,
        ctx: &mut ExecutionContext,
    ) -> TabCompleteResult {
        let Some(line) = self.buffer.strip_prefix('/') else {
            return TabCompleteResult {
                result: self.buffer.clone(),
                options: Vec::new(),
                index: None,
            };
        };
        let line = line.to_string();
        let out = self.session.complete(registry, ctx, &line);
        self.buffer = format!("/{}", out.result);
        self.cursor_position = self.buffer.len();
        let options = out
            .options
            .into_iter()
            .map(|mut o| {
                o.replace = format!("/{}", o.replace);
                o
            })
            .collect();
        TabCompleteResult {
            result: self.buffer.clone(),
            options,
            index: out.index,
        }
    }
}

impl Default for InputArea {
    fn default() -> Self {
        Self::new()
    }
}
