use ratatui::layout::Size;
use std::time::{Duration, Instant};

const STATUS_TTL: Duration = Duration::from_secs(6);

/// Presentation state that is not part of the conversation itself.
#[derive(Debug)]
pub struct UiState {
    /// Chat composer buffer. Onboarding input lives in the onboarding buffers.
    pub input: String,
    /// Cursor position in `input`, counted in chars.
    pub input_cursor: usize,
    /// Lines scrolled up from the bottom of the transcript.
    pub scroll_from_bottom: u16,
    /// Cleared when the user scrolls away from the latest message.
    pub auto_scroll: bool,
    /// Set whenever a message is appended; the renderer consumes it.
    pub scroll_to_latest_requested: bool,
    pub status: Option<String>,
    pub status_set_at: Option<Instant>,
    pub exit_requested: bool,
    pub last_term_size: Size,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            input: String::new(),
            input_cursor: 0,
            scroll_from_bottom: 0,
            auto_scroll: true,
            scroll_to_latest_requested: false,
            status: None,
            status_set_at: None,
            exit_requested: false,
            last_term_size: Size::default(),
        }
    }
}

impl UiState {
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
        self.status_set_at = Some(Instant::now());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
        self.status_set_at = None;
    }

    /// Drops a status line that has been visible long enough.
    pub fn expire_status(&mut self, now: Instant) -> bool {
        match self.status_set_at {
            Some(set_at) if now.duration_since(set_at) >= STATUS_TTL => {
                self.clear_status();
                true
            }
            _ => false,
        }
    }

    pub fn request_scroll_to_latest(&mut self) {
        self.scroll_to_latest_requested = true;
    }

    /// Honors a pending scroll request unless the user scrolled away.
    pub fn take_scroll_request(&mut self) -> bool {
        let requested = std::mem::take(&mut self.scroll_to_latest_requested);
        if requested && self.auto_scroll {
            self.scroll_from_bottom = 0;
            return true;
        }
        false
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_add(lines);
        self.auto_scroll = false;
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(lines);
        if self.scroll_from_bottom == 0 {
            self.auto_scroll = true;
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_from_bottom = 0;
        self.auto_scroll = true;
    }

    pub fn take_input(&mut self) -> String {
        self.input_cursor = 0;
        std::mem::take(&mut self.input)
    }

    pub fn insert_str(&mut self, text: &str) {
        let byte_index = self.cursor_byte_index();
        self.input.insert_str(byte_index, text);
        self.input_cursor += text.chars().count();
    }

    pub fn backspace(&mut self) -> bool {
        if self.input_cursor == 0 {
            return false;
        }
        self.input_cursor -= 1;
        let byte_index = self.cursor_byte_index();
        self.input.remove(byte_index);
        true
    }

    pub fn move_cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.input_cursor = (self.input_cursor + 1).min(self.input.chars().count());
    }

    fn cursor_byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.input_cursor)
            .map(|(index, _)| index)
            .unwrap_or(self.input.len())
    }
}
