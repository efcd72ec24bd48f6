use std::collections::HashSet;

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

use super::theme::Theme;
use crate::core::formatting::{format_message, SegmentStyle};
use crate::core::message::{Message, MessageId, Sender};

/// Mapping for a single message's contribution to the flattened line stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageLineSpan {
    pub start: usize,
    pub len: usize,
}

/// Result of a layout pass over the transcript.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    pub lines: Vec<Line<'static>>,
    pub message_spans: Vec<MessageLineSpan>,
}

pub struct TranscriptView<'a> {
    pub messages: &'a [Message],
    pub undelivered: &'a HashSet<MessageId>,
    pub user_name: &'a str,
    pub personality_name: &'a str,
}

pub const UNDELIVERED_MARKER: &str = " ⚠ não enviada";

pub struct LayoutEngine;

impl LayoutEngine {
    /// Lays out every message as a header line followed by its wrapped body
    /// and a blank separator.
    pub fn layout_transcript(view: &TranscriptView<'_>, theme: &Theme, width: usize) -> Layout {
        let width = width.max(8);
        let mut layout = Layout::default();

        for message in view.messages {
            let start = layout.lines.len();
            layout.lines.push(header_line(view, message, theme));

            let body_style = match message.sender {
                Sender::User => theme.user_text_style,
                Sender::Agent => theme.agent_text_style,
                Sender::DirectedAgent => theme.agent_text_style,
            };
            let pieces: Vec<(String, Style)> = format_message(&message.text)
                .into_iter()
                .map(|segment| {
                    let style = match segment.style {
                        SegmentStyle::Plain => body_style,
                        SegmentStyle::DirectedMarker => theme.directed_marker_style,
                        SegmentStyle::DirectedText => theme.directed_text_style,
                    };
                    (segment.text.to_string(), style)
                })
                .collect();
            layout.lines.extend(wrap_styled(&pieces, width));
            layout.lines.push(Line::default());

            layout.message_spans.push(MessageLineSpan {
                start,
                len: layout.lines.len() - start,
            });
        }
        layout
    }
}

fn header_line(view: &TranscriptView<'_>, message: &Message, theme: &Theme) -> Line<'static> {
    let (name, style) = match message.sender {
        Sender::User => (view.user_name.to_string(), theme.user_prefix_style),
        Sender::Agent => (view.personality_name.to_string(), theme.agent_prefix_style),
        Sender::DirectedAgent => ("Hitch".to_string(), theme.directed_prefix_style),
    };
    let mut spans = vec![
        Span::styled(name, style),
        Span::styled(format!("  {}", message.time_label()), theme.timestamp_style),
    ];
    if view.undelivered.contains(&message.id) {
        spans.push(Span::styled(UNDELIVERED_MARKER, theme.undelivered_style));
    }
    Line::from(spans)
}

/// Greedy word wrap over styled pieces. Explicit newlines always break and
/// words wider than `width` are split at character boundaries.
pub fn wrap_styled(pieces: &[(String, Style)], width: usize) -> Vec<Line<'static>> {
    let mut builder = LineBuilder::new(width.max(1));
    for (text, style) in pieces {
        for (index, paragraph) in text.split('\n').enumerate() {
            if index > 0 {
                builder.break_line();
            }
            for word in split_keep_spaces(paragraph) {
                builder.push_word(word, *style);
            }
        }
    }
    builder.finish()
}

/// Splits into words that carry their trailing whitespace.
fn split_keep_spaces(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = 0;
    let mut in_space = false;
    for (index, ch) in text.char_indices() {
        if ch.is_whitespace() {
            in_space = true;
        } else if in_space {
            words.push(&text[start..index]);
            start = index;
            in_space = false;
        }
    }
    if start < text.len() {
        words.push(&text[start..]);
    }
    words
}

fn str_width(text: &str) -> usize {
    text.chars().map(|ch| ch.width().unwrap_or(0)).sum()
}

struct LineBuilder {
    width: usize,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    current_width: usize,
}

impl LineBuilder {
    fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
            current: Vec::new(),
            current_width: 0,
        }
    }

    fn break_line(&mut self) {
        let spans = std::mem::take(&mut self.current);
        self.lines.push(Line::from(spans));
        self.current_width = 0;
    }

    fn push_span(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        self.current_width += str_width(text);
        self.current.push(Span::styled(text.to_string(), style));
    }

    fn push_word(&mut self, word: &str, style: Style) {
        let visible = word.trim_end();
        let visible_width = str_width(visible);

        if self.current_width > 0 && self.current_width + visible_width > self.width {
            self.break_line();
        }

        if visible_width <= self.width {
            let room = self.width - self.current_width;
            let trailing = &word[visible.len()..];
            if visible_width + str_width(trailing) <= room {
                self.push_span(word, style);
            } else {
                self.push_span(visible, style);
            }
            return;
        }

        let mut chunk = String::new();
        let mut chunk_width = 0;
        for ch in visible.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if self.current_width + chunk_width + ch_width > self.width {
                self.push_span(&chunk, style);
                chunk.clear();
                chunk_width = 0;
                self.break_line();
            }
            chunk.push(ch);
            chunk_width += ch_width;
        }
        self.push_span(&chunk, style);
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        if !self.current.is_empty() || self.lines.is_empty() {
            self.break_line();
        }
        self.lines
    }
}
