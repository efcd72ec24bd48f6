//! Splits message text into styled segments around `@hitch` mentions.
//!
//! The `@hitch` token (plus any whitespace after it) becomes a
//! [`SegmentStyle::DirectedMarker`] segment and the text right after it a
//! [`SegmentStyle::DirectedText`] segment. Everything else is plain.
//!
//! ```
//! use paquera::core::formatting::{format_message, SegmentStyle};
//!
//! let segments = format_message("@hitch hello world");
//! assert_eq!(segments.len(), 2);
//! assert_eq!(segments[0].text, "@hitch ");
//! assert_eq!(segments[0].style, SegmentStyle::DirectedMarker);
//! assert_eq!(segments[1].text, "hello world");
//! assert_eq!(segments[1].style, SegmentStyle::DirectedText);
//! ```

pub const DIRECTED_MENTION: &str = "@hitch";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStyle {
    Plain,
    DirectedMarker,
    DirectedText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub style: SegmentStyle,
}

impl<'a> Segment<'a> {
    fn new(text: &'a str, style: SegmentStyle) -> Self {
        Self { text, style }
    }
}

/// Never fails; text without a mention comes back as one plain segment,
/// even when it is empty.
pub fn format_message(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(DIRECTED_MENTION) {
        let start = cursor + offset;
        push_text(&mut segments, &text[cursor..start]);

        let mut end = start + DIRECTED_MENTION.len();
        end += text[end..]
            .char_indices()
            .find(|(_, ch)| !ch.is_whitespace())
            .map(|(index, _)| index)
            .unwrap_or(text.len() - end);

        segments.push(Segment::new(
            &text[start..end],
            SegmentStyle::DirectedMarker,
        ));
        cursor = end;
    }

    push_text(&mut segments, &text[cursor..]);

    if segments.is_empty() {
        segments.push(Segment::new(text, SegmentStyle::Plain));
    }
    segments
}

fn push_text<'a>(segments: &mut Vec<Segment<'a>>, text: &'a str) {
    if text.is_empty() {
        return;
    }
    let follows_marker = matches!(
        segments.last(),
        Some(Segment {
            style: SegmentStyle::DirectedMarker,
            ..
        })
    );
    let style = if follows_marker {
        SegmentStyle::DirectedText
    } else {
        SegmentStyle::Plain
    };
    segments.push(Segment::new(text, style));
}

/// Concatenates segment text back into the original string.
pub fn plain_text(segments: &[Segment<'_>]) -> String {
    segments.iter().map(|segment| segment.text).collect()
}
