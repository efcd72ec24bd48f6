use crate::core::personality::ThemeAccent;
use crate::utils::color::{rgb_for_depth, ColorDepth};
use ratatui::style::{Color, Modifier, Style};

/// Styles for one frame, derived from the active personality's accent.
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,
    pub accent_secondary: Color,

    pub title_style: Style,
    pub selector_style: Style,
    pub selector_active_style: Style,

    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub agent_prefix_style: Style,
    pub agent_text_style: Style,
    pub directed_prefix_style: Style,
    pub directed_marker_style: Style,
    pub directed_text_style: Style,
    pub timestamp_style: Style,
    pub undelivered_style: Style,

    pub input_border_style: Style,
    pub input_title_style: Style,
    pub input_text_style: Style,
    pub hint_style: Style,
    pub warning_style: Style,
    pub status_style: Style,
}

impl Theme {
    pub fn from_accent(accent: ThemeAccent, depth: ColorDepth) -> Self {
        let primary = rgb_for_depth(accent.from, depth);
        let secondary = rgb_for_depth(accent.to, depth);
        let directed = rgb_for_depth((0x0e, 0xa5, 0xe9), depth);
        let muted = Style::default().fg(Color::DarkGray);

        Theme {
            accent: primary,
            accent_secondary: secondary,

            title_style: Style::default().fg(primary).add_modifier(Modifier::BOLD),
            selector_style: muted,
            selector_active_style: Style::default()
                .fg(Color::Black)
                .bg(primary)
                .add_modifier(Modifier::BOLD),

            user_prefix_style: Style::default()
                .fg(secondary)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::White),
            agent_prefix_style: Style::default().fg(primary).add_modifier(Modifier::BOLD),
            agent_text_style: Style::default().fg(Color::Gray),
            directed_prefix_style: Style::default()
                .fg(directed)
                .add_modifier(Modifier::BOLD),
            directed_marker_style: Style::default()
                .fg(directed)
                .add_modifier(Modifier::BOLD),
            directed_text_style: Style::default()
                .fg(directed)
                .add_modifier(Modifier::ITALIC),
            timestamp_style: muted,
            undelivered_style: Style::default().fg(Color::Red),

            input_border_style: Style::default().fg(primary),
            input_title_style: Style::default().fg(secondary),
            input_text_style: Style::default().fg(Color::White),
            hint_style: muted,
            warning_style: Style::default().fg(Color::Yellow),
            status_style: Style::default().fg(secondary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::personality::{default_personality, find_personality};

    #[test]
    fn theme_follows_the_accent() {
        let suzi = Theme::from_accent(default_personality().accent, ColorDepth::Truecolor);
        assert_eq!(suzi.accent, Color::Rgb(0xec, 0x48, 0x99));
        assert_eq!(suzi.input_border_style.fg, Some(suzi.accent));

        let chler = find_personality("chler").expect("catalog");
        let themed = Theme::from_accent(chler.accent, ColorDepth::Truecolor);
        assert_eq!(themed.accent, Color::Rgb(0xf9, 0x73, 0x16));
        assert_eq!(themed.selector_active_style.bg, Some(themed.accent));
    }

    #[test]
    fn limited_terminals_get_quantized_colors() {
        let theme = Theme::from_accent(default_personality().accent, ColorDepth::X256);
        assert!(matches!(theme.accent, Color::Indexed(_)));
    }
}
