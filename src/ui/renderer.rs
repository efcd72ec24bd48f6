use crate::core::app::App;
use crate::core::onboarding::{Onboarding, OnboardingStep};
use crate::core::personality::all_personalities;
use crate::ui::layout::{LayoutEngine, TranscriptView};
use crate::ui::theme::Theme;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

pub fn ui(f: &mut Frame, app: &mut App, theme: &Theme) {
    if app.is_chat() {
        render_chat(f, app, theme);
    } else {
        render_onboarding(f, app, theme);
    }
}

fn render_onboarding(f: &mut Frame, app: &App, theme: &Theme) {
    let Some(onboarding) = app.onboarding() else {
        return;
    };
    let area = centered(f.area(), 60, 14);
    let step = onboarding.step();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.input_border_style)
        .title(Span::styled(
            format!(" {} Paquera ", app.personality.avatar_glyph),
            theme.title_style,
        ))
        .title_alignment(Alignment::Center);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Passo {} de 3", step.ordinal()),
            theme.hint_style,
        )),
        Line::default(),
        Line::from(Span::styled(
            step.prompt(),
            theme.title_style.remove_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("> ", theme.input_title_style),
            Span::styled(onboarding.current_input().to_string(), theme.input_text_style),
        ]),
    ];

    if step == OnboardingStep::AgeEntry
        && !onboarding.age().trim().is_empty()
        && !onboarding.can_advance()
    {
        lines.push(Line::from(Span::styled(
            "Você precisa ter 18 anos ou mais",
            theme.warning_style,
        )));
    }

    if step == OnboardingStep::InterestEntry {
        lines.push(Line::default());
        lines.push(interest_chips(onboarding, theme));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        onboarding_hint(onboarding),
        theme.hint_style,
    )));
    if let Some(status) = &app.ui.status {
        lines.push(Line::from(Span::styled(status.clone(), theme.status_style)));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);

    let prompt_row = inner.y.saturating_add(3);
    let cursor_x = inner
        .x
        .saturating_add(2)
        .saturating_add(clamp_u16(onboarding.current_input().width()));
    if prompt_row < inner.bottom() {
        let last_column = inner.right().saturating_sub(1).max(inner.x);
        f.set_cursor_position((cursor_x.min(last_column), prompt_row));
    }
}

fn interest_chips(onboarding: &Onboarding, theme: &Theme) -> Line<'static> {
    if onboarding.interests().is_empty() {
        return Line::from(Span::styled("(nenhum interesse ainda)", theme.hint_style));
    }
    let mut spans = Vec::new();
    for tag in onboarding.interests().iter() {
        spans.push(Span::styled(format!(" {} ", tag), theme.selector_active_style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn onboarding_hint(onboarding: &Onboarding) -> &'static str {
    match onboarding.step() {
        OnboardingStep::NameEntry => "Enter continua • Ctrl+C sai",
        OnboardingStep::AgeEntry => "Enter continua • Esc volta",
        OnboardingStep::InterestEntry => {
            "Enter adiciona • Enter vazio ou Tab começa o chat • Backspace remove • Esc volta"
        }
        OnboardingStep::Complete => "",
    }
}

fn render_chat(f: &mut Frame, app: &mut App, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, app, theme, chunks[0]);
    render_selector(f, app, theme, chunks[1]);
    render_transcript(f, app, theme, chunks[2]);
    render_input(f, app, theme, chunks[3]);

    let status = app.ui.status.clone().unwrap_or_default();
    f.render_widget(
        Paragraph::new(Span::styled(status, theme.status_style)),
        chunks[4],
    );
}

fn render_header(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let title = format!(
        "{} Paquera • {} • {} • Log: {}",
        app.personality.avatar_glyph,
        app.personality.display_name,
        app.connection.label(),
        app.logging.status_string()
    );
    f.render_widget(Paragraph::new(Span::styled(title, theme.title_style)), area);
}

fn render_selector(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let mut spans = Vec::new();
    for personality in all_personalities() {
        let style = if personality.id == app.personality.id {
            theme.selector_active_style
        } else {
            theme.selector_style
        };
        spans.push(Span::styled(
            format!(" {} {} ", personality.avatar_glyph, personality.display_name),
            style,
        ));
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled("(Tab troca)", theme.hint_style));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_transcript(f: &mut Frame, app: &mut App, theme: &Theme, area: Rect) {
    let user_name = app.profile().map(|p| p.name()).unwrap_or_default();
    let layout = LayoutEngine::layout_transcript(
        &TranscriptView {
            messages: app.transcript.messages(),
            undelivered: &app.undelivered,
            user_name,
            personality_name: app.personality.display_name,
        },
        theme,
        area.width as usize,
    );

    app.ui.take_scroll_request();

    let total = clamp_u16(layout.lines.len());
    let max_from_bottom = total.saturating_sub(area.height);
    if app.ui.scroll_from_bottom > max_from_bottom {
        app.ui.scroll_from_bottom = max_from_bottom;
    }
    let top = max_from_bottom - app.ui.scroll_from_bottom;

    f.render_widget(Paragraph::new(layout.lines).scroll((top, 0)), area);
}

fn render_input(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let title = if app.connection.is_ready() {
        " Mensagem (Enter envia, /help comandos) "
    } else {
        " Mensagem (sem conexão: /reconnect) "
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.input_border_style)
        .title(Span::styled(title, theme.input_title_style));
    let inner = block.inner(area);

    let before_cursor: String = app.ui.input.chars().take(app.ui.input_cursor).collect();
    let cursor_offset = clamp_u16(before_cursor.width());
    let horizontal_scroll = cursor_offset.saturating_sub(inner.width.saturating_sub(1));

    f.render_widget(
        Paragraph::new(app.ui.input.as_str())
            .style(theme.input_text_style)
            .block(block)
            .scroll((0, horizontal_scroll)),
        area,
    );
    f.set_cursor_position((
        inner.x.saturating_add(cursor_offset - horizontal_scroll),
        inner.y,
    ));
}

/// Terminal coordinates are `u16`; anything wider pins to the edge.
fn clamp_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
