//! Maps terminal key events to app actions.
//!
//! The mapping depends only on the phase and the composer text, so it is a
//! pure function the event loop calls with a snapshot of both.

use crate::commands::matching_commands;
use crate::core::app::AppAction;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    Onboarding,
    Chat,
}

pub fn map_key(key: KeyEvent, context: KeyContext, input: &str, page: u16) -> Vec<AppAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d')) {
        return vec![AppAction::Quit];
    }
    match context {
        KeyContext::Onboarding => map_onboarding_key(key),
        KeyContext::Chat => map_chat_key(key, input, page),
    }
}

fn map_onboarding_key(key: KeyEvent) -> Vec<AppAction> {
    match key.code {
        KeyCode::Enter => vec![AppAction::OnboardingSubmit],
        KeyCode::Esc => vec![AppAction::OnboardingBack],
        KeyCode::Tab => vec![AppAction::CompleteOnboarding],
        KeyCode::Backspace => vec![AppAction::Backspace],
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            vec![AppAction::InsertIntoInput {
                text: ch.to_string(),
            }]
        }
        _ => Vec::new(),
    }
}

fn map_chat_key(key: KeyEvent, input: &str, page: u16) -> Vec<AppAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => vec![AppAction::SubmitInput, AppAction::ScrollToBottom],
        KeyCode::Esc => vec![AppAction::ClearInput],
        KeyCode::Backspace => vec![AppAction::Backspace],
        KeyCode::Left => vec![AppAction::CursorLeft],
        KeyCode::Right => vec![AppAction::CursorRight],
        KeyCode::Up => vec![AppAction::ScrollUp { lines: 1 }],
        KeyCode::Down => vec![AppAction::ScrollDown { lines: 1 }],
        KeyCode::PageUp => vec![AppAction::ScrollUp { lines: page }],
        KeyCode::PageDown => vec![AppAction::ScrollDown { lines: page }],
        KeyCode::End => vec![AppAction::ScrollToBottom],
        KeyCode::Tab => match complete_command(input) {
            Some(suffix) => vec![AppAction::InsertIntoInput { text: suffix }],
            None => vec![AppAction::CyclePersonality { forward: true }],
        },
        KeyCode::BackTab => vec![AppAction::CyclePersonality { forward: false }],
        KeyCode::Char('r') if ctrl => vec![AppAction::ResetConversation],
        KeyCode::Char(ch) if !ctrl => vec![AppAction::InsertIntoInput {
            text: ch.to_string(),
        }],
        _ => Vec::new(),
    }
}

/// Remaining text of the first command matching a bare `/prefix`.
fn complete_command(input: &str) -> Option<String> {
    if !input.starts_with('/') || input.contains(char::is_whitespace) {
        return None;
    }
    let typed = &input[1..];
    let command = matching_commands(typed).next()?;
    Some(format!("{} ", &command.name[typed.len()..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for context in [KeyContext::Onboarding, KeyContext::Chat] {
            assert!(matches!(
                map_key(ctrl_c, context, "", 10).as_slice(),
                [AppAction::Quit]
            ));
        }
    }

    #[test]
    fn enter_means_different_things_per_phase() {
        assert!(matches!(
            map_key(key(KeyCode::Enter), KeyContext::Onboarding, "", 10).as_slice(),
            [AppAction::OnboardingSubmit]
        ));
        assert!(matches!(
            map_key(key(KeyCode::Enter), KeyContext::Chat, "oi", 10).as_slice(),
            [AppAction::SubmitInput, AppAction::ScrollToBottom]
        ));
    }

    #[test]
    fn tab_completes_commands_before_cycling() {
        match map_key(key(KeyCode::Tab), KeyContext::Chat, "/pe", 10).as_slice() {
            [AppAction::InsertIntoInput { text }] => assert_eq!(text, "rsona "),
            _ => panic!("expected completion"),
        }
        assert!(matches!(
            map_key(key(KeyCode::Tab), KeyContext::Chat, "oi", 10).as_slice(),
            [AppAction::CyclePersonality { forward: true }]
        ));
        assert!(matches!(
            map_key(key(KeyCode::Tab), KeyContext::Chat, "/persona a", 10).as_slice(),
            [AppAction::CyclePersonality { forward: true }]
        ));
    }

    #[test]
    fn page_keys_scroll_by_the_given_amount() {
        assert!(matches!(
            map_key(key(KeyCode::PageUp), KeyContext::Chat, "", 12).as_slice(),
            [AppAction::ScrollUp { lines: 12 }]
        ));
    }
}
