use super::{App, AppAction, AppActionContext, AppCommand};
use crate::core::onboarding::OnboardingStep;

pub(super) fn handle_input_action(
    app: &mut App,
    action: AppAction,
    _ctx: AppActionContext,
) -> Option<AppCommand> {
    match action {
        AppAction::InsertIntoInput { text } => {
            insert_text(app, &text);
            None
        }
        AppAction::Backspace => {
            backspace(app);
            None
        }
        AppAction::CursorLeft => {
            if app.is_chat() {
                app.ui.move_cursor_left();
            }
            None
        }
        AppAction::CursorRight => {
            if app.is_chat() {
                app.ui.move_cursor_right();
            }
            None
        }
        AppAction::ClearInput => {
            match app.onboarding_mut() {
                Some(onboarding) => onboarding.set_current_input(String::new()),
                None => {
                    app.ui.take_input();
                }
            }
            None
        }
        AppAction::SetStatus { message } => {
            app.ui.set_status(message);
            None
        }
        AppAction::ClearStatus => {
            app.ui.clear_status();
            None
        }
        AppAction::ScrollUp { lines } => {
            app.ui.scroll_up(lines);
            None
        }
        AppAction::ScrollDown { lines } => {
            app.ui.scroll_down(lines);
            None
        }
        AppAction::ScrollToBottom => {
            app.ui.scroll_to_bottom();
            None
        }
        AppAction::Quit => app.request_exit(),
        _ => unreachable!("non-input action routed to input handler"),
    }
}

fn insert_text(app: &mut App, text: &str) {
    match app.onboarding_mut() {
        Some(onboarding) => {
            let single_line: String = text.chars().filter(|ch| *ch != '\n').collect();
            let updated = format!("{}{}", onboarding.current_input(), single_line);
            onboarding.set_current_input(updated);
        }
        None => app.ui.insert_str(text),
    }
}

/// In the interest step, backspace on an empty field drops the newest tag.
fn backspace(app: &mut App) {
    let Some(onboarding) = app.onboarding_mut() else {
        app.ui.backspace();
        return;
    };

    let mut current = onboarding.current_input().to_string();
    if current.pop().is_some() {
        onboarding.set_current_input(current);
        return;
    }
    if onboarding.step() == OnboardingStep::InterestEntry {
        if let Some(last) = onboarding.interests().as_slice().last().cloned() {
            onboarding.remove_interest(&last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::apply_action;
    use super::*;
    use crate::utils::test_utils::{create_chat_app, create_test_app};

    fn ctx() -> AppActionContext {
        AppActionContext::default()
    }

    fn type_text(app: &mut App, text: &str) {
        apply_action(
            app,
            AppAction::InsertIntoInput {
                text: text.to_string(),
            },
            ctx(),
        );
    }

    #[test]
    fn typing_during_onboarding_fills_the_step_buffer() {
        let mut app = create_test_app();
        type_text(&mut app, "An");
        type_text(&mut app, "a\n");
        assert_eq!(app.onboarding().expect("onboarding").name(), "Ana");
        assert!(app.ui.input.is_empty());

        apply_action(&mut app, AppAction::Backspace, ctx());
        assert_eq!(app.onboarding().expect("onboarding").name(), "An");
    }

    #[test]
    fn backspace_on_empty_interest_field_removes_last_tag() {
        let mut app = create_test_app();
        {
            let onboarding = app.onboarding_mut().expect("onboarding");
            onboarding.set_current_input("Ana");
            onboarding.advance();
            onboarding.set_current_input("30");
            onboarding.advance();
            onboarding.add_interest(Some("music"));
            onboarding.add_interest(Some("hiking"));
        }
        apply_action(&mut app, AppAction::Backspace, ctx());
        let interests = app.onboarding().expect("onboarding").interests();
        assert_eq!(interests.as_slice(), ["music".to_string()]);
    }

    #[test]
    fn typing_in_chat_edits_the_composer() {
        let mut app = create_chat_app();
        type_text(&mut app, "oi");
        apply_action(&mut app, AppAction::CursorLeft, ctx());
        type_text(&mut app, "l");
        assert_eq!(app.ui.input, "oli");
        apply_action(&mut app, AppAction::ClearInput, ctx());
        assert!(app.ui.input.is_empty());
    }

    #[test]
    fn quit_requests_exit_and_closes_connection() {
        let mut app = create_chat_app();
        let cmd = apply_action(&mut app, AppAction::Quit, ctx());
        assert_eq!(cmd, Some(AppCommand::CloseConnection));
        assert!(app.ui.exit_requested);
    }
}
