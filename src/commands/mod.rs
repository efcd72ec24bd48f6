mod registry;

pub use registry::{all_commands, matching_commands, CommandInvocation};

use crate::core::app::App;
use crate::core::personality::{all_personalities, resolve_personality};

pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    Reconnect,
    Quit,
}

pub fn process_input(app: &mut App, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    if let Some(command) = registry::find_command(command_name) {
        let invocation = CommandInvocation {
            input: trimmed,
            args,
        };
        (command.handler)(app, invocation)
    } else {
        CommandResult::ProcessAsMessage(input.to_string())
    }
}

pub(super) fn handle_help(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let usages: Vec<&str> = all_commands().iter().map(|command| command.usage).collect();
    app.ui.set_status(format!("Commands: {}", usages.join("  ")));
    CommandResult::Continue
}

pub(super) fn handle_persona(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        let listing: Vec<String> = all_personalities()
            .iter()
            .map(|personality| {
                if personality.id == app.personality.id {
                    format!("[{}]", personality.id)
                } else {
                    personality.id.to_string()
                }
            })
            .collect();
        app.ui
            .set_status(format!("Personalities: {}", listing.join(" ")));
        return CommandResult::Continue;
    }

    match resolve_personality(invocation.args) {
        Ok(target) => app.switch_personality(target),
        Err(err) => app.ui.set_status(err),
    }
    CommandResult::Continue
}

pub(super) fn handle_reset(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    if app.reset_conversation() {
        app.ui.set_status("Nova conversa iniciada");
    }
    CommandResult::Continue
}

pub(super) fn handle_reconnect(
    _app: &mut App,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Reconnect
}

pub(super) fn handle_log(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let parts: Vec<&str> = invocation.input.split_whitespace().collect();

    let result = match parts.len() {
        1 => app.logging.toggle_logging(),
        2 => app.logging.set_log_file(parts[1].to_string()),
        _ => {
            app.ui.set_status("Usage: /log [filename]");
            return CommandResult::Continue;
        }
    };
    match result {
        Ok(message) => app.ui.set_status(message),
        Err(e) => app.ui.set_status(format!("Log error: {}", e)),
    }
    CommandResult::Continue
}

pub(super) fn handle_quit(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Quit
}
