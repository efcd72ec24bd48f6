use super::CommandResult;
use crate::core::app::App;

pub type CommandHandler = fn(&mut App, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

/// Commands whose name starts with `prefix`, for tab completion.
pub fn matching_commands(prefix: &str) -> impl Iterator<Item = &'static Command> + '_ {
    let prefix = prefix.trim_start_matches('/').to_ascii_lowercase();
    all_commands()
        .iter()
        .filter(move |command| command.name.starts_with(&prefix))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "List the available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "persona",
        usage: "/persona [id]",
        help: "Switch personality, or list them without an id.",
        handler: super::handle_persona,
    },
    Command {
        name: "reset",
        usage: "/reset",
        help: "Start a new conversation with the same profile.",
        handler: super::handle_reset,
    },
    Command {
        name: "reconnect",
        usage: "/reconnect",
        help: "Close the connection and open a new one.",
        handler: super::handle_reconnect,
    },
    Command {
        name: "log",
        usage: "/log [filename]",
        help: "Toggle transcript logging or set the log file.",
        handler: super::handle_log,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave the chat.",
        handler: super::handle_quit,
    },
];
