//! Paquera is a terminal companion chat client.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the session state: onboarding, the profile, the
//!   transcript, personalities and their accent channel, message
//!   classification and formatting, configuration, and the websocket
//!   connection manager.
//! - [`ui`] renders the terminal interface and runs the interactive event loop
//!   that drives user input, connection events and display updates.
//! - [`commands`] implements slash-command parsing and command execution used
//!   by the chat loop.
//! - [`logging`] installs the optional diagnostic log file.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which resolves settings and dispatches into
//! [`ui::chat_loop`] for interactive sessions.

pub mod cli;
pub mod commands;
pub mod core;
pub mod logging;
pub mod ui;
pub mod utils;
