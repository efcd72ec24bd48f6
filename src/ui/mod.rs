//! Terminal UI layer for interactive chat sessions.
//!
//! The UI module owns rendering, layout, keyboard handling, and loop control
//! for the text user interface.
//!
//! Key submodules include:
//! - [`chat_loop`]: the main interaction loop that turns terminal input and
//!   connection events into [`crate::core::app::AppAction`]s.
//! - [`renderer`] and [`layout`]: onboarding and chat screen composition.
//! - [`theme`]: styles derived from the active personality's accent.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns session logic and the connection.

pub mod chat_loop;
pub mod layout;
pub mod renderer;
pub mod theme;
