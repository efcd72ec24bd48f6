//! Main chat event loop and UI rendering
//!
//! This module contains the loop that polls terminal input, feeds connection
//! events into the app, executes [`AppCommand`](crate::core::app::AppCommand)s
//! and redraws the screen.

mod event_loop;
mod keybindings;
mod lifecycle;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::app::App;

pub use event_loop::{run_chat, ChatOptions};

/// Shared, async-locked handle to the [`App`] owned by the event loop.
#[derive(Clone)]
pub struct AppHandle {
    inner: Arc<Mutex<App>>,
}

impl AppHandle {
    pub fn new(app: App) -> Self {
        Self {
            inner: Arc::new(Mutex::new(app)),
        }
    }

    pub async fn read<R>(&self, f: impl FnOnce(&App) -> R) -> R {
        let guard = self.inner.lock().await;
        f(&guard)
    }

    pub async fn update<R>(&self, f: impl FnOnce(&mut App) -> R) -> R {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }
}
