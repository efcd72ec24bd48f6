//! Built-in agent personalities and the accent channel presentation code
//! watches for theme changes.

use tokio::sync::watch;

/// A two-stop gradient; presentation code picks whichever stop it can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeAccent {
    pub token: &'static str,
    pub from: (u8, u8, u8),
    pub to: (u8, u8, u8),
}

#[derive(Debug, PartialEq, Eq)]
pub struct Personality {
    pub id: &'static str,
    pub display_name: &'static str,
    pub avatar_glyph: &'static str,
    pub accent: ThemeAccent,
}

const CATALOG: [Personality; 4] = [
    Personality {
        id: "suzi",
        display_name: "Suzi",
        avatar_glyph: "💕",
        accent: ThemeAccent {
            token: "pink-500/rose-500",
            from: (0xec, 0x48, 0x99),
            to: (0xf4, 0x3f, 0x5e),
        },
    },
    Personality {
        id: "chler",
        display_name: "Chler",
        avatar_glyph: "🧡",
        accent: ThemeAccent {
            token: "orange-500/amber-500",
            from: (0xf9, 0x73, 0x16),
            to: (0xf5, 0x9e, 0x0b),
        },
    },
    Personality {
        id: "cynthia",
        display_name: "Cynthia",
        avatar_glyph: "💜",
        accent: ThemeAccent {
            token: "purple-500/violet-500",
            from: (0xa8, 0x55, 0xf7),
            to: (0x8b, 0x5c, 0xf6),
        },
    },
    Personality {
        id: "anna",
        display_name: "Anna",
        avatar_glyph: "💖",
        accent: ThemeAccent {
            token: "pink-600/fuchsia-500",
            from: (0xdb, 0x27, 0x77),
            to: (0xd9, 0x46, 0xef),
        },
    },
];

pub fn all_personalities() -> &'static [Personality] {
    &CATALOG
}

pub fn default_personality() -> &'static Personality {
    &CATALOG[0]
}

pub fn find_personality(id: &str) -> Option<&'static Personality> {
    all_personalities()
        .iter()
        .find(|personality| personality.id.eq_ignore_ascii_case(id.trim()))
}

/// Resolves a configured id, listing the valid ids when it is unknown.
pub fn resolve_personality(id: &str) -> Result<&'static Personality, String> {
    find_personality(id).ok_or_else(|| {
        let available: Vec<&str> = all_personalities().iter().map(|p| p.id).collect();
        format!(
            "Personality '{}' not found. Available personalities: {}",
            id,
            available.join(", ")
        )
    })
}

/// Position in the catalog, used for cycling and the selector bar.
pub fn catalog_index(personality: &Personality) -> usize {
    all_personalities()
        .iter()
        .position(|candidate| candidate.id == personality.id)
        .unwrap_or(0)
}

pub fn next_personality(current: &Personality) -> &'static Personality {
    let catalog = all_personalities();
    &catalog[(catalog_index(current) + 1) % catalog.len()]
}

pub fn previous_personality(current: &Personality) -> &'static Personality {
    let catalog = all_personalities();
    let index = catalog_index(current);
    &catalog[(index + catalog.len() - 1) % catalog.len()]
}

/// Process-wide accent slot. Every switch publishes; the latest value wins.
#[derive(Debug, Clone)]
pub struct AccentChannel {
    tx: watch::Sender<ThemeAccent>,
}

impl AccentChannel {
    pub fn new(initial: ThemeAccent) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn publish(&self, accent: ThemeAccent) {
        self.tx.send_replace(accent);
    }

    pub fn current(&self) -> ThemeAccent {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ThemeAccent> {
        self.tx.subscribe()
    }
}
