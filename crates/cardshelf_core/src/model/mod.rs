//! Domain records for the per-owner folder forest.
//!
//! # Responsibility
//! - Define folders, cards and shortcuts as flat records linked by ids.
//! - Keep ownership identity explicit in every record that has an owner.
//!
//! # Invariants
//! - Parent links are ids, never owning references; the forest is an arena
//!   keyed by id.
//! - `sort_order` only means something inside one sibling group.

pub mod card;
pub mod folder;
pub mod owner;
pub mod shortcut;

use serde::{Deserialize, Serialize};

/// Entity kind, used to tag errors and drag payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Folder,
    Card,
    Shortcut,
}

impl EntityKind {
    /// Stable lowercase label used in messages and log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Card => "card",
            Self::Shortcut => "shortcut",
        }
    }
}
