//! Shortcut records: extra listing entries pointing at a card.

use crate::model::card::{CardId, CardSummary};
use crate::model::folder::FolderId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable shortcut identifier.
pub type ShortcutId = Uuid;

/// Non-owning `(folder, card)` reference. At most one per pair.
///
/// Ownership follows the folder; the card keeps its own `folder_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    pub id: ShortcutId,
    pub folder_id: FolderId,
    pub card_id: CardId,
    /// Position among the folder's shortcuts only.
    pub sort_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Shortcut listing row with the referenced card embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutEntry {
    pub shortcut: Shortcut,
    pub card: CardSummary,
}
