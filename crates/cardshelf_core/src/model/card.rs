//! Knowledge card (item) records.

use crate::model::folder::FolderId;
use crate::model::owner::OwnerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable card identifier.
pub type CardId = Uuid;

/// Leaf resource placed in at most one folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub owner_id: OwnerId,
    /// `None` means the card is listed at the owner's root.
    pub folder_id: Option<FolderId>,
    pub title: String,
    /// Position within the `(owner_id, folder_id)` card group. Independent of
    /// folder and shortcut ordering in the same parent.
    pub sort_order: i64,
    pub color: Option<String>,
    /// Number of content sections, as last reported by the editor.
    pub section_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Card {
    pub fn summary(&self) -> CardSummary {
        CardSummary {
            id: self.id,
            folder_id: self.folder_id,
            title: self.title.clone(),
            color: self.color.clone(),
            section_count: self.section_count,
        }
    }
}

/// Card fields embedded in shortcut listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSummary {
    pub id: CardId,
    /// Primary folder of the card, not the folder the shortcut lives in.
    pub folder_id: Option<FolderId>,
    pub title: String,
    pub color: Option<String>,
    pub section_count: i64,
}
