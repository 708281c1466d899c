//! Folder (container) records and their read projections.

use crate::model::owner::OwnerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable folder identifier.
pub type FolderId = Uuid;

/// One node of an owner's folder forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub owner_id: OwnerId,
    /// `None` means the folder sits at the owner's root.
    pub parent_id: Option<FolderId>,
    pub name: String,
    /// Position within the `(owner_id, parent_id)` sibling group.
    pub sort_order: i64,
    /// Display-only `#RGB`/`#RRGGBB` color.
    pub color: Option<String>,
    /// Epoch ms.
    pub created_at: i64,
    /// Epoch ms.
    pub updated_at: i64,
}

impl Folder {
    /// Minimal `{id, name}` identity used by breadcrumbs.
    pub fn segment(&self) -> PathSegment {
        PathSegment {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Folder listing row with direct child counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderSummary {
    pub folder: Folder,
    pub child_folder_count: i64,
    pub card_count: i64,
}

/// One breadcrumb entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    pub id: FolderId,
    pub name: String,
}

/// Folder plus its root-first ancestor chain, ending with the folder itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderWithPath {
    pub folder: Folder,
    pub path: Vec<PathSegment>,
}

/// Result of an update/move: the folder and its parent's identity, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderDetail {
    pub folder: Folder,
    pub parent: Option<PathSegment>,
}
