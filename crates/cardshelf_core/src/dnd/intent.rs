//! Drop classification.

use crate::dnd::view::ListingView;
use crate::model::folder::FolderId;
use crate::model::EntityKind;
use crate::tree::order::move_index;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Node being dragged, tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragPayload {
    pub kind: EntityKind,
    pub id: Uuid,
}

impl DragPayload {
    pub fn folder(id: FolderId) -> Self {
        Self {
            kind: EntityKind::Folder,
            id,
        }
    }

    pub fn card(id: Uuid) -> Self {
        Self {
            kind: EntityKind::Card,
            id,
        }
    }

    pub fn shortcut(id: Uuid) -> Self {
        Self {
            kind: EntityKind::Shortcut,
            id,
        }
    }
}

/// Zone under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DropTarget {
    /// The owner's root level.
    Root,
    /// Breadcrumb entry `depth` of the listing path (0 = top-most folder).
    Breadcrumb { depth: usize },
    /// Position of a sibling row; the dragged node takes its index.
    Sibling { kind: EntityKind, id: Uuid },
    /// Body of a folder row; the dragged node goes inside it.
    Into { folder_id: FolderId },
}

/// One organizer call derived from a drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DropIntent {
    MoveFolder {
        id: FolderId,
        parent_id: Option<FolderId>,
    },
    ReorderFolders {
        parent_id: Option<FolderId>,
        ordered_ids: Vec<FolderId>,
    },
    MoveCard {
        id: Uuid,
        folder_id: Option<FolderId>,
    },
    ReorderCards {
        folder_id: Option<FolderId>,
        ordered_ids: Vec<Uuid>,
    },
    MoveShortcut {
        id: Uuid,
        folder_id: FolderId,
    },
    ReorderShortcuts {
        folder_id: FolderId,
        ordered_ids: Vec<Uuid>,
    },
}

/// Drop refused before any call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropRejection {
    FolderIntoItself,
    /// Shortcuts always live inside a folder.
    ShortcutAtRoot,
    /// Sibling zone of a different kind than the dragged node.
    KindMismatch,
    /// Dragged node is not part of the displayed listing.
    NotInListing,
    /// Breadcrumb depth or sibling id is not in the listing.
    UnknownTarget,
}

impl Display for DropRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FolderIntoItself => write!(f, "cannot nest a folder in itself"),
            Self::ShortcutAtRoot => write!(f, "shortcuts must stay inside a folder"),
            Self::KindMismatch => write!(f, "items can only be reordered among their own kind"),
            Self::NotInListing => write!(f, "dragged item is not in this listing"),
            Self::UnknownTarget => write!(f, "drop target is not in this listing"),
        }
    }
}

impl Error for DropRejection {}

/// Maps a drop to its organizer call.
///
/// `Ok(None)` means the drop changes nothing (same group, same position).
pub fn classify(
    view: &ListingView,
    payload: DragPayload,
    target: DropTarget,
) -> Result<Option<DropIntent>, DropRejection> {
    if !view.contains(payload) {
        return Err(DropRejection::NotInListing);
    }
    let current = view.folder_id;

    // Folder a root/breadcrumb/into zone resolves to; `None` is the root.
    let destination = match target {
        DropTarget::Root => Some(None),
        DropTarget::Breadcrumb { depth } => match view.path.get(depth) {
            Some(segment) => Some(Some(segment.id)),
            None => return Err(DropRejection::UnknownTarget),
        },
        DropTarget::Into { folder_id } => Some(Some(folder_id)),
        DropTarget::Sibling { .. } => None,
    };

    if let Some(destination) = destination {
        if payload.kind == EntityKind::Folder && destination == Some(payload.id) {
            return Err(DropRejection::FolderIntoItself);
        }
        if destination == current {
            return Ok(None);
        }
        return match payload.kind {
            EntityKind::Folder => Ok(Some(DropIntent::MoveFolder {
                id: payload.id,
                parent_id: destination,
            })),
            EntityKind::Card => Ok(Some(DropIntent::MoveCard {
                id: payload.id,
                folder_id: destination,
            })),
            EntityKind::Shortcut => match destination {
                Some(folder_id) => Ok(Some(DropIntent::MoveShortcut {
                    id: payload.id,
                    folder_id,
                })),
                None => Err(DropRejection::ShortcutAtRoot),
            },
        };
    }

    let DropTarget::Sibling { kind, id: over } = target else {
        return Ok(None);
    };
    if kind != payload.kind {
        return Err(DropRejection::KindMismatch);
    }
    if over == payload.id {
        return Ok(None);
    }

    let mut ordered_ids = view.sibling_ids(kind);
    let from = ordered_ids.iter().position(|id| *id == payload.id);
    let to = ordered_ids.iter().position(|id| *id == over);
    let (Some(from), Some(to)) = (from, to) else {
        return Err(DropRejection::UnknownTarget);
    };
    move_index(&mut ordered_ids, from, to);

    Ok(Some(match kind {
        EntityKind::Folder => DropIntent::ReorderFolders {
            parent_id: current,
            ordered_ids,
        },
        EntityKind::Card => DropIntent::ReorderCards {
            folder_id: current,
            ordered_ids,
        },
        EntityKind::Shortcut => match current {
            Some(folder_id) => DropIntent::ReorderShortcuts {
                folder_id,
                ordered_ids,
            },
            None => return Err(DropRejection::ShortcutAtRoot),
        },
    }))
}
