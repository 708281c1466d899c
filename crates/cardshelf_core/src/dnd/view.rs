//! Displayed listing of one folder level.

use crate::dnd::intent::{DragPayload, DropIntent};
use crate::model::card::Card;
use crate::model::folder::{FolderId, FolderSummary, PathSegment};
use crate::model::shortcut::ShortcutEntry;
use crate::model::EntityKind;
use crate::repo::TreeStore;
use crate::service::{IdentityResolver, OrganizerResult, OrganizerService};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot of one level of the forest as a client shows it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingView {
    /// `None` for the root level.
    pub folder_id: Option<FolderId>,
    /// Root-first breadcrumb ending with `folder_id`; empty at the root.
    pub path: Vec<PathSegment>,
    pub folders: Vec<FolderSummary>,
    pub cards: Vec<Card>,
    pub shortcuts: Vec<ShortcutEntry>,
}

impl ListingView {
    /// Reads one level through the organizer.
    pub fn load<S, I>(
        service: &OrganizerService<S, I>,
        folder_id: Option<FolderId>,
    ) -> OrganizerResult<Self>
    where
        S: TreeStore,
        I: IdentityResolver,
    {
        let (path, shortcuts) = match folder_id {
            Some(id) => (
                service.get_folder_with_path(id)?.path,
                service.list_shortcuts(id)?,
            ),
            None => (Vec::new(), Vec::new()),
        };
        Ok(Self {
            folder_id,
            path,
            folders: service.list_folders(folder_id)?,
            cards: service.list_cards(folder_id)?,
            shortcuts,
        })
    }

    pub fn contains(&self, payload: DragPayload) -> bool {
        self.sibling_ids(payload.kind).contains(&payload.id)
    }

    /// Displayed order of one sibling group.
    pub fn sibling_ids(&self, kind: EntityKind) -> Vec<Uuid> {
        match kind {
            EntityKind::Folder => self.folders.iter().map(|row| row.folder.id).collect(),
            EntityKind::Card => self.cards.iter().map(|card| card.id).collect(),
            EntityKind::Shortcut => self
                .shortcuts
                .iter()
                .map(|entry| entry.shortcut.id)
                .collect(),
        }
    }

    /// Listing as it should look once `intent` succeeds.
    pub fn apply(&self, intent: &DropIntent) -> Self {
        let mut next = self.clone();
        match intent {
            DropIntent::MoveFolder { id, parent_id } => {
                next.folders.retain(|row| row.folder.id != *id);
                if let Some(row) = next.folder_row_mut(*parent_id) {
                    row.child_folder_count += 1;
                }
            }
            DropIntent::MoveCard { id, folder_id } => {
                next.cards.retain(|card| card.id != *id);
                if let Some(row) = next.folder_row_mut(*folder_id) {
                    row.card_count += 1;
                }
            }
            DropIntent::MoveShortcut { id, .. } => {
                next.shortcuts.retain(|entry| entry.shortcut.id != *id);
            }
            DropIntent::ReorderFolders { ordered_ids, .. } => {
                reorder_by(&mut next.folders, ordered_ids, |row| row.folder.id);
                for (order, row) in next.folders.iter_mut().enumerate() {
                    row.folder.sort_order = order as i64;
                }
            }
            DropIntent::ReorderCards { ordered_ids, .. } => {
                reorder_by(&mut next.cards, ordered_ids, |card| card.id);
                for (order, card) in next.cards.iter_mut().enumerate() {
                    card.sort_order = order as i64;
                }
            }
            DropIntent::ReorderShortcuts { ordered_ids, .. } => {
                reorder_by(&mut next.shortcuts, ordered_ids, |entry| entry.shortcut.id);
                for (order, entry) in next.shortcuts.iter_mut().enumerate() {
                    entry.shortcut.sort_order = order as i64;
                }
            }
        }
        next
    }

    fn folder_row_mut(&mut self, id: Option<FolderId>) -> Option<&mut FolderSummary> {
        let id = id?;
        self.folders.iter_mut().find(|row| row.folder.id == id)
    }
}

/// Rearranges `items` to follow `ordered_ids`; unlisted items keep their
/// relative order at the end.
fn reorder_by<T>(items: &mut Vec<T>, ordered_ids: &[Uuid], id_of: impl Fn(&T) -> Uuid) {
    let mut rest = std::mem::take(items);
    for id in ordered_ids {
        if let Some(position) = rest.iter().position(|item| id_of(item) == *id) {
            items.push(rest.remove(position));
        }
    }
    items.append(&mut rest);
}
