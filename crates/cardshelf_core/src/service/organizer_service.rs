//! Move/reorder orchestrator.
//!
//! # Responsibility
//! - Resolve the requesting owner before anything touches the store.
//! - Validate input, run the cycle guard, and pick sibling placement.
//! - Translate repository failures into [`OrganizerError`] kinds.
//!
//! # Invariants
//! - Unauthenticated requests never reach the store.
//! - Folder moves are rejected, never silently dropped, when they would
//!   create a cycle.
//! - Moving into a different sibling group always appends.
//!
//! # See also
//! - `tree::cycle_guard` for the acyclicity walk.

use crate::model::card::{Card, CardId};
use crate::model::folder::{Folder, FolderDetail, FolderId, FolderSummary, FolderWithPath};
use crate::model::owner::OwnerId;
use crate::model::shortcut::{Shortcut, ShortcutEntry, ShortcutId};
use crate::model::EntityKind;
use crate::repo::{
    CardChanges, FolderChanges, FolderDeletion, OrderSlot, Placement, TreeStore,
};
use crate::service::error::{OrganizerError, OrganizerResult, StructuralViolation};
use crate::service::identity::IdentityResolver;
use crate::service::requests::{
    CreateCardRequest, CreateFolderRequest, FolderDeleteMode, ParentChange, UpdateCardRequest,
    UpdateFolderRequest,
};
use crate::service::validation::{
    check_order, check_section_count, normalize_color, normalize_color_change, normalize_label,
};
use crate::tree::cycle_guard::{check_move, MoveVerdict};
use crate::tree::path::resolve_path;
use log::{debug, error, warn};
use std::time::Instant;

/// Organizer facade over a tree store and an identity resolver.
pub struct OrganizerService<S: TreeStore, I: IdentityResolver> {
    store: S,
    identity: I,
    delete_mode: FolderDeleteMode,
}

impl<S: TreeStore, I: IdentityResolver> OrganizerService<S, I> {
    pub fn new(store: S, identity: I) -> Self {
        Self {
            store,
            identity,
            delete_mode: FolderDeleteMode::default(),
        }
    }

    /// Sets the mode used when `delete_folder` gets no explicit mode.
    pub fn with_delete_mode(mut self, mode: FolderDeleteMode) -> Self {
        self.delete_mode = mode;
        self
    }

    pub fn delete_mode(&self) -> FolderDeleteMode {
        self.delete_mode
    }

    pub fn create_folder(&self, request: CreateFolderRequest) -> OrganizerResult<Folder> {
        self.run("folder_create", |owner| {
            let name = normalize_label("name", &request.name)?;
            let color = normalize_color(request.color.as_deref())?;
            Ok(self
                .store
                .insert_folder(owner, request.parent_id, &name, color.as_deref())?)
        })
    }

    pub fn get_folder(&self, id: FolderId) -> OrganizerResult<Folder> {
        self.run("folder_get", |owner| self.require_folder(owner, id))
    }

    /// Folder plus its root-first breadcrumb ending with the folder itself.
    pub fn get_folder_with_path(&self, id: FolderId) -> OrganizerResult<FolderWithPath> {
        self.run("folder_get_path", |owner| {
            let folder = self.require_folder(owner, id)?;
            let path = resolve_path(&self.store, owner, id)?;
            Ok(FolderWithPath { folder, path })
        })
    }

    pub fn list_folders(&self, parent_id: Option<FolderId>) -> OrganizerResult<Vec<FolderSummary>> {
        self.run("folder_list", |owner| {
            if let Some(parent_id) = parent_id {
                self.require_folder(owner, parent_id)?;
            }
            Ok(self.store.list_folders(owner, parent_id)?)
        })
    }

    /// Renames, recolors, reorders or reparents one folder.
    ///
    /// Checks run in this order: nesting into itself, input shape, target
    /// existence, descendant cycle, new parent existence.
    pub fn update_folder(
        &self,
        id: FolderId,
        request: UpdateFolderRequest,
    ) -> OrganizerResult<FolderDetail> {
        self.run("folder_update", |owner| {
            if request.parent == ParentChange::Set(Some(id)) {
                return Err(StructuralViolation::IntoItself.into());
            }
            let name = request
                .name
                .as_deref()
                .map(|name| normalize_label("name", name))
                .transpose()?;
            let color = normalize_color_change(request.color.as_deref())?;
            let order = request.order.map(check_order).transpose()?;

            let current = self.require_folder(owner, id)?;
            if let ParentChange::Set(Some(parent_id)) = request.parent {
                match check_move(&self.store, owner, id, parent_id)? {
                    MoveVerdict::Allowed => {}
                    MoveVerdict::IntoItself => {
                        return Err(StructuralViolation::IntoItself.into())
                    }
                    MoveVerdict::IntoDescendant => {
                        return Err(StructuralViolation::IntoDescendant.into())
                    }
                }
                self.require_folder(owner, parent_id)?;
            }

            let effective_parent = match request.parent {
                ParentChange::Keep => current.parent_id,
                ParentChange::Set(parent_id) => parent_id,
            };
            let placement = if effective_parent != current.parent_id {
                Some(Placement {
                    parent_id: effective_parent,
                    slot: OrderSlot::Append,
                })
            } else {
                order.map(|order| Placement {
                    parent_id: current.parent_id,
                    slot: OrderSlot::Exact(order),
                })
            };

            let folder = self.store.update_folder(
                owner,
                id,
                &FolderChanges {
                    name,
                    color,
                    placement,
                },
            )?;
            let parent = match folder.parent_id {
                Some(parent_id) => self
                    .store
                    .get_folder(owner, parent_id)?
                    .map(|parent| parent.segment()),
                None => None,
            };
            Ok(FolderDetail { folder, parent })
        })
    }

    /// Rewrites one folder sibling group to the given sequence.
    pub fn reorder_folders(
        &self,
        parent_id: Option<FolderId>,
        ordered_ids: &[FolderId],
    ) -> OrganizerResult<()> {
        self.run("folder_reorder", |owner| {
            Ok(self.store.reorder_folders(owner, parent_id, ordered_ids)?)
        })
    }

    /// Deletes a folder with `mode`, or the configured default.
    pub fn delete_folder(
        &self,
        id: FolderId,
        mode: Option<FolderDeleteMode>,
    ) -> OrganizerResult<FolderDeletion> {
        self.run("folder_delete", |owner| {
            let deletion = match mode.unwrap_or(self.delete_mode) {
                FolderDeleteMode::Dissolve => self.store.delete_folder_dissolve(owner, id)?,
                FolderDeleteMode::Cascade => self.store.delete_folder_cascade(owner, id)?,
            };
            debug!(
                "event=folder_delete module=organizer status=ok mode={} removed_folders={} removed_cards={} reattached_folders={} reattached_cards={}",
                mode.unwrap_or(self.delete_mode).as_str(),
                deletion.removed_folders,
                deletion.removed_cards,
                deletion.reattached_folders,
                deletion.reattached_cards
            );
            Ok(deletion)
        })
    }

    pub fn create_card(&self, request: CreateCardRequest) -> OrganizerResult<Card> {
        self.run("card_create", |owner| {
            let title = normalize_label("title", &request.title)?;
            let color = normalize_color(request.color.as_deref())?;
            Ok(self
                .store
                .insert_card(owner, request.folder_id, &title, color.as_deref())?)
        })
    }

    pub fn get_card(&self, id: CardId) -> OrganizerResult<Card> {
        self.run("card_get", |owner| {
            self.store
                .get_card(owner, id)?
                .ok_or(OrganizerError::NotFound {
                    kind: EntityKind::Card,
                    id,
                })
        })
    }

    pub fn update_card(&self, id: CardId, request: UpdateCardRequest) -> OrganizerResult<Card> {
        self.run("card_update", |owner| {
            let changes = CardChanges {
                title: request
                    .title
                    .as_deref()
                    .map(|title| normalize_label("title", title))
                    .transpose()?,
                color: normalize_color_change(request.color.as_deref())?,
                section_count: request.section_count.map(check_section_count).transpose()?,
            };
            Ok(self.store.update_card(owner, id, &changes)?)
        })
    }

    /// Re-homes a card. No cycle check applies to cards.
    pub fn move_card(&self, id: CardId, folder_id: Option<FolderId>) -> OrganizerResult<Card> {
        self.run("card_move", |owner| {
            Ok(self.store.move_card(owner, id, folder_id)?)
        })
    }

    pub fn list_cards(&self, folder_id: Option<FolderId>) -> OrganizerResult<Vec<Card>> {
        self.run("card_list", |owner| {
            if let Some(folder_id) = folder_id {
                self.require_folder(owner, folder_id)?;
            }
            Ok(self.store.list_cards(owner, folder_id)?)
        })
    }

    pub fn reorder_cards(
        &self,
        folder_id: Option<FolderId>,
        ordered_ids: &[CardId],
    ) -> OrganizerResult<()> {
        self.run("card_reorder", |owner| {
            Ok(self.store.reorder_cards(owner, folder_id, ordered_ids)?)
        })
    }

    /// Deletes a card and every shortcut pointing at it.
    pub fn delete_card(&self, id: CardId) -> OrganizerResult<()> {
        self.run("card_delete", |owner| Ok(self.store.delete_card(owner, id)?))
    }

    pub fn create_shortcut(
        &self,
        folder_id: FolderId,
        card_id: CardId,
    ) -> OrganizerResult<Shortcut> {
        self.run("shortcut_create", |owner| {
            Ok(self.store.insert_shortcut(owner, folder_id, card_id)?)
        })
    }

    pub fn list_shortcuts(&self, folder_id: FolderId) -> OrganizerResult<Vec<ShortcutEntry>> {
        self.run("shortcut_list", |owner| {
            self.require_folder(owner, folder_id)?;
            Ok(self.store.list_shortcuts(owner, folder_id)?)
        })
    }

    pub fn move_shortcut(
        &self,
        id: ShortcutId,
        folder_id: FolderId,
    ) -> OrganizerResult<Shortcut> {
        self.run("shortcut_move", |owner| {
            Ok(self.store.move_shortcut(owner, id, folder_id)?)
        })
    }

    pub fn reorder_shortcuts(
        &self,
        folder_id: FolderId,
        ordered_ids: &[ShortcutId],
    ) -> OrganizerResult<()> {
        self.run("shortcut_reorder", |owner| {
            Ok(self.store.reorder_shortcuts(owner, folder_id, ordered_ids)?)
        })
    }

    /// Removes a shortcut; the card is untouched.
    pub fn delete_shortcut(&self, id: ShortcutId) -> OrganizerResult<()> {
        self.run("shortcut_delete", |owner| {
            Ok(self.store.delete_shortcut(owner, id)?)
        })
    }

    fn require_folder(&self, owner: &OwnerId, id: FolderId) -> OrganizerResult<Folder> {
        self.store
            .get_folder(owner, id)?
            .ok_or(OrganizerError::NotFound {
                kind: EntityKind::Folder,
                id,
            })
    }

    fn run<T>(
        &self,
        event: &'static str,
        operation: impl FnOnce(&OwnerId) -> OrganizerResult<T>,
    ) -> OrganizerResult<T> {
        let started = Instant::now();
        let result = match self.identity.resolve_owner() {
            Some(owner) => operation(&owner),
            None => Err(OrganizerError::Unauthenticated),
        };
        let duration_ms = started.elapsed().as_millis();
        match &result {
            Ok(_) => debug!(
                "event={event} module=organizer status=ok duration_ms={duration_ms}"
            ),
            Err(OrganizerError::Internal(err)) => error!(
                "event={event} module=organizer status=error duration_ms={duration_ms} error_code=internal error={err}"
            ),
            Err(err) => warn!(
                "event={event} module=organizer status=rejected duration_ms={duration_ms} error_code={}",
                err.kind().as_str()
            ),
        }
        result
    }
}
