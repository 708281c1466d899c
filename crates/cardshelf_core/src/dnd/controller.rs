//! Drag state machine with optimistic updates.

use crate::dnd::intent::{classify, DragPayload, DropIntent, DropRejection, DropTarget};
use crate::dnd::view::ListingView;
use crate::model::card::CardId;
use crate::model::folder::FolderId;
use crate::model::shortcut::ShortcutId;
use crate::repo::TreeStore;
use crate::service::{
    ErrorBody, IdentityResolver, OrganizerError, OrganizerService, UpdateFolderRequest,
};
use log::{debug, warn};

/// Organizer calls a drag controller can issue.
///
/// Errors arrive as the wire body so remote clients and the in-process
/// service look the same.
pub trait OrganizerClient {
    fn load_listing(&self, folder_id: Option<FolderId>) -> Result<ListingView, ErrorBody>;
    fn move_folder(&self, id: FolderId, parent_id: Option<FolderId>) -> Result<(), ErrorBody>;
    fn reorder_folders(
        &self,
        parent_id: Option<FolderId>,
        ordered_ids: &[FolderId],
    ) -> Result<(), ErrorBody>;
    fn move_card(&self, id: CardId, folder_id: Option<FolderId>) -> Result<(), ErrorBody>;
    fn reorder_cards(
        &self,
        folder_id: Option<FolderId>,
        ordered_ids: &[CardId],
    ) -> Result<(), ErrorBody>;
    fn move_shortcut(&self, id: ShortcutId, folder_id: FolderId) -> Result<(), ErrorBody>;
    fn reorder_shortcuts(
        &self,
        folder_id: FolderId,
        ordered_ids: &[ShortcutId],
    ) -> Result<(), ErrorBody>;
}

impl<S: TreeStore, I: IdentityResolver> OrganizerClient for OrganizerService<S, I> {
    fn load_listing(&self, folder_id: Option<FolderId>) -> Result<ListingView, ErrorBody> {
        ListingView::load(self, folder_id).map_err(|err| err.to_body())
    }

    fn move_folder(&self, id: FolderId, parent_id: Option<FolderId>) -> Result<(), ErrorBody> {
        body(self.update_folder(id, UpdateFolderRequest::move_to(parent_id)))
    }

    fn reorder_folders(
        &self,
        parent_id: Option<FolderId>,
        ordered_ids: &[FolderId],
    ) -> Result<(), ErrorBody> {
        body(OrganizerService::reorder_folders(self, parent_id, ordered_ids))
    }

    fn move_card(&self, id: CardId, folder_id: Option<FolderId>) -> Result<(), ErrorBody> {
        body(OrganizerService::move_card(self, id, folder_id))
    }

    fn reorder_cards(
        &self,
        folder_id: Option<FolderId>,
        ordered_ids: &[CardId],
    ) -> Result<(), ErrorBody> {
        body(OrganizerService::reorder_cards(self, folder_id, ordered_ids))
    }

    fn move_shortcut(&self, id: ShortcutId, folder_id: FolderId) -> Result<(), ErrorBody> {
        body(OrganizerService::move_shortcut(self, id, folder_id))
    }

    fn reorder_shortcuts(
        &self,
        folder_id: FolderId,
        ordered_ids: &[ShortcutId],
    ) -> Result<(), ErrorBody> {
        body(OrganizerService::reorder_shortcuts(
            self,
            folder_id,
            ordered_ids,
        ))
    }
}

fn body<T>(result: Result<T, OrganizerError>) -> Result<(), ErrorBody> {
    result.map(|_| ()).map_err(|err| err.to_body())
}

/// Issues the one call `intent` stands for.
pub fn dispatch<C: OrganizerClient + ?Sized>(
    client: &C,
    intent: &DropIntent,
) -> Result<(), ErrorBody> {
    match intent {
        DropIntent::MoveFolder { id, parent_id } => client.move_folder(*id, *parent_id),
        DropIntent::ReorderFolders {
            parent_id,
            ordered_ids,
        } => client.reorder_folders(*parent_id, ordered_ids),
        DropIntent::MoveCard { id, folder_id } => client.move_card(*id, *folder_id),
        DropIntent::ReorderCards {
            folder_id,
            ordered_ids,
        } => client.reorder_cards(*folder_id, ordered_ids),
        DropIntent::MoveShortcut { id, folder_id } => client.move_shortcut(*id, *folder_id),
        DropIntent::ReorderShortcuts {
            folder_id,
            ordered_ids,
        } => client.reorder_shortcuts(*folder_id, ordered_ids),
    }
}

/// What a drop did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// No drag was active.
    Idle,
    /// No target, or the drop changes nothing.
    Ignored,
    /// Refused locally; no call was made.
    Rejected(DropRejection),
    /// Call succeeded; the optimistic listing stands.
    Applied(DropIntent),
    /// Call failed; the listing reverted to the confirmed state.
    Failed(ErrorBody),
}

/// Tracks the dragged node, the hovered zone and two listings: the last
/// server-confirmed one and the one on screen.
#[derive(Debug, Clone)]
pub struct DragController {
    confirmed: ListingView,
    displayed: ListingView,
    active: Option<DragPayload>,
    over: Option<DropTarget>,
    last_error: Option<String>,
}

impl DragController {
    pub fn new(view: ListingView) -> Self {
        Self {
            displayed: view.clone(),
            confirmed: view,
            active: None,
            over: None,
            last_error: None,
        }
    }

    pub fn displayed(&self) -> &ListingView {
        &self.displayed
    }

    pub fn confirmed(&self) -> &ListingView {
        &self.confirmed
    }

    pub fn active(&self) -> Option<DragPayload> {
        self.active
    }

    pub fn over(&self) -> Option<DropTarget> {
        self.over
    }

    /// Message of the last failed or rejected drop, shown verbatim.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn begin_drag(&mut self, payload: DragPayload) {
        self.active = Some(payload);
        self.over = None;
        self.last_error = None;
    }

    /// Pointer moved over `target`; `None` when it left every zone.
    pub fn hover(&mut self, target: Option<DropTarget>) {
        if self.active.is_some() {
            self.over = target;
        }
    }

    pub fn cancel(&mut self) {
        self.active = None;
        self.over = None;
    }

    /// Ends the drag over the hovered zone.
    pub fn drop_active<C: OrganizerClient + ?Sized>(&mut self, client: &C) -> DropOutcome {
        let Some(payload) = self.active.take() else {
            return DropOutcome::Idle;
        };
        let Some(target) = self.over.take() else {
            return DropOutcome::Ignored;
        };

        let intent = match classify(&self.displayed, payload, target) {
            Ok(Some(intent)) => intent,
            Ok(None) => return DropOutcome::Ignored,
            Err(rejection) => {
                debug!(
                    "event=drop_classify module=dnd status=rejected kind={} id={}",
                    payload.kind.as_str(),
                    payload.id
                );
                self.last_error = Some(rejection.to_string());
                return DropOutcome::Rejected(rejection);
            }
        };

        self.displayed = self.displayed.apply(&intent);
        match dispatch(client, &intent) {
            Ok(()) => {
                self.confirmed = self.displayed.clone();
                DropOutcome::Applied(intent)
            }
            Err(body) => {
                warn!(
                    "event=drop_apply module=dnd status=error kind={} id={}",
                    payload.kind.as_str(),
                    payload.id
                );
                self.displayed = self.confirmed.clone();
                self.last_error = Some(body.error.clone());
                DropOutcome::Failed(body)
            }
        }
    }

    /// Adopts a server listing as both confirmed and displayed state.
    pub fn confirm(&mut self, view: ListingView) {
        self.displayed = view.clone();
        self.confirmed = view;
    }

    /// Reloads the current level from `client` and confirms it.
    pub fn refresh<C: OrganizerClient + ?Sized>(&mut self, client: &C) -> Result<(), ErrorBody> {
        let view = client.load_listing(self.confirmed.folder_id)?;
        self.confirm(view);
        Ok(())
    }
}
