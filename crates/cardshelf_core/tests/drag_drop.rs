use cardshelf_core::db::open_db_in_memory;
use cardshelf_core::dnd::{
    DragController, DragPayload, DropIntent, DropOutcome, DropRejection, DropTarget,
    ListingView, OrganizerClient,
};
use cardshelf_core::{
    Card, CreateCardRequest, CreateFolderRequest, EntityKind, ErrorBody, Folder, FolderId,
    OrganizerService, OwnerId, SqliteTreeStore, StaticIdentity,
};
use rusqlite::Connection;
use std::cell::RefCell;
use uuid::Uuid;

type Service<'conn> = OrganizerService<SqliteTreeStore<'conn>, StaticIdentity>;

fn service_for<'conn>(conn: &'conn Connection, owner: &str) -> Service<'conn> {
    OrganizerService::new(
        SqliteTreeStore::try_new(conn).unwrap(),
        StaticIdentity::authenticated(OwnerId::new(owner).unwrap()),
    )
}

fn folder(service: &Service<'_>, name: &str, parent_id: Option<FolderId>) -> Folder {
    service
        .create_folder(CreateFolderRequest {
            name: name.to_string(),
            parent_id,
            color: None,
        })
        .unwrap()
}

fn card(service: &Service<'_>, title: &str, folder_id: Option<FolderId>) -> Card {
    service
        .create_card(CreateCardRequest {
            title: title.to_string(),
            folder_id,
            color: None,
        })
        .unwrap()
}

fn drop_on<C: OrganizerClient>(
    controller: &mut DragController,
    client: &C,
    payload: DragPayload,
    target: DropTarget,
) -> DropOutcome {
    controller.begin_drag(payload);
    controller.hover(Some(target));
    controller.drop_active(client)
}

fn card_titles(view: &ListingView) -> Vec<String> {
    view.cards.iter().map(|card| card.title.clone()).collect()
}

/// Client that records every call and answers with a fixed result.
struct RecordingClient {
    calls: RefCell<Vec<String>>,
    failure: Option<ErrorBody>,
}

impl RecordingClient {
    fn succeeding() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            failure: None,
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            failure: Some(ErrorBody::message(message)),
        }
    }

    fn answer(&self, call: String) -> Result<(), ErrorBody> {
        self.calls.borrow_mut().push(call);
        match &self.failure {
            Some(body) => Err(body.clone()),
            None => Ok(()),
        }
    }
}

impl OrganizerClient for RecordingClient {
    fn load_listing(&self, _folder_id: Option<FolderId>) -> Result<ListingView, ErrorBody> {
        self.calls.borrow_mut().push("load_listing".to_string());
        Ok(ListingView::default())
    }

    fn move_folder(&self, id: FolderId, _parent_id: Option<FolderId>) -> Result<(), ErrorBody> {
        self.answer(format!("move_folder {id}"))
    }

    fn reorder_folders(
        &self,
        _parent_id: Option<FolderId>,
        ordered_ids: &[FolderId],
    ) -> Result<(), ErrorBody> {
        self.answer(format!("reorder_folders {}", ordered_ids.len()))
    }

    fn move_card(&self, id: Uuid, _folder_id: Option<FolderId>) -> Result<(), ErrorBody> {
        self.answer(format!("move_card {id}"))
    }

    fn reorder_cards(
        &self,
        _folder_id: Option<FolderId>,
        ordered_ids: &[Uuid],
    ) -> Result<(), ErrorBody> {
        self.answer(format!("reorder_cards {}", ordered_ids.len()))
    }

    fn move_shortcut(&self, id: Uuid, _folder_id: FolderId) -> Result<(), ErrorBody> {
        self.answer(format!("move_shortcut {id}"))
    }

    fn reorder_shortcuts(
        &self,
        _folder_id: FolderId,
        ordered_ids: &[Uuid],
    ) -> Result<(), ErrorBody> {
        self.answer(format!("reorder_shortcuts {}", ordered_ids.len()))
    }
}

#[test]
fn drop_into_folder_moves_card_and_survives_refresh() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "owner-a");
    let inbox = folder(&service, "Inbox", None);
    let loose = card(&service, "Loose", None);
    card(&service, "Stays", None);

    let mut controller = DragController::new(ListingView::load(&service, None).unwrap());
    let outcome = drop_on(
        &mut controller,
        &service,
        DragPayload::card(loose.id),
        DropTarget::Into {
            folder_id: inbox.id,
        },
    );
    assert_eq!(
        outcome,
        DropOutcome::Applied(DropIntent::MoveCard {
            id: loose.id,
            folder_id: Some(inbox.id),
        })
    );
    assert_eq!(card_titles(controller.displayed()), vec!["Stays"]);
    assert_eq!(controller.displayed().folders[0].card_count, 1);
    assert!(controller.active().is_none());
    assert!(controller.last_error().is_none());

    controller.refresh(&service).unwrap();
    assert_eq!(card_titles(controller.displayed()), vec!["Stays"]);
    assert_eq!(controller.confirmed().folders[0].card_count, 1);
    assert_eq!(service.get_card(loose.id).unwrap().folder_id, Some(inbox.id));
}

#[test]
fn drop_folder_into_sibling_folder_nests_it() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "owner-a");
    let outer = folder(&service, "Outer", None);
    let moving = folder(&service, "Moving", None);

    let mut controller = DragController::new(ListingView::load(&service, None).unwrap());
    let outcome = drop_on(
        &mut controller,
        &service,
        DragPayload::folder(moving.id),
        DropTarget::Into {
            folder_id: outer.id,
        },
    );
    assert!(matches!(outcome, DropOutcome::Applied(DropIntent::MoveFolder { .. })));
    assert_eq!(controller.displayed().folders.len(), 1);
    assert_eq!(controller.displayed().folders[0].child_folder_count, 1);
    assert_eq!(service.get_folder(moving.id).unwrap().parent_id, Some(outer.id));
}

#[test]
fn sibling_drop_reorders_cards_densely() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "owner-a");
    let box_folder = folder(&service, "Box", None);
    card(&service, "X", Some(box_folder.id));
    card(&service, "Y", Some(box_folder.id));
    let z = card(&service, "Z", Some(box_folder.id));
    let x_id = service.list_cards(Some(box_folder.id)).unwrap()[0].id;

    let mut controller =
        DragController::new(ListingView::load(&service, Some(box_folder.id)).unwrap());
    let outcome = drop_on(
        &mut controller,
        &service,
        DragPayload::card(z.id),
        DropTarget::Sibling {
            kind: EntityKind::Card,
            id: x_id,
        },
    );
    assert!(matches!(outcome, DropOutcome::Applied(DropIntent::ReorderCards { .. })));
    assert_eq!(card_titles(controller.displayed()), vec!["Z", "X", "Y"]);

    let stored: Vec<(String, i64)> = service
        .list_cards(Some(box_folder.id))
        .unwrap()
        .into_iter()
        .map(|card| (card.title, card.sort_order))
        .collect();
    assert_eq!(
        stored,
        vec![
            ("Z".to_string(), 0),
            ("X".to_string(), 1),
            ("Y".to_string(), 2),
        ]
    );
}

#[test]
fn folder_dropped_on_itself_is_rejected_without_a_call() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "owner-a");
    let only = folder(&service, "Only", None);
    let view = ListingView::load(&service, None).unwrap();
    let client = RecordingClient::succeeding();

    let mut controller = DragController::new(view.clone());
    let outcome = drop_on(
        &mut controller,
        &client,
        DragPayload::folder(only.id),
        DropTarget::Into { folder_id: only.id },
    );
    assert_eq!(outcome, DropOutcome::Rejected(DropRejection::FolderIntoItself));
    assert_eq!(controller.last_error(), Some("cannot nest a folder in itself"));
    assert_eq!(controller.displayed(), &view);
    assert!(client.calls.borrow().is_empty());
}

#[test]
fn failed_call_reverts_listing_and_keeps_message() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "owner-a");
    let inbox = folder(&service, "Inbox", None);
    let loose = card(&service, "Loose", None);
    let view = ListingView::load(&service, None).unwrap();
    let client = RecordingClient::failing("server says no");

    let mut controller = DragController::new(view.clone());
    let outcome = drop_on(
        &mut controller,
        &client,
        DragPayload::card(loose.id),
        DropTarget::Into {
            folder_id: inbox.id,
        },
    );
    match outcome {
        DropOutcome::Failed(body) => assert_eq!(body.error, "server says no"),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(controller.displayed(), &view);
    assert_eq!(controller.confirmed(), &view);
    assert_eq!(controller.last_error(), Some("server says no"));
    assert_eq!(*client.calls.borrow(), vec![format!("move_card {}", loose.id)]);
}

#[test]
fn stale_listing_gets_not_found_and_reverts() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "owner-a");
    let target = folder(&service, "Target", None);
    let doomed = card(&service, "Doomed", None);
    let view = ListingView::load(&service, None).unwrap();
    service.delete_card(doomed.id).unwrap();

    let mut controller = DragController::new(view.clone());
    let outcome = drop_on(
        &mut controller,
        &service,
        DragPayload::card(doomed.id),
        DropTarget::Into {
            folder_id: target.id,
        },
    );
    match outcome {
        DropOutcome::Failed(body) => assert_eq!(body.error, "card not found"),
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(controller.displayed(), &view);

    controller.refresh(&service).unwrap();
    assert!(controller.displayed().cards.is_empty());
}

#[test]
fn drops_that_change_nothing_make_no_call() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "owner-a");
    let top = folder(&service, "Top", None);
    let resident = card(&service, "Resident", Some(top.id));
    let client = RecordingClient::succeeding();
    let mut controller = DragController::new(ListingView::load(&service, Some(top.id)).unwrap());

    assert_eq!(controller.drop_active(&client), DropOutcome::Idle);

    controller.begin_drag(DragPayload::card(resident.id));
    controller.hover(None);
    assert_eq!(controller.drop_active(&client), DropOutcome::Ignored);

    let outcome = drop_on(
        &mut controller,
        &client,
        DragPayload::card(resident.id),
        DropTarget::Breadcrumb { depth: 0 },
    );
    assert_eq!(outcome, DropOutcome::Ignored);

    let outcome = drop_on(
        &mut controller,
        &client,
        DragPayload::card(resident.id),
        DropTarget::Sibling {
            kind: EntityKind::Card,
            id: resident.id,
        },
    );
    assert_eq!(outcome, DropOutcome::Ignored);
    assert!(client.calls.borrow().is_empty());
}

#[test]
fn hover_without_drag_is_ignored_and_cancel_clears_state() {
    let mut controller = DragController::new(ListingView::default());
    controller.hover(Some(DropTarget::Root));
    assert!(controller.over().is_none());

    controller.begin_drag(DragPayload::card(Uuid::new_v4()));
    controller.hover(Some(DropTarget::Root));
    assert_eq!(controller.over(), Some(DropTarget::Root));
    controller.cancel();
    assert!(controller.active().is_none());
    assert!(controller.over().is_none());
}

#[test]
fn card_dropped_on_breadcrumb_ancestor_moves_up() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "owner-a");
    let top = folder(&service, "Top", None);
    let middle = folder(&service, "Middle", Some(top.id));
    let leaf = folder(&service, "Leaf", Some(middle.id));
    let deep = card(&service, "Deep", Some(leaf.id));

    let view = ListingView::load(&service, Some(leaf.id)).unwrap();
    let names: Vec<&str> = view.path.iter().map(|segment| segment.name.as_str()).collect();
    assert_eq!(names, vec!["Top", "Middle", "Leaf"]);

    let mut controller = DragController::new(view);
    let outcome = drop_on(
        &mut controller,
        &service,
        DragPayload::card(deep.id),
        DropTarget::Breadcrumb { depth: 0 },
    );
    assert_eq!(
        outcome,
        DropOutcome::Applied(DropIntent::MoveCard {
            id: deep.id,
            folder_id: Some(top.id),
        })
    );
    assert_eq!(service.get_card(deep.id).unwrap().folder_id, Some(top.id));
    assert!(controller.displayed().cards.is_empty());
}

#[test]
fn shortcut_cannot_be_dropped_at_root() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "owner-a");
    let favourites = folder(&service, "Favourites", None);
    let recipe = card(&service, "Recipe", None);
    let shortcut = service.create_shortcut(favourites.id, recipe.id).unwrap();
    let client = RecordingClient::succeeding();

    let mut controller =
        DragController::new(ListingView::load(&service, Some(favourites.id)).unwrap());
    let outcome = drop_on(
        &mut controller,
        &client,
        DragPayload::shortcut(shortcut.id),
        DropTarget::Root,
    );
    assert_eq!(outcome, DropOutcome::Rejected(DropRejection::ShortcutAtRoot));
    assert_eq!(controller.displayed().shortcuts.len(), 1);
    assert!(client.calls.borrow().is_empty());
}

#[test]
fn sibling_zone_of_other_kind_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "owner-a");
    let shelf = folder(&service, "Shelf", None);
    let loose = card(&service, "Loose", None);
    let client = RecordingClient::succeeding();

    let mut controller = DragController::new(ListingView::load(&service, None).unwrap());
    let outcome = drop_on(
        &mut controller,
        &client,
        DragPayload::card(loose.id),
        DropTarget::Sibling {
            kind: EntityKind::Folder,
            id: shelf.id,
        },
    );
    assert_eq!(outcome, DropOutcome::Rejected(DropRejection::KindMismatch));

    let outcome = drop_on(
        &mut controller,
        &client,
        DragPayload::card(Uuid::new_v4()),
        DropTarget::Root,
    );
    assert_eq!(outcome, DropOutcome::Rejected(DropRejection::NotInListing));
    assert!(client.calls.borrow().is_empty());
}
