use cardshelf_core::db::open_db_in_memory;
use cardshelf_core::service::ConflictReason;
use cardshelf_core::{
    CreateCardRequest, CreateFolderRequest, EntityKind, ErrorKind, Folder, FolderId,
    OrganizerError, OrganizerService, OwnerId, SqliteTreeStore, StaticIdentity,
    UpdateFolderRequest,
};
use rusqlite::Connection;
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

fn listed(service: &Service<'_>, parent_id: Option<FolderId>) -> Vec<(FolderId, i64)> {
    service
        .list_folders(parent_id)
        .unwrap()
        .into_iter()
        .map(|row| (row.folder.id, row.folder.sort_order))
        .collect()
}

#[test]
fn reorder_xyz_to_zxy_writes_dense_orders() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "alice");
    let x = folder(&service, "X", None);
    let y = folder(&service, "Y", None);
    let z = folder(&service, "Z", None);

    service.reorder_folders(None, &[z.id, x.id, y.id]).unwrap();

    assert_eq!(listed(&service, None), vec![(z.id, 0), (x.id, 1), (y.id, 2)]);
}

#[test]
fn reorder_closes_gaps_left_by_explicit_orders() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "alice");
    let parent = folder(&service, "Parent", None);
    let a = folder(&service, "A", Some(parent.id));
    let b = folder(&service, "B", Some(parent.id));
    for (id, order) in [(a.id, 5), (b.id, 9)] {
        service
            .update_folder(
                id,
                UpdateFolderRequest {
                    order: Some(order),
                    ..UpdateFolderRequest::default()
                },
            )
            .unwrap();
    }

    service.reorder_folders(Some(parent.id), &[b.id, a.id]).unwrap();

    assert_eq!(listed(&service, Some(parent.id)), vec![(b.id, 0), (a.id, 1)]);
}

#[test]
fn membership_mismatch_is_a_conflict_and_applies_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "alice");
    let x = folder(&service, "X", None);
    let y = folder(&service, "Y", None);
    let other_group = folder(&service, "Nested", Some(x.id));
    let before = listed(&service, None);

    let missing = service.reorder_folders(None, &[y.id]).unwrap_err();
    match &missing {
        OrganizerError::Conflict(ConflictReason::ReorderMismatch { kind, mismatch }) => {
            assert_eq!(*kind, EntityKind::Folder);
            assert_eq!(mismatch.missing, vec![x.id]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(missing.status_code(), 409);

    let duplicated = service
        .reorder_folders(None, &[y.id, x.id, y.id])
        .unwrap_err();
    assert_eq!(duplicated.kind(), ErrorKind::Conflict);

    let wrong_group = service
        .reorder_folders(None, &[x.id, y.id, other_group.id])
        .unwrap_err();
    match wrong_group {
        OrganizerError::Conflict(ConflictReason::ReorderMismatch { mismatch, .. }) => {
            assert_eq!(mismatch.unexpected, vec![other_group.id]);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(listed(&service, None), before);
}

#[test]
fn unknown_or_foreign_ids_are_not_found() {
    let conn = open_db_in_memory().unwrap();
    let alice = service_for(&conn, "alice");
    let bob = service_for(&conn, "bob");
    let x = folder(&alice, "X", None);
    let foreign = folder(&bob, "Bob's", None);

    let ghost = Uuid::new_v4();
    let err = alice.reorder_folders(None, &[x.id, ghost]).unwrap_err();
    assert!(matches!(err, OrganizerError::NotFound { id, .. } if id == ghost));

    let err = alice.reorder_folders(None, &[x.id, foreign.id]).unwrap_err();
    assert!(matches!(err, OrganizerError::NotFound { id, .. } if id == foreign.id));

    let err = alice.reorder_folders(Some(foreign.id), &[]).unwrap_err();
    assert!(matches!(
        err,
        OrganizerError::NotFound {
            kind: EntityKind::Folder,
            ..
        }
    ));
}

#[test]
fn empty_group_with_empty_request_is_a_no_op() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "alice");
    let leaf = folder(&service, "Leaf", None);

    service.reorder_folders(Some(leaf.id), &[]).unwrap();
    service.reorder_cards(Some(leaf.id), &[]).unwrap();
}

#[test]
fn card_orders_are_independent_of_folder_orders() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "alice");
    let parent = folder(&service, "Parent", None);
    folder(&service, "Sub", Some(parent.id));
    let cards: Vec<_> = ["One", "Two", "Three"]
        .into_iter()
        .map(|title| {
            service
                .create_card(CreateCardRequest {
                    title: title.to_string(),
                    folder_id: Some(parent.id),
                    color: None,
                })
                .unwrap()
        })
        .collect();
    assert_eq!(cards[0].sort_order, 0);

    service
        .reorder_cards(Some(parent.id), &[cards[2].id, cards[0].id, cards[1].id])
        .unwrap();

    let listed: Vec<_> = service
        .list_cards(Some(parent.id))
        .unwrap()
        .into_iter()
        .map(|card| (card.title, card.sort_order))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("Three".to_string(), 0),
            ("One".to_string(), 1),
            ("Two".to_string(), 2)
        ]
    );
    assert_eq!(service.list_folders(Some(parent.id)).unwrap()[0].folder.sort_order, 0);
}

#[test]
fn failing_row_update_rolls_back_the_whole_batch() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "alice");
    let x = folder(&service, "X", None);
    let y = folder(&service, "Y", None);
    let z = folder(&service, "Z", None);
    let before = listed(&service, None);

    conn.execute_batch(&format!(
        "CREATE TRIGGER folders_fail_sort_update_test
         BEFORE UPDATE OF sort_order ON folders
         WHEN NEW.id = '{}'
         BEGIN
             SELECT RAISE(ABORT, 'forced sort failure');
         END;",
        y.id
    ))
    .unwrap();

    let err = service.reorder_folders(None, &[z.id, x.id, y.id]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert_eq!(err.to_body().error, "internal error");
    assert_eq!(listed(&service, None), before);
}
