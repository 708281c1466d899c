use cardshelf_core::db::open_db_in_memory;
use cardshelf_core::{
    Card, CreateCardRequest, CreateFolderRequest, ErrorKind, Folder, FolderDeleteMode, FolderId,
    OrganizerService, OwnerId, SqliteTreeStore, StaticIdentity,
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

fn card(service: &Service<'_>, title: &str, folder_id: Option<FolderId>) -> Card {
    service
        .create_card(CreateCardRequest {
            title: title.to_string(),
            folder_id,
            color: None,
        })
        .unwrap()
}

fn folder_names(service: &Service<'_>, parent_id: Option<FolderId>) -> Vec<(String, i64)> {
    service
        .list_folders(parent_id)
        .unwrap()
        .into_iter()
        .map(|summary| (summary.folder.name, summary.folder.sort_order))
        .collect()
}

fn card_titles(service: &Service<'_>, folder_id: Option<FolderId>) -> Vec<(String, i64)> {
    service
        .list_cards(folder_id)
        .unwrap()
        .into_iter()
        .map(|card| (card.title, card.sort_order))
        .collect()
}

#[test]
fn dissolve_reattaches_children_and_cards_to_root() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "owner-a");
    folder(&service, "Keep", None);
    let doomed = folder(&service, "Doomed", None);
    let inner_a = folder(&service, "Inner A", Some(doomed.id));
    folder(&service, "Inner B", Some(doomed.id));
    folder(&service, "Grandchild", Some(inner_a.id));
    card(&service, "Loose", None);
    card(&service, "Inside 1", Some(doomed.id));
    card(&service, "Inside 2", Some(doomed.id));

    let deletion = service
        .delete_folder(doomed.id, Some(FolderDeleteMode::Dissolve))
        .unwrap();
    assert_eq!(deletion.removed_folders, 1);
    assert_eq!(deletion.removed_cards, 0);
    assert_eq!(deletion.reattached_folders, 2);
    assert_eq!(deletion.reattached_cards, 2);

    assert_eq!(
        folder_names(&service, None),
        vec![
            ("Keep".to_string(), 0),
            ("Inner A".to_string(), 1),
            ("Inner B".to_string(), 2),
        ]
    );
    assert_eq!(
        card_titles(&service, None),
        vec![
            ("Loose".to_string(), 0),
            ("Inside 1".to_string(), 1),
            ("Inside 2".to_string(), 2),
        ]
    );
    assert_eq!(
        folder_names(&service, Some(inner_a.id)),
        vec![("Grandchild".to_string(), 0)]
    );
    assert_eq!(service.get_folder(doomed.id).unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn dissolve_nested_folder_moves_contents_to_its_parent() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "owner-a");
    let top = folder(&service, "Top", None);
    folder(&service, "Sibling", Some(top.id));
    let doomed = folder(&service, "Doomed", Some(top.id));
    folder(&service, "Child", Some(doomed.id));
    let resident = card(&service, "Resident", Some(doomed.id));

    service
        .delete_folder(doomed.id, Some(FolderDeleteMode::Dissolve))
        .unwrap();

    let names: Vec<String> = folder_names(&service, Some(top.id))
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["Sibling", "Child"]);
    assert_eq!(
        service.get_card(resident.id).unwrap().folder_id,
        Some(top.id)
    );
}

#[test]
fn dissolve_drops_shortcuts_living_in_the_folder() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "owner-a");
    let doomed = folder(&service, "Doomed", None);
    let other = folder(&service, "Other", None);
    let recipe = card(&service, "Recipe", None);
    service.create_shortcut(doomed.id, recipe.id).unwrap();
    service.create_shortcut(other.id, recipe.id).unwrap();

    service
        .delete_folder(doomed.id, Some(FolderDeleteMode::Dissolve))
        .unwrap();

    let shortcut_rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM shortcuts;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(shortcut_rows, 1);
    assert_eq!(service.list_shortcuts(other.id).unwrap().len(), 1);
    assert_eq!(service.get_card(recipe.id).unwrap().title, "Recipe");
}

#[test]
fn cascade_removes_subtree_cards_and_their_shortcuts() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "owner-a");
    let survivor = folder(&service, "Survivor", None);
    let doomed = folder(&service, "Doomed", None);
    let child = folder(&service, "Child", Some(doomed.id));
    let grandchild = folder(&service, "Grandchild", Some(child.id));
    let inside = card(&service, "Inside", Some(doomed.id));
    let deep = card(&service, "Deep", Some(grandchild.id));
    let outside = card(&service, "Outside", Some(survivor.id));
    service.create_shortcut(survivor.id, deep.id).unwrap();
    service.create_shortcut(child.id, outside.id).unwrap();

    let deletion = service
        .delete_folder(doomed.id, Some(FolderDeleteMode::Cascade))
        .unwrap();
    assert_eq!(deletion.removed_folders, 3);
    assert_eq!(deletion.removed_cards, 2);
    assert_eq!(deletion.reattached_folders, 0);
    assert_eq!(deletion.reattached_cards, 0);

    for id in [doomed.id, child.id, grandchild.id] {
        assert_eq!(service.get_folder(id).unwrap_err().kind(), ErrorKind::NotFound);
    }
    for id in [inside.id, deep.id] {
        assert_eq!(service.get_card(id).unwrap_err().kind(), ErrorKind::NotFound);
    }
    assert!(service.list_shortcuts(survivor.id).unwrap().is_empty());
    assert_eq!(service.get_card(outside.id).unwrap().folder_id, Some(survivor.id));
    assert_eq!(folder_names(&service, None), vec![("Survivor".to_string(), 0)]);
}

#[test]
fn configured_mode_applies_when_request_names_none() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "owner-a").with_delete_mode(FolderDeleteMode::Cascade);
    assert_eq!(service.delete_mode(), FolderDeleteMode::Cascade);
    let doomed = folder(&service, "Doomed", None);
    let resident = card(&service, "Resident", Some(doomed.id));

    let deletion = service.delete_folder(doomed.id, None).unwrap();
    assert_eq!(deletion.removed_cards, 1);
    assert_eq!(service.get_card(resident.id).unwrap_err().kind(), ErrorKind::NotFound);

    let default_service = service_for(&conn, "owner-b");
    assert_eq!(default_service.delete_mode(), FolderDeleteMode::Dissolve);
    let kept = folder(&default_service, "Kept", None);
    let card_b = card(&default_service, "Card", Some(kept.id));
    default_service.delete_folder(kept.id, None).unwrap();
    assert_eq!(default_service.get_card(card_b.id).unwrap().folder_id, None);
}

#[test]
fn deleting_missing_folder_is_not_found_in_both_modes() {
    let conn = open_db_in_memory().unwrap();
    let service = service_for(&conn, "owner-a");
    for mode in [FolderDeleteMode::Dissolve, FolderDeleteMode::Cascade] {
        let err = service.delete_folder(Uuid::new_v4(), Some(mode)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
