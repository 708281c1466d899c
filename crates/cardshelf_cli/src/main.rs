//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `cardshelf_core` linkage and print the version.
//! - Given an owner id argument, print that owner's folder forest from the
//!   configured database.

use cardshelf_core::db::open_db;
use cardshelf_core::{
    init_from_config, CoreConfig, FolderId, OrganizerService, OwnerId, SqliteTreeStore,
    StaticIdentity, TreeStore,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("cardshelf_core ping={}", cardshelf_core::ping());
    println!("cardshelf_core version={}", cardshelf_core::core_version());

    let Some(raw_owner) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    match print_forest(&raw_owner) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn print_forest(raw_owner: &str) -> Result<(), String> {
    let owner = OwnerId::new(raw_owner).map_err(|err| err.to_string())?;
    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    init_from_config(&config).map_err(|err| err.to_string())?;

    println!("db_path={}", config.db_path.display());
    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let store = SqliteTreeStore::try_new(&conn).map_err(|err| err.to_string())?;
    let service = OrganizerService::new(store, StaticIdentity::authenticated(owner));
    print_level(&service, None, 0)
}

fn print_level<S: TreeStore>(
    service: &OrganizerService<S, StaticIdentity>,
    folder_id: Option<FolderId>,
    depth: usize,
) -> Result<(), String> {
    let indent = "  ".repeat(depth);
    for row in service
        .list_folders(folder_id)
        .map_err(|err| err.to_string())?
    {
        println!(
            "{indent}[{}] {} ({} folders, {} cards)",
            row.folder.sort_order, row.folder.name, row.child_folder_count, row.card_count
        );
        print_level(service, Some(row.folder.id), depth + 1)?;
    }
    for card in service.list_cards(folder_id).map_err(|err| err.to_string())? {
        println!(
            "{indent}- [{}] {} ({} sections)",
            card.sort_order, card.title, card.section_count
        );
    }
    if let Some(folder_id) = folder_id {
        for entry in service
            .list_shortcuts(folder_id)
            .map_err(|err| err.to_string())?
        {
            println!("{indent}> [{}] {}", entry.shortcut.sort_order, entry.card.title);
        }
    }
    Ok(())
}
