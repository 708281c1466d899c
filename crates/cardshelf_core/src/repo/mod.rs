//! Tree store: persistence for folders, cards and shortcuts.
//!
//! # Responsibility
//! - Define the storage contracts the organizer service depends on.
//! - Keep SQL, transactions and row parsing behind those contracts.
//!
//! # Invariants
//! - Every query is scoped by owner id.
//! - Repositories return semantic errors (`NodeNotFound`, `GroupMismatch`,
//!   `DuplicateShortcut`) next to transport errors.

mod card_repo;
mod folder_repo;
mod shortcut_repo;
pub mod tree_store;

pub use tree_store::{
    CardChanges, CardRepository, FolderChanges, FolderDeletion, FolderRepository, OrderSlot,
    Placement, ShortcutRepository, SqliteTreeStore, TreeRepoError, TreeRepoResult, TreeStore,
};
