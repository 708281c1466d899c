//! Core domain logic for Cardshelf.
//! This crate is the single source of truth for folder forest invariants.

pub mod config;
pub mod db;
pub mod dnd;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tree;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::card::{Card, CardId, CardSummary};
pub use model::folder::{Folder, FolderDetail, FolderId, FolderSummary, FolderWithPath, PathSegment};
pub use model::owner::{InvalidOwnerId, OwnerId};
pub use model::shortcut::{Shortcut, ShortcutEntry, ShortcutId};
pub use model::EntityKind;
pub use repo::{FolderDeletion, SqliteTreeStore, TreeRepoError, TreeRepoResult, TreeStore};
pub use service::{
    ConflictReason, CreateCardRequest, CreateFolderRequest, ErrorBody, ErrorDetails, ErrorKind,
    FolderDeleteMode, IdentityResolver, OrganizerError, OrganizerResult, OrganizerService,
    ParentChange, StaticIdentity, StructuralViolation, UpdateCardRequest, UpdateFolderRequest,
    ValidationError,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
