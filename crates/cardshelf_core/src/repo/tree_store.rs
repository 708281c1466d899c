//! Tree store contracts and the shared SQLite plumbing behind them.
//!
//! # Responsibility
//! - Define repository traits for folders, cards and shortcuts.
//! - Own the `SqliteTreeStore` handle and its connection readiness checks.
//! - Provide the transactional sibling-group reorder used by all three kinds.
//!
//! # Invariants
//! - Every statement filters by owner, directly or through the owning folder.
//! - Multi-row writes run inside one `IMMEDIATE` transaction; a dropped
//!   transaction rolls back.
//! - Listings are ordered by `sort_order ASC, created_at ASC, id ASC`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::card::{Card, CardId};
use crate::model::folder::{Folder, FolderId, FolderSummary};
use crate::model::owner::OwnerId;
use crate::model::shortcut::{Shortcut, ShortcutEntry, ShortcutId};
use crate::model::EntityKind;
use crate::tree::order::{check_membership, reindex, MembershipMismatch};
use rusqlite::{Connection, Row, ToSql};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Result type for tree store operations.
pub type TreeRepoResult<T> = Result<T, TreeRepoError>;

/// Errors from tree store operations.
#[derive(Debug)]
pub enum TreeRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Row does not exist for this owner.
    NodeNotFound { kind: EntityKind, id: Uuid },
    /// Reorder request does not name exactly the live sibling group.
    GroupMismatch {
        kind: EntityKind,
        mismatch: MembershipMismatch<Uuid>,
    },
    /// `(folder_id, card_id)` already has a shortcut.
    DuplicateShortcut { folder_id: FolderId, card_id: CardId },
    /// Reparenting `id` under `parent_id` would close a loop in the
    /// committed forest.
    CycleRejected { id: FolderId, parent_id: FolderId },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// `PRAGMA foreign_keys` is off; cascades would silently not happen.
    ForeignKeysDisabled,
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl Display for TreeRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NodeNotFound { kind, id } => write!(f, "{} not found: {id}", kind.as_str()),
            Self::GroupMismatch { kind, mismatch } => write!(
                f,
                "{} reorder does not match sibling group: {} missing, {} unexpected, {} duplicated",
                kind.as_str(),
                mismatch.missing.len(),
                mismatch.unexpected.len(),
                mismatch.duplicated.len()
            ),
            Self::DuplicateShortcut { folder_id, card_id } => write!(
                f,
                "shortcut already exists for card {card_id} in folder {folder_id}"
            ),
            Self::CycleRejected { id, parent_id } => write!(
                f,
                "folder {id} cannot move under {parent_id}: it is inside its subtree"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "tree store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::ForeignKeysDisabled => write!(f, "tree store requires foreign_keys = ON"),
            Self::MissingRequiredTable(table) => {
                write!(f, "tree store requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid tree data: {message}"),
        }
    }
}

impl Error for TreeRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for TreeRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for TreeRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Where a moved node lands inside its destination sibling group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSlot {
    /// `next_order` of the destination group.
    Append,
    /// Caller-chosen value, written verbatim.
    Exact(i64),
}

/// Parent and order to write for a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub parent_id: Option<FolderId>,
    pub slot: OrderSlot,
}

/// Field changes for one folder. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderChanges {
    pub name: Option<String>,
    /// `Some(None)` clears the color.
    pub color: Option<Option<String>>,
    pub placement: Option<Placement>,
}

/// Field changes for one card. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardChanges {
    pub title: Option<String>,
    pub color: Option<Option<String>>,
    pub section_count: Option<i64>,
}

/// What a folder delete removed or re-attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderDeletion {
    pub removed_folders: u64,
    pub removed_cards: u64,
    pub reattached_folders: u64,
    pub reattached_cards: u64,
}

/// Folder persistence.
pub trait FolderRepository {
    /// Inserts a folder at the end of its sibling group.
    fn insert_folder(
        &self,
        owner: &OwnerId,
        parent_id: Option<FolderId>,
        name: &str,
        color: Option<&str>,
    ) -> TreeRepoResult<Folder>;
    fn get_folder(&self, owner: &OwnerId, id: FolderId) -> TreeRepoResult<Option<Folder>>;
    /// Total folders of the owner; bounds every ancestor walk.
    fn count_folders(&self, owner: &OwnerId) -> TreeRepoResult<u64>;
    fn list_folders(
        &self,
        owner: &OwnerId,
        parent_id: Option<FolderId>,
    ) -> TreeRepoResult<Vec<FolderSummary>>;
    /// Applies field and placement changes in one transaction.
    fn update_folder(
        &self,
        owner: &OwnerId,
        id: FolderId,
        changes: &FolderChanges,
    ) -> TreeRepoResult<Folder>;
    /// Rewrites the orders of one folder sibling group to `0..N`.
    fn reorder_folders(
        &self,
        owner: &OwnerId,
        parent_id: Option<FolderId>,
        ordered_ids: &[FolderId],
    ) -> TreeRepoResult<()>;
    /// Deletes one folder, re-attaching its children and cards to its parent.
    fn delete_folder_dissolve(&self, owner: &OwnerId, id: FolderId)
        -> TreeRepoResult<FolderDeletion>;
    /// Deletes one folder with its whole subtree and the cards inside it.
    fn delete_folder_cascade(&self, owner: &OwnerId, id: FolderId)
        -> TreeRepoResult<FolderDeletion>;
}

/// Card persistence.
pub trait CardRepository {
    /// Inserts a card at the end of its folder's card group.
    fn insert_card(
        &self,
        owner: &OwnerId,
        folder_id: Option<FolderId>,
        title: &str,
        color: Option<&str>,
    ) -> TreeRepoResult<Card>;
    fn get_card(&self, owner: &OwnerId, id: CardId) -> TreeRepoResult<Option<Card>>;
    fn list_cards(&self, owner: &OwnerId, folder_id: Option<FolderId>)
        -> TreeRepoResult<Vec<Card>>;
    fn update_card(&self, owner: &OwnerId, id: CardId, changes: &CardChanges)
        -> TreeRepoResult<Card>;
    /// Re-homes a card, appending it to the destination group. Moving to the
    /// current folder leaves the row untouched.
    fn move_card(
        &self,
        owner: &OwnerId,
        id: CardId,
        folder_id: Option<FolderId>,
    ) -> TreeRepoResult<Card>;
    fn reorder_cards(
        &self,
        owner: &OwnerId,
        folder_id: Option<FolderId>,
        ordered_ids: &[CardId],
    ) -> TreeRepoResult<()>;
    /// Deletes a card; its shortcuts go with it.
    fn delete_card(&self, owner: &OwnerId, id: CardId) -> TreeRepoResult<()>;
}

/// Shortcut persistence. Ownership is the owning folder's owner.
pub trait ShortcutRepository {
    fn insert_shortcut(
        &self,
        owner: &OwnerId,
        folder_id: FolderId,
        card_id: CardId,
    ) -> TreeRepoResult<Shortcut>;
    fn list_shortcuts(&self, owner: &OwnerId, folder_id: FolderId)
        -> TreeRepoResult<Vec<ShortcutEntry>>;
    fn move_shortcut(
        &self,
        owner: &OwnerId,
        id: ShortcutId,
        folder_id: FolderId,
    ) -> TreeRepoResult<Shortcut>;
    fn reorder_shortcuts(
        &self,
        owner: &OwnerId,
        folder_id: FolderId,
        ordered_ids: &[ShortcutId],
    ) -> TreeRepoResult<()>;
    fn delete_shortcut(&self, owner: &OwnerId, id: ShortcutId) -> TreeRepoResult<()>;
}

/// Everything the organizer needs from persistence.
pub trait TreeStore: FolderRepository + CardRepository + ShortcutRepository {}

impl<T: FolderRepository + CardRepository + ShortcutRepository> TreeStore for T {}

/// SQLite-backed tree store borrowing one migrated connection.
pub struct SqliteTreeStore<'conn> {
    pub(crate) conn: &'conn Connection,
}

impl<'conn> SqliteTreeStore<'conn> {
    /// Creates the store after checking schema version and pragmas.
    pub fn try_new(conn: &'conn Connection) -> TreeRepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

fn ensure_connection_ready(conn: &Connection) -> TreeRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(TreeRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let foreign_keys: i64 = conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))?;
    if foreign_keys != 1 {
        return Err(TreeRepoError::ForeignKeysDisabled);
    }

    for table in ["folders", "cards", "shortcuts"] {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(TreeRepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

/// Verifies `ordered_ids` against `live` and writes dense orders.
///
/// Ids outside the group that do not exist for the owner surface as
/// `NodeNotFound`; any other difference is a `GroupMismatch`. Must run inside
/// the caller's transaction so the check and the writes see one snapshot.
pub(crate) fn reorder_group(
    kind: EntityKind,
    live: &[Uuid],
    ordered_ids: &[Uuid],
    exists_for_owner: impl Fn(Uuid) -> TreeRepoResult<bool>,
    mut write_order: impl FnMut(Uuid, i64) -> TreeRepoResult<usize>,
) -> TreeRepoResult<()> {
    if let Err(mismatch) = check_membership(ordered_ids, live) {
        for id in &mismatch.unexpected {
            if !exists_for_owner(*id)? {
                return Err(TreeRepoError::NodeNotFound { kind, id: *id });
            }
        }
        return Err(TreeRepoError::GroupMismatch { kind, mismatch });
    }

    for (id, order) in reindex(ordered_ids) {
        if write_order(id, order)? != 1 {
            return Err(TreeRepoError::InvalidData(format!(
                "{} {id} vanished during reorder",
                kind.as_str()
            )));
        }
    }
    Ok(())
}

/// Runs `sql` and collects the first column as ids.
pub(crate) fn query_ids(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
    column: &'static str,
) -> TreeRepoResult<Vec<Uuid>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, column)?);
    }
    Ok(ids)
}

pub(crate) fn uuid_column(row: &Row<'_>, name: &str, column: &'static str) -> TreeRepoResult<Uuid> {
    let value: String = row.get(name)?;
    parse_uuid(&value, column)
}

pub(crate) fn opt_uuid_column(
    row: &Row<'_>,
    name: &str,
    column: &'static str,
) -> TreeRepoResult<Option<Uuid>> {
    row.get::<_, Option<String>>(name)?
        .map(|value| parse_uuid(&value, column))
        .transpose()
}

pub(crate) fn owner_column(row: &Row<'_>, name: &str, column: &'static str) -> TreeRepoResult<OwnerId> {
    let value: String = row.get(name)?;
    OwnerId::new(value.as_str())
        .map_err(|err| TreeRepoError::InvalidData(format!("{err} in {column}")))
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> TreeRepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| TreeRepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn id_param(id: Option<Uuid>) -> Option<String> {
    id.map(|value| value.to_string())
}

/// Epoch milliseconds used for `created_at`/`updated_at` writes.
pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64)
}

/// Maps a UNIQUE violation to `on_unique`, passing other errors through.
pub(crate) fn map_unique_violation(
    err: rusqlite::Error,
    on_unique: impl FnOnce() -> TreeRepoError,
) -> TreeRepoError {
    match &err {
        rusqlite::Error::SqliteFailure(code, _)
            if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            on_unique()
        }
        _ => err.into(),
    }
}
