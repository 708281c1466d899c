//! FFI organizer API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the organizer's folder, card and shortcut operations to Dart via
//!   FRB as synchronous calls.
//! - Translate string ids and organizer errors into flat envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every call takes the host-resolved `owner_id`; a missing owner is
//!   rejected before the database is opened.
//! - Failures always carry `{ error, kind, status, details }`.

use cardshelf_core::db::open_db;
use cardshelf_core::service::validation::{parse_id, parse_ids, parse_optional_id};
use cardshelf_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Card, CoreConfig, CreateCardRequest, CreateFolderRequest, ErrorDetails, Folder,
    FolderDeleteMode, FolderDeletion, FolderSummary, IdentityResolver, OrganizerError,
    OrganizerResult, OrganizerService, ParentChange, PathSegment, ShortcutEntry, SqliteTreeStore,
    StaticIdentity, UpdateCardRequest, UpdateFolderRequest, ValidationError,
};
use log::error;
use std::sync::OnceLock;

static CORE_CONFIG: OnceLock<Result<CoreConfig, String>> = OnceLock::new();

type Service<'conn> = OrganizerService<SqliteTreeStore<'conn>, StaticIdentity>;

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns an empty string on success and the error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Structured failure shared by every envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FfiError {
    /// Message safe to show verbatim.
    pub error: String,
    /// `unauthenticated|not_found|structural_violation|conflict|validation|internal`.
    pub kind: String,
    /// HTTP-style status classification.
    pub status: u16,
    pub details: Option<FfiErrorDetails>,
}

/// Flattened error details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FfiErrorDetails {
    /// Entity kind the error is about (`folder|card|shortcut`).
    pub entity: Option<String>,
    /// Ids involved: the missing entity, the `(folder, card)` pair, or the
    /// missing/unexpected/duplicated reorder ids in that order.
    pub ids: Vec<String>,
    /// Offending input field for validation errors.
    pub field: Option<String>,
}

impl FfiError {
    fn from_organizer(err: &OrganizerError) -> Self {
        let body = err.to_body();
        let details = body.details.map(|details| match details {
            ErrorDetails::Entity { kind, id } => FfiErrorDetails {
                entity: Some(kind.as_str().to_string()),
                ids: vec![id.to_string()],
                field: None,
            },
            ErrorDetails::Shortcut { folder_id, card_id } => FfiErrorDetails {
                entity: Some("shortcut".to_string()),
                ids: vec![folder_id.to_string(), card_id.to_string()],
                field: None,
            },
            ErrorDetails::Membership {
                kind,
                missing,
                unexpected,
                duplicated,
            } => FfiErrorDetails {
                entity: Some(kind.as_str().to_string()),
                ids: missing
                    .iter()
                    .chain(unexpected.iter())
                    .chain(duplicated.iter())
                    .map(ToString::to_string)
                    .collect(),
                field: None,
            },
            ErrorDetails::Field { field } => FfiErrorDetails {
                field: Some(field),
                ..FfiErrorDetails::default()
            },
        });
        Self {
            error: body.error,
            kind: err.kind().as_str().to_string(),
            status: err.status_code(),
            details,
        }
    }

    fn internal(stage: &str, message: &str) -> Self {
        error!("event=ffi_call module=ffi status=error stage={stage} error={message}");
        Self {
            error: "internal error".to_string(),
            kind: "internal".to_string(),
            status: 500,
            details: None,
        }
    }
}

/// Folder row as seen by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderItem {
    pub id: String,
    pub parent_id: Option<String>,
    pub name: String,
    pub order: i64,
    pub color: Option<String>,
    pub child_folder_count: i64,
    pub card_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Breadcrumb entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathItem {
    pub id: String,
    pub name: String,
}

/// Card row as seen by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardItem {
    pub id: String,
    pub folder_id: Option<String>,
    pub title: String,
    pub order: i64,
    pub color: Option<String>,
    pub section_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Shortcut row with the referenced card's summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutItem {
    pub id: String,
    /// Folder the shortcut is placed in.
    pub folder_id: String,
    pub order: i64,
    pub card_id: String,
    /// The card's own folder.
    pub card_folder_id: Option<String>,
    pub card_title: String,
    pub card_color: Option<String>,
    pub card_section_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderListResponse {
    pub ok: bool,
    pub items: Vec<FolderItem>,
    pub error: Option<FfiError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardListResponse {
    pub ok: bool,
    pub items: Vec<CardItem>,
    pub error: Option<FfiError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutListResponse {
    pub ok: bool,
    pub items: Vec<ShortcutItem>,
    pub error: Option<FfiError>,
}

/// Single-folder envelope. `path` is filled by `folder_get`; `parent` by
/// `folder_update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderResponse {
    pub ok: bool,
    pub folder: Option<FolderItem>,
    pub path: Vec<PathItem>,
    pub parent: Option<PathItem>,
    pub error: Option<FfiError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardResponse {
    pub ok: bool,
    pub card: Option<CardItem>,
    pub error: Option<FfiError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutResponse {
    pub ok: bool,
    pub shortcut_id: Option<String>,
    pub folder_id: Option<String>,
    pub order: Option<i64>,
    pub error: Option<FfiError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderDeleteResponse {
    pub ok: bool,
    pub removed_folders: u64,
    pub removed_cards: u64,
    pub reattached_folders: u64,
    pub reattached_cards: u64,
    pub error: Option<FfiError>,
}

/// Envelope for writes with no payload (reorder, delete).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    pub error: Option<FfiError>,
}

impl ActionResponse {
    fn from_result(result: Result<(), FfiError>) -> Self {
        match result {
            Ok(()) => Self {
                ok: true,
                error: None,
            },
            Err(err) => Self {
                ok: false,
                error: Some(err),
            },
        }
    }
}

impl FolderResponse {
    fn from_result(result: Result<FolderResponse, FfiError>) -> Self {
        result.unwrap_or_else(|err| Self {
            ok: false,
            folder: None,
            path: Vec::new(),
            parent: None,
            error: Some(err),
        })
    }

    fn success(folder: FolderItem, path: Vec<PathItem>, parent: Option<PathItem>) -> Self {
        Self {
            ok: true,
            folder: Some(folder),
            path,
            parent,
            error: None,
        }
    }
}

impl CardResponse {
    fn from_result(result: Result<Card, FfiError>) -> Self {
        match result {
            Ok(card) => Self {
                ok: true,
                card: Some(to_card_item(&card)),
                error: None,
            },
            Err(err) => Self {
                ok: false,
                card: None,
                error: Some(err),
            },
        }
    }
}

/// Lists folders directly under `parent_id` (root when `None`).
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Items ordered by `(order, created_at)`; each carries child counts.
#[flutter_rust_bridge::frb(sync)]
pub fn folders_list(owner_id: Option<String>, parent_id: Option<String>) -> FolderListResponse {
    match run(owner_id, |service| {
        let parent_id = parse_optional_id("parent_id", parent_id.as_deref())?;
        service.list_folders(parent_id)
    }) {
        Ok(rows) => FolderListResponse {
            ok: true,
            items: rows.iter().map(to_folder_summary_item).collect(),
            error: None,
        },
        Err(err) => FolderListResponse {
            ok: false,
            items: Vec::new(),
            error: Some(err),
        },
    }
}

/// Loads one folder with its root-first breadcrumb path.
#[flutter_rust_bridge::frb(sync)]
pub fn folder_get(owner_id: Option<String>, id: String) -> FolderResponse {
    FolderResponse::from_result(run(owner_id, |service| {
        let found = service.get_folder_with_path(parse_id("id", &id)?)?;
        Ok(FolderResponse::success(
            to_folder_item(&found.folder),
            found.path.iter().map(to_path_item).collect(),
            None,
        ))
    }))
}

/// Creates a folder at the end of its sibling group.
#[flutter_rust_bridge::frb(sync)]
pub fn folder_create(
    owner_id: Option<String>,
    name: String,
    parent_id: Option<String>,
    color: Option<String>,
) -> FolderResponse {
    FolderResponse::from_result(run(owner_id, |service| {
        let folder = service.create_folder(CreateFolderRequest {
            name,
            parent_id: parse_optional_id("parent_id", parent_id.as_deref())?,
            color,
        })?;
        Ok(FolderResponse::success(to_folder_item(&folder), Vec::new(), None))
    }))
}

/// Renames, recolors, reorders or moves a folder.
///
/// Input semantics:
/// - `move_parent = false` keeps the parent and ignores `parent_id`.
/// - `move_parent = true` with `parent_id = None` moves the folder to root.
/// - `color = Some("")` clears the color.
#[flutter_rust_bridge::frb(sync)]
pub fn folder_update(
    owner_id: Option<String>,
    id: String,
    name: Option<String>,
    move_parent: bool,
    parent_id: Option<String>,
    order: Option<i64>,
    color: Option<String>,
) -> FolderResponse {
    FolderResponse::from_result(run(owner_id, |service| {
        let id = parse_id("id", &id)?;
        let parent = if move_parent {
            ParentChange::Set(parse_optional_id("parent_id", parent_id.as_deref())?)
        } else {
            ParentChange::Keep
        };
        let detail = service.update_folder(
            id,
            UpdateFolderRequest {
                name,
                parent,
                order,
                color,
            },
        )?;
        Ok(FolderResponse::success(
            to_folder_item(&detail.folder),
            Vec::new(),
            detail.parent.as_ref().map(to_path_item),
        ))
    }))
}

/// Deletes a folder. `mode` is `dissolve|cascade`; `None` uses the
/// configured default.
#[flutter_rust_bridge::frb(sync)]
pub fn folder_delete(
    owner_id: Option<String>,
    id: String,
    mode: Option<String>,
) -> FolderDeleteResponse {
    let result = run(owner_id, |service| {
        let id = parse_id("id", &id)?;
        let mode = match mode.as_deref().map(str::trim).filter(|mode| !mode.is_empty()) {
            Some(raw) => Some(
                FolderDeleteMode::parse(raw)
                    .ok_or_else(|| ValidationError::UnknownDeleteMode(raw.to_string()))?,
            ),
            None => None,
        };
        service.delete_folder(id, mode)
    });
    match result {
        Ok(FolderDeletion {
            removed_folders,
            removed_cards,
            reattached_folders,
            reattached_cards,
        }) => FolderDeleteResponse {
            ok: true,
            removed_folders,
            removed_cards,
            reattached_folders,
            reattached_cards,
            error: None,
        },
        Err(err) => FolderDeleteResponse {
            ok: false,
            removed_folders: 0,
            removed_cards: 0,
            reattached_folders: 0,
            reattached_cards: 0,
            error: Some(err),
        },
    }
}

/// Rewrites one folder sibling group to `ordered_ids`, all or nothing.
#[flutter_rust_bridge::frb(sync)]
pub fn folders_reorder(
    owner_id: Option<String>,
    parent_id: Option<String>,
    ordered_ids: Vec<String>,
) -> ActionResponse {
    ActionResponse::from_result(run(owner_id, |service| {
        let parent_id = parse_optional_id("parent_id", parent_id.as_deref())?;
        service.reorder_folders(parent_id, &parse_ids("ordered_ids", &ordered_ids)?)
    }))
}

/// Lists cards directly under `folder_id` (root when `None`).
#[flutter_rust_bridge::frb(sync)]
pub fn cards_list(owner_id: Option<String>, folder_id: Option<String>) -> CardListResponse {
    match run(owner_id, |service| {
        service.list_cards(parse_optional_id("folder_id", folder_id.as_deref())?)
    }) {
        Ok(cards) => CardListResponse {
            ok: true,
            items: cards.iter().map(to_card_item).collect(),
            error: None,
        },
        Err(err) => CardListResponse {
            ok: false,
            items: Vec::new(),
            error: Some(err),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn card_create(
    owner_id: Option<String>,
    title: String,
    folder_id: Option<String>,
    color: Option<String>,
) -> CardResponse {
    CardResponse::from_result(run(owner_id, |service| {
        service.create_card(CreateCardRequest {
            title,
            folder_id: parse_optional_id("folder_id", folder_id.as_deref())?,
            color,
        })
    }))
}

/// Updates card fields. `color = Some("")` clears the color.
#[flutter_rust_bridge::frb(sync)]
pub fn card_update(
    owner_id: Option<String>,
    id: String,
    title: Option<String>,
    color: Option<String>,
    section_count: Option<i64>,
) -> CardResponse {
    CardResponse::from_result(run(owner_id, |service| {
        service.update_card(
            parse_id("id", &id)?,
            UpdateCardRequest {
                title,
                color,
                section_count,
            },
        )
    }))
}

/// Moves a card to `folder_id` (root when `None`), appended at the end.
#[flutter_rust_bridge::frb(sync)]
pub fn card_move(owner_id: Option<String>, id: String, folder_id: Option<String>) -> CardResponse {
    CardResponse::from_result(run(owner_id, |service| {
        service.move_card(
            parse_id("id", &id)?,
            parse_optional_id("folder_id", folder_id.as_deref())?,
        )
    }))
}

#[flutter_rust_bridge::frb(sync)]
pub fn cards_reorder(
    owner_id: Option<String>,
    folder_id: Option<String>,
    ordered_ids: Vec<String>,
) -> ActionResponse {
    ActionResponse::from_result(run(owner_id, |service| {
        let folder_id = parse_optional_id("folder_id", folder_id.as_deref())?;
        service.reorder_cards(folder_id, &parse_ids("ordered_ids", &ordered_ids)?)
    }))
}

/// Deletes a card together with every shortcut to it.
#[flutter_rust_bridge::frb(sync)]
pub fn card_delete(owner_id: Option<String>, id: String) -> ActionResponse {
    ActionResponse::from_result(run(owner_id, |service| {
        service.delete_card(parse_id("id", &id)?)
    }))
}

#[flutter_rust_bridge::frb(sync)]
pub fn shortcuts_list(owner_id: Option<String>, folder_id: String) -> ShortcutListResponse {
    match run(owner_id, |service| {
        service.list_shortcuts(parse_id("folder_id", &folder_id)?)
    }) {
        Ok(entries) => ShortcutListResponse {
            ok: true,
            items: entries.iter().map(to_shortcut_item).collect(),
            error: None,
        },
        Err(err) => ShortcutListResponse {
            ok: false,
            items: Vec::new(),
            error: Some(err),
        },
    }
}

/// Places a shortcut to `card_id` in `folder_id`. A second shortcut for the
/// same pair fails with `conflict`.
#[flutter_rust_bridge::frb(sync)]
pub fn shortcut_create(
    owner_id: Option<String>,
    folder_id: String,
    card_id: String,
) -> ShortcutResponse {
    shortcut_response(run(owner_id, |service| {
        service.create_shortcut(
            parse_id("folder_id", &folder_id)?,
            parse_id("card_id", &card_id)?,
        )
    }))
}

#[flutter_rust_bridge::frb(sync)]
pub fn shortcut_move(owner_id: Option<String>, id: String, folder_id: String) -> ShortcutResponse {
    shortcut_response(run(owner_id, |service| {
        service.move_shortcut(parse_id("id", &id)?, parse_id("folder_id", &folder_id)?)
    }))
}

#[flutter_rust_bridge::frb(sync)]
pub fn shortcuts_reorder(
    owner_id: Option<String>,
    folder_id: String,
    ordered_ids: Vec<String>,
) -> ActionResponse {
    ActionResponse::from_result(run(owner_id, |service| {
        service.reorder_shortcuts(
            parse_id("folder_id", &folder_id)?,
            &parse_ids("ordered_ids", &ordered_ids)?,
        )
    }))
}

/// Removes a shortcut; the card stays where it is.
#[flutter_rust_bridge::frb(sync)]
pub fn shortcut_delete(owner_id: Option<String>, id: String) -> ActionResponse {
    ActionResponse::from_result(run(owner_id, |service| {
        service.delete_shortcut(parse_id("id", &id)?)
    }))
}

fn shortcut_response(
    result: Result<cardshelf_core::Shortcut, FfiError>,
) -> ShortcutResponse {
    match result {
        Ok(shortcut) => ShortcutResponse {
            ok: true,
            shortcut_id: Some(shortcut.id.to_string()),
            folder_id: Some(shortcut.folder_id.to_string()),
            order: Some(shortcut.sort_order),
            error: None,
        },
        Err(err) => ShortcutResponse {
            ok: false,
            shortcut_id: None,
            folder_id: None,
            order: None,
            error: Some(err),
        },
    }
}

fn resolve_config() -> Result<&'static CoreConfig, FfiError> {
    CORE_CONFIG
        .get_or_init(|| CoreConfig::from_env().map_err(|err| err.to_string()))
        .as_ref()
        .map_err(|message| FfiError::internal("config", message))
}

/// Opens the configured database and runs one organizer operation.
fn run<T>(
    owner_id: Option<String>,
    operation: impl FnOnce(&Service<'_>) -> OrganizerResult<T>,
) -> Result<T, FfiError> {
    let identity = StaticIdentity::from_raw(owner_id.as_deref());
    if identity.resolve_owner().is_none() {
        return Err(FfiError::from_organizer(&OrganizerError::Unauthenticated));
    }

    let config = resolve_config()?;
    let conn = open_db(&config.db_path)
        .map_err(|err| FfiError::internal("db_open", &err.to_string()))?;
    let store = SqliteTreeStore::try_new(&conn)
        .map_err(|err| FfiError::internal("store_init", &err.to_string()))?;
    let service = OrganizerService::new(store, identity).with_delete_mode(config.folder_delete_mode);
    operation(&service).map_err(|err| FfiError::from_organizer(&err))
}

fn to_folder_item(folder: &Folder) -> FolderItem {
    FolderItem {
        id: folder.id.to_string(),
        parent_id: folder.parent_id.map(|id| id.to_string()),
        name: folder.name.clone(),
        order: folder.sort_order,
        color: folder.color.clone(),
        child_folder_count: 0,
        card_count: 0,
        created_at: folder.created_at,
        updated_at: folder.updated_at,
    }
}

fn to_folder_summary_item(row: &FolderSummary) -> FolderItem {
    FolderItem {
        child_folder_count: row.child_folder_count,
        card_count: row.card_count,
        ..to_folder_item(&row.folder)
    }
}

fn to_path_item(segment: &PathSegment) -> PathItem {
    PathItem {
        id: segment.id.to_string(),
        name: segment.name.clone(),
    }
}

fn to_card_item(card: &Card) -> CardItem {
    CardItem {
        id: card.id.to_string(),
        folder_id: card.folder_id.map(|id| id.to_string()),
        title: card.title.clone(),
        order: card.sort_order,
        color: card.color.clone(),
        section_count: card.section_count,
        created_at: card.created_at,
        updated_at: card.updated_at,
    }
}

fn to_shortcut_item(entry: &ShortcutEntry) -> ShortcutItem {
    ShortcutItem {
        id: entry.shortcut.id.to_string(),
        folder_id: entry.shortcut.folder_id.to_string(),
        order: entry.shortcut.sort_order,
        card_id: entry.card.id.to_string(),
        card_folder_id: entry.card.folder_id.map(|id| id.to_string()),
        card_title: entry.card.title.clone(),
        card_color: entry.card.color.clone(),
        card_section_count: entry.card.section_count,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        card_create, card_delete, core_version, folder_create, folder_get, folder_update,
        folders_list, folders_reorder, init_logging, ping, resolve_config, shortcut_create,
        shortcuts_list,
    };
    use cardshelf_core::db::open_db;
    use uuid::Uuid;

    fn owner() -> Option<String> {
        Some(format!("ffi-owner-{}", Uuid::new_v4()))
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "/tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn missing_owner_is_unauthenticated() {
        let response = folder_create(None, "Inbox".to_string(), None, None);
        assert!(!response.ok);
        let error = response.error.unwrap();
        assert_eq!(error.kind, "unauthenticated");
        assert_eq!(error.status, 401);
    }

    #[test]
    fn folder_round_trip_with_path_and_parent() {
        let owner = owner();
        let a = folder_create(owner.clone(), "A".to_string(), None, None);
        assert!(a.ok, "{:?}", a.error);
        let a_id = a.folder.unwrap().id;
        let b = folder_create(owner.clone(), "B".to_string(), Some(a_id.clone()), None);
        let b_id = b.folder.unwrap().id;

        let got = folder_get(owner.clone(), b_id.clone());
        let names: Vec<_> = got.path.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);

        let moved = folder_update(owner.clone(), b_id.clone(), None, true, None, None, None);
        assert!(moved.ok);
        assert!(moved.parent.is_none());
        assert_eq!(moved.folder.unwrap().parent_id, None);

        let roots = folders_list(owner, None);
        assert_eq!(roots.items.len(), 2);
    }

    #[test]
    fn malformed_id_is_validation_error() {
        let response = folder_get(owner(), "not-a-uuid".to_string());
        let error = response.error.unwrap();
        assert_eq!(error.kind, "validation");
        assert_eq!(error.status, 400);
        assert_eq!(error.details.unwrap().field.as_deref(), Some("id"));
    }

    #[test]
    fn foreign_folder_reads_as_not_found() {
        let folder = folder_create(owner(), "Private".to_string(), None, None)
            .folder
            .unwrap();
        let response = folder_get(owner(), folder.id);
        let error = response.error.unwrap();
        assert_eq!(error.kind, "not_found");
        assert_eq!(error.status, 404);
    }

    #[test]
    fn reorder_with_missing_sibling_conflicts() {
        let owner = owner();
        let x = folder_create(owner.clone(), "X".to_string(), None, None).folder.unwrap();
        folder_create(owner.clone(), "Y".to_string(), None, None);

        let response = folders_reorder(owner, None, vec![x.id]);
        assert!(!response.ok);
        assert_eq!(response.error.unwrap().status, 409);
    }

    #[test]
    fn duplicate_shortcut_conflicts_and_card_delete_cascades() {
        let owner = owner();
        let folder = folder_create(owner.clone(), "Refs".to_string(), None, None)
            .folder
            .unwrap();
        let card = card_create(owner.clone(), "Rust".to_string(), None, None)
            .card
            .unwrap();

        let first = shortcut_create(owner.clone(), folder.id.clone(), card.id.clone());
        assert!(first.ok);
        let second = shortcut_create(owner.clone(), folder.id.clone(), card.id.clone());
        assert_eq!(second.error.unwrap().kind, "conflict");

        assert!(card_delete(owner.clone(), card.id.clone()).ok);
        assert!(shortcuts_list(owner, folder.id.clone()).items.is_empty());

        let conn: rusqlite::Connection = open_db(&resolve_config().unwrap().db_path).unwrap();
        let remaining: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM shortcuts WHERE card_id = ?1;",
                [card.id.as_str()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
