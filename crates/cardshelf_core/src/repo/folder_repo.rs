//! SQLite folder persistence for [`SqliteTreeStore`].
//!
//! # Invariants
//! - Folders are only ever read or written together with their `owner_id`.
//! - Sibling groups are matched with `parent_id IS ?` so the root group
//!   (`NULL` parent) needs no separate statement.
//! - Deletes rely on `ON DELETE CASCADE` for subtree, cards and shortcuts.
//! - A reparent re-runs the cycle guard inside its write transaction, so
//!   the walk and the `UPDATE` see the same committed forest.

use crate::model::folder::{Folder, FolderId, FolderSummary};
use crate::model::owner::OwnerId;
use crate::model::EntityKind;
use crate::repo::tree_store::{
    id_param, now_ms, opt_uuid_column, owner_column, query_ids, reorder_group, uuid_column,
    FolderChanges, FolderDeletion, FolderRepository, OrderSlot, SqliteTreeStore, TreeRepoError,
    TreeRepoResult,
};
use crate::tree::cycle_guard::{check_move, MoveVerdict};
use crate::tree::order::next_order;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const FOLDER_COLUMNS: &str = "f.id AS id,
    f.owner_id AS owner_id,
    f.parent_id AS parent_id,
    f.name AS name,
    f.sort_order AS sort_order,
    f.color AS color,
    f.created_at AS created_at,
    f.updated_at AS updated_at";

impl FolderRepository for SqliteTreeStore<'_> {
    fn insert_folder(
        &self,
        owner: &OwnerId,
        parent_id: Option<FolderId>,
        name: &str,
        color: Option<&str>,
    ) -> TreeRepoResult<Folder> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if let Some(parent_id) = parent_id {
            require_folder(&tx, owner, parent_id)?;
        }

        let id = Uuid::new_v4();
        let sort_order = next_order(max_folder_order(&tx, owner, parent_id, None)?);
        let now = now_ms();
        tx.execute(
            "INSERT INTO folders (
                id, owner_id, parent_id, name, sort_order, color, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7);",
            params![
                id.to_string(),
                owner.as_str(),
                id_param(parent_id),
                name,
                sort_order,
                color,
                now,
            ],
        )?;
        let folder = require_folder(&tx, owner, id)?;
        tx.commit()?;
        Ok(folder)
    }

    fn get_folder(&self, owner: &OwnerId, id: FolderId) -> TreeRepoResult<Option<Folder>> {
        load_folder(self.conn, owner, id)
    }

    fn count_folders(&self, owner: &OwnerId) -> TreeRepoResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM folders WHERE owner_id = ?1;",
            [owner.as_str()],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    fn list_folders(
        &self,
        owner: &OwnerId,
        parent_id: Option<FolderId>,
    ) -> TreeRepoResult<Vec<FolderSummary>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FOLDER_COLUMNS},
                (SELECT COUNT(*) FROM folders c
                  WHERE c.parent_id = f.id AND c.owner_id = f.owner_id) AS child_folder_count,
                (SELECT COUNT(*) FROM cards k
                  WHERE k.folder_id = f.id AND k.owner_id = f.owner_id) AS card_count
             FROM folders f
             WHERE f.owner_id = ?1
               AND f.parent_id IS ?2
             ORDER BY f.sort_order ASC, f.created_at ASC, f.id ASC;"
        ))?;
        let mut rows = stmt.query(params![owner.as_str(), id_param(parent_id)])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(FolderSummary {
                folder: parse_folder_row(row)?,
                child_folder_count: row.get("child_folder_count")?,
                card_count: row.get("card_count")?,
            });
        }
        Ok(summaries)
    }

    fn update_folder(
        &self,
        owner: &OwnerId,
        id: FolderId,
        changes: &FolderChanges,
    ) -> TreeRepoResult<Folder> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let current = require_folder(&tx, owner, id)?;

        let (parent_id, sort_order) = match changes.placement {
            None => (current.parent_id, current.sort_order),
            Some(placement) => {
                if let Some(parent_id) = placement.parent_id {
                    require_folder(&tx, owner, parent_id)?;
                    if current.parent_id != Some(parent_id) {
                        ensure_acyclic(&tx, owner, id, parent_id)?;
                    }
                }
                let sort_order = match placement.slot {
                    OrderSlot::Exact(order) => order,
                    OrderSlot::Append => {
                        next_order(max_folder_order(&tx, owner, placement.parent_id, Some(id))?)
                    }
                };
                (placement.parent_id, sort_order)
            }
        };
        let name = changes.name.as_deref().unwrap_or(current.name.as_str());
        let color = match &changes.color {
            Some(color) => color.as_deref(),
            None => current.color.as_deref(),
        };

        tx.execute(
            "UPDATE folders
             SET name = ?3,
                 color = ?4,
                 parent_id = ?5,
                 sort_order = ?6,
                 updated_at = ?7
             WHERE id = ?1
               AND owner_id = ?2;",
            params![
                id.to_string(),
                owner.as_str(),
                name,
                color,
                id_param(parent_id),
                sort_order,
                now_ms(),
            ],
        )?;
        let updated = require_folder(&tx, owner, id)?;
        tx.commit()?;
        Ok(updated)
    }

    fn reorder_folders(
        &self,
        owner: &OwnerId,
        parent_id: Option<FolderId>,
        ordered_ids: &[FolderId],
    ) -> TreeRepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if let Some(parent_id) = parent_id {
            require_folder(&tx, owner, parent_id)?;
        }

        let live = child_folder_ids(&tx, owner, parent_id)?;
        let now = now_ms();
        reorder_group(
            EntityKind::Folder,
            &live,
            ordered_ids,
            |id| Ok(load_folder(&tx, owner, id)?.is_some()),
            |id, order| {
                Ok(tx.execute(
                    "UPDATE folders
                     SET sort_order = ?3,
                         updated_at = ?4
                     WHERE id = ?1
                       AND owner_id = ?2;",
                    params![id.to_string(), owner.as_str(), order, now],
                )?)
            },
        )?;

        tx.commit()?;
        debug!(
            "event=folder_reorder module=repo status=ok count={}",
            ordered_ids.len()
        );
        Ok(())
    }

    fn delete_folder_dissolve(
        &self,
        owner: &OwnerId,
        id: FolderId,
    ) -> TreeRepoResult<FolderDeletion> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let folder = require_folder(&tx, owner, id)?;
        let target = folder.parent_id;
        let now = now_ms();

        let children = child_folder_ids(&tx, owner, Some(id))?;
        let base = next_order(max_folder_order(&tx, owner, target, Some(id))?);
        for (offset, child_id) in children.iter().enumerate() {
            tx.execute(
                "UPDATE folders
                 SET parent_id = ?3,
                     sort_order = ?4,
                     updated_at = ?5
                 WHERE id = ?1
                   AND owner_id = ?2;",
                params![
                    child_id.to_string(),
                    owner.as_str(),
                    id_param(target),
                    base + offset as i64,
                    now,
                ],
            )?;
        }

        let cards = query_ids(
            &tx,
            "SELECT id FROM cards
             WHERE owner_id = ?1 AND folder_id = ?2
             ORDER BY sort_order ASC, created_at ASC, id ASC;",
            &[&owner.as_str(), &id.to_string()],
            "cards.id",
        )?;
        let card_max: Option<i64> = tx.query_row(
            "SELECT MAX(sort_order) FROM cards WHERE owner_id = ?1 AND folder_id IS ?2;",
            params![owner.as_str(), id_param(target)],
            |row| row.get(0),
        )?;
        let card_base = next_order(card_max);
        for (offset, card_id) in cards.iter().enumerate() {
            tx.execute(
                "UPDATE cards
                 SET folder_id = ?3,
                     sort_order = ?4,
                     updated_at = ?5
                 WHERE id = ?1
                   AND owner_id = ?2;",
                params![
                    card_id.to_string(),
                    owner.as_str(),
                    id_param(target),
                    card_base + offset as i64,
                    now,
                ],
            )?;
        }

        tx.execute(
            "DELETE FROM folders WHERE id = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str()],
        )?;
        tx.commit()?;

        Ok(FolderDeletion {
            removed_folders: 1,
            removed_cards: 0,
            reattached_folders: children.len() as u64,
            reattached_cards: cards.len() as u64,
        })
    }

    fn delete_folder_cascade(
        &self,
        owner: &OwnerId,
        id: FolderId,
    ) -> TreeRepoResult<FolderDeletion> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        require_folder(&tx, owner, id)?;

        let (removed_folders, removed_cards): (i64, i64) = tx.query_row(
            "WITH RECURSIVE subtree(id) AS (
                SELECT id FROM folders WHERE id = ?1 AND owner_id = ?2
                UNION
                SELECT child.id
                FROM folders child
                INNER JOIN subtree parent ON child.parent_id = parent.id
                WHERE child.owner_id = ?2
            )
            SELECT
                (SELECT COUNT(*) FROM subtree),
                (SELECT COUNT(*) FROM cards
                  WHERE owner_id = ?2 AND folder_id IN (SELECT id FROM subtree));",
            params![id.to_string(), owner.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        tx.execute(
            "DELETE FROM folders WHERE id = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str()],
        )?;
        tx.commit()?;

        Ok(FolderDeletion {
            removed_folders: removed_folders.max(0) as u64,
            removed_cards: removed_cards.max(0) as u64,
            reattached_folders: 0,
            reattached_cards: 0,
        })
    }
}

/// Cycle guard over the transaction's snapshot.
fn ensure_acyclic(
    conn: &Connection,
    owner: &OwnerId,
    id: FolderId,
    parent_id: FolderId,
) -> TreeRepoResult<()> {
    let snapshot = SqliteTreeStore { conn };
    match check_move(&snapshot, owner, id, parent_id)? {
        MoveVerdict::Allowed => Ok(()),
        MoveVerdict::IntoItself | MoveVerdict::IntoDescendant => {
            debug!(
                "event=folder_update module=repo status=rejected error_code=cycle folder_id={id} parent_id={parent_id}"
            );
            Err(TreeRepoError::CycleRejected { id, parent_id })
        }
    }
}

pub(crate) fn load_folder(
    conn: &Connection,
    owner: &OwnerId,
    id: FolderId,
) -> TreeRepoResult<Option<Folder>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FOLDER_COLUMNS}
         FROM folders f
         WHERE f.id = ?1
           AND f.owner_id = ?2;"
    ))?;
    let folder = stmt
        .query_row(params![id.to_string(), owner.as_str()], |row| {
            Ok(parse_folder_row(row))
        })
        .optional()?;
    folder.transpose()
}

pub(crate) fn require_folder(
    conn: &Connection,
    owner: &OwnerId,
    id: FolderId,
) -> TreeRepoResult<Folder> {
    load_folder(conn, owner, id)?.ok_or(TreeRepoError::NodeNotFound {
        kind: EntityKind::Folder,
        id,
    })
}

fn child_folder_ids(
    conn: &Connection,
    owner: &OwnerId,
    parent_id: Option<FolderId>,
) -> TreeRepoResult<Vec<FolderId>> {
    let parent = id_param(parent_id);
    query_ids(
        conn,
        "SELECT id FROM folders
         WHERE owner_id = ?1 AND parent_id IS ?2
         ORDER BY sort_order ASC, created_at ASC, id ASC;",
        &[&owner.as_str(), &parent],
        "folders.id",
    )
}

/// Highest order in one folder sibling group, ignoring `exclude`.
fn max_folder_order(
    conn: &Connection,
    owner: &OwnerId,
    parent_id: Option<FolderId>,
    exclude: Option<FolderId>,
) -> TreeRepoResult<Option<i64>> {
    Ok(conn.query_row(
        "SELECT MAX(sort_order)
         FROM folders
         WHERE owner_id = ?1
           AND parent_id IS ?2
           AND id IS NOT ?3;",
        params![owner.as_str(), id_param(parent_id), id_param(exclude)],
        |row| row.get(0),
    )?)
}

fn parse_folder_row(row: &Row<'_>) -> TreeRepoResult<Folder> {
    let sort_order: i64 = row.get("sort_order")?;
    if sort_order < 0 {
        return Err(TreeRepoError::InvalidData(format!(
            "negative sort_order `{sort_order}` in folders.sort_order"
        )));
    }
    Ok(Folder {
        id: uuid_column(row, "id", "folders.id")?,
        owner_id: owner_column(row, "owner_id", "folders.owner_id")?,
        parent_id: opt_uuid_column(row, "parent_id", "folders.parent_id")?,
        name: row.get("name")?,
        sort_order,
        color: row.get("color")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
