//! SQLite shortcut persistence for [`SqliteTreeStore`].
//!
//! Shortcuts carry no owner column. They are scoped by joining the folder
//! they live in, and listings additionally require the referenced card to
//! belong to the same owner.

use crate::model::card::{CardId, CardSummary};
use crate::model::folder::FolderId;
use crate::model::owner::OwnerId;
use crate::model::shortcut::{Shortcut, ShortcutEntry, ShortcutId};
use crate::model::EntityKind;
use crate::repo::card_repo::require_card;
use crate::repo::folder_repo::require_folder;
use crate::repo::tree_store::{
    map_unique_violation, now_ms, opt_uuid_column, query_ids, reorder_group, uuid_column,
    ShortcutRepository, SqliteTreeStore, TreeRepoError, TreeRepoResult,
};
use crate::tree::order::next_order;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const SHORTCUT_COLUMNS: &str = "s.id AS id,
    s.folder_id AS folder_id,
    s.card_id AS card_id,
    s.sort_order AS sort_order,
    s.created_at AS created_at,
    s.updated_at AS updated_at";

impl ShortcutRepository for SqliteTreeStore<'_> {
    fn insert_shortcut(
        &self,
        owner: &OwnerId,
        folder_id: FolderId,
        card_id: CardId,
    ) -> TreeRepoResult<Shortcut> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        require_folder(&tx, owner, folder_id)?;
        require_card(&tx, owner, card_id)?;
        if find_in_folder(&tx, owner, folder_id, card_id)?.is_some() {
            return Err(TreeRepoError::DuplicateShortcut { folder_id, card_id });
        }

        let id = Uuid::new_v4();
        let sort_order = next_order(max_shortcut_order(&tx, folder_id)?);
        let now = now_ms();
        tx.execute(
            "INSERT INTO shortcuts (id, folder_id, card_id, sort_order, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
            params![
                id.to_string(),
                folder_id.to_string(),
                card_id.to_string(),
                sort_order,
                now,
            ],
        )
        .map_err(|err| {
            map_unique_violation(err, || TreeRepoError::DuplicateShortcut { folder_id, card_id })
        })?;
        let shortcut = require_shortcut(&tx, owner, id)?;
        tx.commit()?;
        Ok(shortcut)
    }

    fn list_shortcuts(
        &self,
        owner: &OwnerId,
        folder_id: FolderId,
    ) -> TreeRepoResult<Vec<ShortcutEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SHORTCUT_COLUMNS},
                k.folder_id AS card_folder_id,
                k.title AS card_title,
                k.color AS card_color,
                k.section_count AS card_section_count
             FROM shortcuts s
             INNER JOIN folders f ON f.id = s.folder_id
             INNER JOIN cards k ON k.id = s.card_id AND k.owner_id = f.owner_id
             WHERE s.folder_id = ?1
               AND f.owner_id = ?2
             ORDER BY s.sort_order ASC, s.created_at ASC, s.id ASC;"
        ))?;
        let mut rows = stmt.query(params![folder_id.to_string(), owner.as_str()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            let shortcut = parse_shortcut_row(row)?;
            let card = CardSummary {
                id: shortcut.card_id,
                folder_id: opt_uuid_column(row, "card_folder_id", "cards.folder_id")?,
                title: row.get("card_title")?,
                color: row.get("card_color")?,
                section_count: row.get("card_section_count")?,
            };
            entries.push(ShortcutEntry { shortcut, card });
        }
        Ok(entries)
    }

    fn move_shortcut(
        &self,
        owner: &OwnerId,
        id: ShortcutId,
        folder_id: FolderId,
    ) -> TreeRepoResult<Shortcut> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let current = require_shortcut(&tx, owner, id)?;
        if current.folder_id == folder_id {
            return Ok(current);
        }
        require_folder(&tx, owner, folder_id)?;
        let card_id = current.card_id;
        if find_in_folder(&tx, owner, folder_id, card_id)?.is_some() {
            return Err(TreeRepoError::DuplicateShortcut { folder_id, card_id });
        }

        let sort_order = next_order(max_shortcut_order(&tx, folder_id)?);
        tx.execute(
            "UPDATE shortcuts
             SET folder_id = ?2,
                 sort_order = ?3,
                 updated_at = ?4
             WHERE id = ?1;",
            params![id.to_string(), folder_id.to_string(), sort_order, now_ms()],
        )
        .map_err(|err| {
            map_unique_violation(err, || TreeRepoError::DuplicateShortcut { folder_id, card_id })
        })?;
        let moved = require_shortcut(&tx, owner, id)?;
        tx.commit()?;
        Ok(moved)
    }

    fn reorder_shortcuts(
        &self,
        owner: &OwnerId,
        folder_id: FolderId,
        ordered_ids: &[ShortcutId],
    ) -> TreeRepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        require_folder(&tx, owner, folder_id)?;

        let folder = folder_id.to_string();
        let live = query_ids(
            &tx,
            "SELECT id FROM shortcuts
             WHERE folder_id = ?1
             ORDER BY sort_order ASC, created_at ASC, id ASC;",
            &[&folder],
            "shortcuts.id",
        )?;
        let now = now_ms();
        reorder_group(
            EntityKind::Shortcut,
            &live,
            ordered_ids,
            |id| Ok(load_shortcut(&tx, owner, id)?.is_some()),
            |id, order| {
                Ok(tx.execute(
                    "UPDATE shortcuts
                     SET sort_order = ?3,
                         updated_at = ?4
                     WHERE id = ?1
                       AND folder_id = ?2;",
                    params![id.to_string(), folder, order, now],
                )?)
            },
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_shortcut(&self, owner: &OwnerId, id: ShortcutId) -> TreeRepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM shortcuts
             WHERE id = ?1
               AND folder_id IN (SELECT id FROM folders WHERE owner_id = ?2);",
            params![id.to_string(), owner.as_str()],
        )?;
        if changed == 0 {
            return Err(TreeRepoError::NodeNotFound {
                kind: EntityKind::Shortcut,
                id,
            });
        }
        Ok(())
    }
}

fn load_shortcut(
    conn: &Connection,
    owner: &OwnerId,
    id: ShortcutId,
) -> TreeRepoResult<Option<Shortcut>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SHORTCUT_COLUMNS}
         FROM shortcuts s
         INNER JOIN folders f ON f.id = s.folder_id
         WHERE s.id = ?1
           AND f.owner_id = ?2;"
    ))?;
    let shortcut = stmt
        .query_row(params![id.to_string(), owner.as_str()], |row| {
            Ok(parse_shortcut_row(row))
        })
        .optional()?;
    shortcut.transpose()
}

fn require_shortcut(
    conn: &Connection,
    owner: &OwnerId,
    id: ShortcutId,
) -> TreeRepoResult<Shortcut> {
    load_shortcut(conn, owner, id)?.ok_or(TreeRepoError::NodeNotFound {
        kind: EntityKind::Shortcut,
        id,
    })
}

fn find_in_folder(
    conn: &Connection,
    owner: &OwnerId,
    folder_id: FolderId,
    card_id: CardId,
) -> TreeRepoResult<Option<Shortcut>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SHORTCUT_COLUMNS}
         FROM shortcuts s
         INNER JOIN folders f ON f.id = s.folder_id
         WHERE s.folder_id = ?1
           AND s.card_id = ?2
           AND f.owner_id = ?3;"
    ))?;
    let shortcut = stmt
        .query_row(
            params![folder_id.to_string(), card_id.to_string(), owner.as_str()],
            |row| Ok(parse_shortcut_row(row)),
        )
        .optional()?;
    shortcut.transpose()
}

/// Shortcut orders are their own sequence, separate from the folder's cards.
fn max_shortcut_order(conn: &Connection, folder_id: FolderId) -> TreeRepoResult<Option<i64>> {
    Ok(conn.query_row(
        "SELECT MAX(sort_order) FROM shortcuts WHERE folder_id = ?1;",
        [folder_id.to_string()],
        |row| row.get(0),
    )?)
}

fn parse_shortcut_row(row: &Row<'_>) -> TreeRepoResult<Shortcut> {
    Ok(Shortcut {
        id: uuid_column(row, "id", "shortcuts.id")?,
        folder_id: uuid_column(row, "folder_id", "shortcuts.folder_id")?,
        card_id: uuid_column(row, "card_id", "shortcuts.card_id")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
