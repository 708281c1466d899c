//! SQLite card persistence for [`SqliteTreeStore`].

use crate::model::card::{Card, CardId};
use crate::model::folder::FolderId;
use crate::model::owner::OwnerId;
use crate::model::EntityKind;
use crate::repo::folder_repo::require_folder;
use crate::repo::tree_store::{
    id_param, now_ms, opt_uuid_column, owner_column, query_ids, reorder_group, uuid_column,
    CardChanges, CardRepository, SqliteTreeStore, TreeRepoError, TreeRepoResult,
};
use crate::tree::order::next_order;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const CARD_COLUMNS: &str = "k.id AS id,
    k.owner_id AS owner_id,
    k.folder_id AS folder_id,
    k.title AS title,
    k.sort_order AS sort_order,
    k.color AS color,
    k.section_count AS section_count,
    k.created_at AS created_at,
    k.updated_at AS updated_at";

impl CardRepository for SqliteTreeStore<'_> {
    fn insert_card(
        &self,
        owner: &OwnerId,
        folder_id: Option<FolderId>,
        title: &str,
        color: Option<&str>,
    ) -> TreeRepoResult<Card> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if let Some(folder_id) = folder_id {
            require_folder(&tx, owner, folder_id)?;
        }

        let id = Uuid::new_v4();
        let sort_order = next_order(max_card_order(&tx, owner, folder_id)?);
        let now = now_ms();
        tx.execute(
            "INSERT INTO cards (
                id, owner_id, folder_id, title, sort_order, color, section_count,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7);",
            params![
                id.to_string(),
                owner.as_str(),
                id_param(folder_id),
                title,
                sort_order,
                color,
                now,
            ],
        )?;
        let card = require_card(&tx, owner, id)?;
        tx.commit()?;
        Ok(card)
    }

    fn get_card(&self, owner: &OwnerId, id: CardId) -> TreeRepoResult<Option<Card>> {
        load_card(self.conn, owner, id)
    }

    fn list_cards(
        &self,
        owner: &OwnerId,
        folder_id: Option<FolderId>,
    ) -> TreeRepoResult<Vec<Card>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CARD_COLUMNS}
             FROM cards k
             WHERE k.owner_id = ?1
               AND k.folder_id IS ?2
             ORDER BY k.sort_order ASC, k.created_at ASC, k.id ASC;"
        ))?;
        let mut rows = stmt.query(params![owner.as_str(), id_param(folder_id)])?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(parse_card_row(row)?);
        }
        Ok(cards)
    }

    fn update_card(
        &self,
        owner: &OwnerId,
        id: CardId,
        changes: &CardChanges,
    ) -> TreeRepoResult<Card> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let current = require_card(&tx, owner, id)?;
        let title = changes.title.as_deref().unwrap_or(current.title.as_str());
        let color = match &changes.color {
            Some(color) => color.as_deref(),
            None => current.color.as_deref(),
        };
        let section_count = changes.section_count.unwrap_or(current.section_count);

        tx.execute(
            "UPDATE cards
             SET title = ?3,
                 color = ?4,
                 section_count = ?5,
                 updated_at = ?6
             WHERE id = ?1
               AND owner_id = ?2;",
            params![
                id.to_string(),
                owner.as_str(),
                title,
                color,
                section_count,
                now_ms(),
            ],
        )?;
        let updated = require_card(&tx, owner, id)?;
        tx.commit()?;
        Ok(updated)
    }

    fn move_card(
        &self,
        owner: &OwnerId,
        id: CardId,
        folder_id: Option<FolderId>,
    ) -> TreeRepoResult<Card> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let current = require_card(&tx, owner, id)?;
        if current.folder_id == folder_id {
            return Ok(current);
        }
        if let Some(folder_id) = folder_id {
            require_folder(&tx, owner, folder_id)?;
        }

        let sort_order = next_order(max_card_order(&tx, owner, folder_id)?);
        tx.execute(
            "UPDATE cards
             SET folder_id = ?3,
                 sort_order = ?4,
                 updated_at = ?5
             WHERE id = ?1
               AND owner_id = ?2;",
            params![
                id.to_string(),
                owner.as_str(),
                id_param(folder_id),
                sort_order,
                now_ms(),
            ],
        )?;
        let moved = require_card(&tx, owner, id)?;
        tx.commit()?;
        Ok(moved)
    }

    fn reorder_cards(
        &self,
        owner: &OwnerId,
        folder_id: Option<FolderId>,
        ordered_ids: &[CardId],
    ) -> TreeRepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if let Some(folder_id) = folder_id {
            require_folder(&tx, owner, folder_id)?;
        }

        let folder = id_param(folder_id);
        let live = query_ids(
            &tx,
            "SELECT id FROM cards
             WHERE owner_id = ?1 AND folder_id IS ?2
             ORDER BY sort_order ASC, created_at ASC, id ASC;",
            &[&owner.as_str(), &folder],
            "cards.id",
        )?;
        let now = now_ms();
        reorder_group(
            EntityKind::Card,
            &live,
            ordered_ids,
            |id| Ok(load_card(&tx, owner, id)?.is_some()),
            |id, order| {
                Ok(tx.execute(
                    "UPDATE cards
                     SET sort_order = ?3,
                         updated_at = ?4
                     WHERE id = ?1
                       AND owner_id = ?2;",
                    params![id.to_string(), owner.as_str(), order, now],
                )?)
            },
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_card(&self, owner: &OwnerId, id: CardId) -> TreeRepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM cards WHERE id = ?1 AND owner_id = ?2;",
            params![id.to_string(), owner.as_str()],
        )?;
        if changed == 0 {
            return Err(TreeRepoError::NodeNotFound {
                kind: EntityKind::Card,
                id,
            });
        }
        Ok(())
    }
}

pub(crate) fn load_card(
    conn: &Connection,
    owner: &OwnerId,
    id: CardId,
) -> TreeRepoResult<Option<Card>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CARD_COLUMNS}
         FROM cards k
         WHERE k.id = ?1
           AND k.owner_id = ?2;"
    ))?;
    let card = stmt
        .query_row(params![id.to_string(), owner.as_str()], |row| {
            Ok(parse_card_row(row))
        })
        .optional()?;
    card.transpose()
}

pub(crate) fn require_card(conn: &Connection, owner: &OwnerId, id: CardId) -> TreeRepoResult<Card> {
    load_card(conn, owner, id)?.ok_or(TreeRepoError::NodeNotFound {
        kind: EntityKind::Card,
        id,
    })
}

fn max_card_order(
    conn: &Connection,
    owner: &OwnerId,
    folder_id: Option<FolderId>,
) -> TreeRepoResult<Option<i64>> {
    Ok(conn.query_row(
        "SELECT MAX(sort_order) FROM cards WHERE owner_id = ?1 AND folder_id IS ?2;",
        params![owner.as_str(), id_param(folder_id)],
        |row| row.get(0),
    )?)
}

fn parse_card_row(row: &Row<'_>) -> TreeRepoResult<Card> {
    let section_count: i64 = row.get("section_count")?;
    if section_count < 0 {
        return Err(TreeRepoError::InvalidData(format!(
            "negative section_count `{section_count}` in cards.section_count"
        )));
    }
    Ok(Card {
        id: uuid_column(row, "id", "cards.id")?,
        owner_id: owner_column(row, "owner_id", "cards.owner_id")?,
        folder_id: opt_uuid_column(row, "folder_id", "cards.folder_id")?,
        title: row.get("title")?,
        sort_order: row.get("sort_order")?,
        color: row.get("color")?,
        section_count,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
