//! Link Repository for WinWork.
//!
//! Implements `LinkRepositoryTrait`: CRUD, tree queries and ordered
//! move/reparent for the link forest, backed by SQLite via `rusqlite`.
//!
//! Parent filters use `parent_id IS ?1` so a single statement covers both the
//! root group (`NULL`) and a concrete folder.

use rusqlite::{params, Connection, Params};

use crate::database::{escape_like, now_millis};
use crate::types::errors::LinkError;
use crate::types::link::{Link, LinkType};

const SELECT_LINK: &str = "SELECT id, name, url, link_type, description, notes, icon_path, \
     parent_id, sort_order, access_count, last_accessed_at, created_at, updated_at FROM links";

/// Trait defining link store operations.
pub trait LinkRepositoryTrait {
    fn get_all(&self) -> Result<Vec<Link>, LinkError>;
    fn get_by_id(&self, id: i64) -> Result<Option<Link>, LinkError>;
    fn get_roots(&self) -> Result<Vec<Link>, LinkError>;
    fn get_children(&self, parent_id: Option<i64>) -> Result<Vec<Link>, LinkError>;
    fn search(&self, query: &str) -> Result<Vec<Link>, LinkError>;
    fn get_by_tag(&self, tag_id: i64) -> Result<Vec<Link>, LinkError>;
    fn get_most_accessed(&self, limit: usize) -> Result<Vec<Link>, LinkError>;
    fn get_recently_accessed(&self, limit: usize) -> Result<Vec<Link>, LinkError>;
    /// Ancestor ids of `id`, nearest parent first, root last.
    fn get_ancestors(&self, id: i64) -> Result<Vec<i64>, LinkError>;
    fn create(&mut self, link: &Link) -> Result<Link, LinkError>;
    fn update(&mut self, link: &Link) -> Result<bool, LinkError>;
    fn delete(&mut self, id: i64) -> Result<bool, LinkError>;
    fn update_access(&mut self, id: i64) -> Result<bool, LinkError>;
    fn move_link(
        &mut self,
        id: i64,
        new_parent_id: Option<i64>,
        new_sort_order: i32,
    ) -> Result<bool, LinkError>;
    fn next_sort_order(&self, parent_id: Option<i64>) -> Result<i32, LinkError>;
    /// Checks that `parent_id` can hold `link_id` (or a new link when `None`).
    fn validate_parent(&self, link_id: Option<i64>, parent_id: i64) -> Result<(), LinkError>;
}

/// Link repository backed by a SQLite connection.
pub struct LinkRepository<'a> {
    conn: &'a Connection,
}

fn db_err(e: rusqlite::Error) -> LinkError {
    LinkError::DatabaseError(e.to_string())
}

impl<'a> LinkRepository<'a> {
    /// Creates a new `LinkRepository` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Reads a single `Link` row into a struct.
    pub(crate) fn row_to_link(row: &rusqlite::Row) -> rusqlite::Result<Link> {
        let raw_type: i64 = row.get(3)?;
        let link_type = LinkType::from_i64(raw_type)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(3, raw_type))?;
        Ok(Link {
            id: row.get(0)?,
            name: row.get(1)?,
            url: row.get(2)?,
            link_type,
            description: row.get(4)?,
            notes: row.get(5)?,
            icon_path: row.get(6)?,
            parent_id: row.get(7)?,
            sort_order: row.get(8)?,
            access_count: row.get(9)?,
            last_accessed_at: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
            is_expanded: false,
            is_selected: false,
        })
    }

    fn query_links<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Link>, LinkError> {
        let mut stmt = self.conn.prepare(sql).map_err(db_err)?;
        let rows = stmt.query_map(params, Self::row_to_link).map_err(db_err)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(db_err)?);
        }
        Ok(results)
    }

    /// Ids of the children of `parent_id` in display order.
    fn child_ids(&self, parent_id: Option<i64>) -> Result<Vec<i64>, LinkError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM links WHERE parent_id IS ?1 ORDER BY sort_order, id")
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![parent_id], |row| row.get::<_, i64>(0))
            .map_err(db_err)?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row.map_err(db_err)?);
        }
        Ok(ids)
    }

    fn parent_of(&self, id: i64) -> Result<Option<Option<i64>>, LinkError> {
        let result = self.conn.query_row(
            "SELECT parent_id FROM links WHERE id = ?1",
            params![id],
            |row| row.get::<_, Option<i64>>(0),
        );
        match result {
            Ok(parent) => Ok(Some(parent)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }
}

impl<'a> LinkRepositoryTrait for LinkRepository<'a> {
    /// Returns every link, grouped by parent and ordered among siblings.
    fn get_all(&self) -> Result<Vec<Link>, LinkError> {
        self.query_links(
            &format!("{} ORDER BY parent_id, sort_order, id", SELECT_LINK),
            [],
        )
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Link>, LinkError> {
        let result = self.conn.query_row(
            &format!("{} WHERE id = ?1", SELECT_LINK),
            params![id],
            Self::row_to_link,
        );
        match result {
            Ok(link) => Ok(Some(link)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    fn get_roots(&self) -> Result<Vec<Link>, LinkError> {
        self.get_children(None)
    }

    /// Lists the direct children of a folder (or the roots if `parent_id` is `None`).
    fn get_children(&self, parent_id: Option<i64>) -> Result<Vec<Link>, LinkError> {
        self.query_links(
            &format!(
                "{} WHERE parent_id IS ?1 ORDER BY sort_order, id",
                SELECT_LINK
            ),
            params![parent_id],
        )
    }

    /// Case-insensitive substring search over name, description and url.
    fn search(&self, query: &str) -> Result<Vec<Link>, LinkError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", escape_like(query));
        tracing::debug!(query, "searching links");
        self.query_links(
            &format!(
                "{} WHERE name LIKE ?1 ESCAPE '\\' \
                 OR description LIKE ?1 ESCAPE '\\' \
                 OR url LIKE ?1 ESCAPE '\\' \
                 ORDER BY name COLLATE NOCASE, id",
                SELECT_LINK
            ),
            params![pattern],
        )
    }

    fn get_by_tag(&self, tag_id: i64) -> Result<Vec<Link>, LinkError> {
        self.query_links(
            "SELECT l.id, l.name, l.url, l.link_type, l.description, l.notes, l.icon_path, \
             l.parent_id, l.sort_order, l.access_count, l.last_accessed_at, l.created_at, l.updated_at \
             FROM links l JOIN link_tags lt ON lt.link_id = l.id \
             WHERE lt.tag_id = ?1 ORDER BY l.name COLLATE NOCASE, l.id",
            params![tag_id],
        )
    }

    fn get_most_accessed(&self, limit: usize) -> Result<Vec<Link>, LinkError> {
        self.query_links(
            &format!(
                "{} WHERE access_count > 0 \
                 ORDER BY access_count DESC, last_accessed_at DESC, id LIMIT ?1",
                SELECT_LINK
            ),
            params![limit as i64],
        )
    }

    fn get_recently_accessed(&self, limit: usize) -> Result<Vec<Link>, LinkError> {
        self.query_links(
            &format!(
                "{} WHERE last_accessed_at IS NOT NULL \
                 ORDER BY last_accessed_at DESC, id DESC LIMIT ?1",
                SELECT_LINK
            ),
            params![limit as i64],
        )
    }

    fn get_ancestors(&self, id: i64) -> Result<Vec<i64>, LinkError> {
        let mut ancestors = Vec::new();
        let mut current = self.parent_of(id)?.flatten();
        while let Some(parent) = current {
            // A corrupt store could already contain a loop; stop instead of spinning.
            if parent == id || ancestors.contains(&parent) {
                tracing::warn!(link_id = id, parent, "cycle found in stored link tree");
                break;
            }
            ancestors.push(parent);
            current = self.parent_of(parent)?.flatten();
        }
        Ok(ancestors)
    }

    /// Inserts a link. Returns it with the assigned id and timestamps.
    fn create(&mut self, link: &Link) -> Result<Link, LinkError> {
        let now = now_millis();
        self.conn
            .execute(
                "INSERT INTO links (name, url, link_type, description, notes, icon_path, parent_id, \
                 sort_order, access_count, last_accessed_at, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    link.name,
                    link.url,
                    link.link_type.as_i64(),
                    link.description,
                    link.notes,
                    link.icon_path,
                    link.parent_id,
                    link.sort_order,
                    link.access_count,
                    link.last_accessed_at,
                    now,
                    now,
                ],
            )
            .map_err(db_err)?;

        let mut created = link.clone();
        created.id = self.conn.last_insert_rowid();
        created.created_at = now;
        created.updated_at = now;
        tracing::info!(id = created.id, name = %created.name, "link created");
        Ok(created)
    }

    /// Persists every stored field except the access metadata.
    fn update(&mut self, link: &Link) -> Result<bool, LinkError> {
        let affected = self
            .conn
            .execute(
                "UPDATE links SET name = ?1, url = ?2, link_type = ?3, description = ?4, notes = ?5, \
                 icon_path = ?6, parent_id = ?7, sort_order = ?8, updated_at = ?9 WHERE id = ?10",
                params![
                    link.name,
                    link.url,
                    link.link_type.as_i64(),
                    link.description,
                    link.notes,
                    link.icon_path,
                    link.parent_id,
                    link.sort_order,
                    now_millis(),
                    link.id,
                ],
            )
            .map_err(db_err)?;
        Ok(affected > 0)
    }

    /// Deletes a link. Descendants and tag rows go with it via `ON DELETE CASCADE`.
    fn delete(&mut self, id: i64) -> Result<bool, LinkError> {
        let affected = self
            .conn
            .execute("DELETE FROM links WHERE id = ?1", params![id])
            .map_err(db_err)?;
        if affected > 0 {
            tracing::info!(id, "link deleted");
        }
        Ok(affected > 0)
    }

    fn update_access(&mut self, id: i64) -> Result<bool, LinkError> {
        let now = now_millis();
        let affected = self
            .conn
            .execute(
                "UPDATE links SET access_count = access_count + 1, last_accessed_at = ?1, \
                 updated_at = ?1 WHERE id = ?2",
                params![now, id],
            )
            .map_err(db_err)?;
        Ok(affected > 0)
    }

    /// Reparents `id` under `new_parent_id` at position `new_sort_order`.
    ///
    /// The destination sibling group is renumbered `0..n` in the same
    /// transaction; the group the link left keeps its gap.
    fn move_link(
        &mut self,
        id: i64,
        new_parent_id: Option<i64>,
        new_sort_order: i32,
    ) -> Result<bool, LinkError> {
        let tx = self.conn.unchecked_transaction().map_err(db_err)?;

        if self.parent_of(id)?.is_none() {
            return Ok(false);
        }
        if let Some(parent_id) = new_parent_id {
            self.validate_parent(Some(id), parent_id)?;
        }

        let mut siblings = self.child_ids(new_parent_id)?;
        siblings.retain(|sibling| *sibling != id);
        let index = (new_sort_order.max(0) as usize).min(siblings.len());
        siblings.insert(index, id);

        let now = now_millis();
        tx.execute(
            "UPDATE links SET parent_id = ?1, updated_at = ?2 WHERE id = ?3",
            params![new_parent_id, now, id],
        )
        .map_err(db_err)?;

        for (order, sibling) in siblings.iter().enumerate() {
            tx.execute(
                "UPDATE links SET sort_order = ?1, updated_at = ?2 \
                 WHERE id = ?3 AND sort_order != ?1",
                params![order as i32, now, sibling],
            )
            .map_err(db_err)?;
        }

        tx.commit().map_err(db_err)?;
        tracing::info!(id, parent = ?new_parent_id, position = index, "link moved");
        Ok(true)
    }

    /// `max(sort_order) + 1` among the siblings, 0 for an empty group.
    fn next_sort_order(&self, parent_id: Option<i64>) -> Result<i32, LinkError> {
        self.conn
            .query_row(
                "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM links WHERE parent_id IS ?1",
                params![parent_id],
                |row| row.get(0),
            )
            .map_err(db_err)
    }

    fn validate_parent(&self, link_id: Option<i64>, parent_id: i64) -> Result<(), LinkError> {
        let parent = self
            .get_by_id(parent_id)?
            .ok_or(LinkError::InvalidParent(parent_id))?;
        if !parent.is_folder() {
            return Err(LinkError::InvalidParent(parent_id));
        }

        if let Some(link_id) = link_id {
            if parent_id == link_id || self.get_ancestors(parent_id)?.contains(&link_id) {
                return Err(LinkError::CycleDetected { link_id, parent_id });
            }
        }
        Ok(())
    }
}
