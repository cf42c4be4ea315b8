//! Tag Repository for WinWork.
//!
//! Implements `TagRepositoryTrait`: tag CRUD and the link↔tag join table,
//! backed by SQLite via `rusqlite`. Tag names are unique ignoring case
//! (`COLLATE NOCASE` on the column).

use rusqlite::{params, Connection, ErrorCode, Params};

use crate::database::{escape_like, now_millis};
use crate::types::errors::TagError;
use crate::types::tag::{is_valid_hex_color, Tag, DEFAULT_TAG_COLOR};

const SELECT_TAG: &str = "SELECT id, name, color, description, created_at, updated_at FROM tags";

/// Trait defining tag store operations.
pub trait TagRepositoryTrait {
    fn get_all(&self) -> Result<Vec<Tag>, TagError>;
    fn get_by_id(&self, id: i64) -> Result<Option<Tag>, TagError>;
    fn get_by_name(&self, name: &str) -> Result<Option<Tag>, TagError>;
    fn search(&self, query: &str) -> Result<Vec<Tag>, TagError>;
    fn get_tags_for_link(&self, link_id: i64) -> Result<Vec<Tag>, TagError>;
    fn create(
        &mut self,
        name: &str,
        color: Option<&str>,
        description: Option<&str>,
    ) -> Result<Tag, TagError>;
    fn get_or_create(&mut self, name: &str) -> Result<Tag, TagError>;
    fn update(&mut self, tag: &Tag) -> Result<bool, TagError>;
    fn delete(&mut self, id: i64) -> Result<bool, TagError>;
    fn add_tag_to_link(&mut self, link_id: i64, tag_id: i64) -> Result<bool, TagError>;
    fn remove_tag_from_link(&mut self, link_id: i64, tag_id: i64) -> Result<bool, TagError>;
}

/// Tag repository backed by a SQLite connection.
pub struct TagRepository<'a> {
    conn: &'a Connection,
}

fn db_err(e: rusqlite::Error) -> TagError {
    TagError::DatabaseError(e.to_string())
}

/// Maps a UNIQUE violation on `tags.name` to `DuplicateName`.
fn write_err(e: rusqlite::Error, name: &str) -> TagError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation => {
            TagError::DuplicateName(name.to_string())
        }
        _ => db_err(e),
    }
}

impl<'a> TagRepository<'a> {
    /// Creates a new `TagRepository` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_tag(row: &rusqlite::Row) -> rusqlite::Result<Tag> {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
            color: row.get(2)?,
            description: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    fn query_tags<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Tag>, TagError> {
        let mut stmt = self.conn.prepare(sql).map_err(db_err)?;
        let rows = stmt.query_map(params, Self::row_to_tag).map_err(db_err)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(db_err)?);
        }
        Ok(results)
    }

    fn validate(name: &str, color: &str) -> Result<(), TagError> {
        if name.trim().is_empty() {
            return Err(TagError::InvalidName(name.to_string()));
        }
        if !is_valid_hex_color(color) {
            return Err(TagError::InvalidColor(color.to_string()));
        }
        Ok(())
    }

    fn pair_targets_exist(&self, link_id: i64, tag_id: i64) -> Result<bool, TagError> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM links WHERE id = ?1) \
                 AND EXISTS(SELECT 1 FROM tags WHERE id = ?2)",
                params![link_id, tag_id],
                |row| row.get(0),
            )
            .map_err(db_err)
    }
}

impl<'a> TagRepositoryTrait for TagRepository<'a> {
    fn get_all(&self) -> Result<Vec<Tag>, TagError> {
        self.query_tags(&format!("{} ORDER BY name COLLATE NOCASE", SELECT_TAG), [])
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Tag>, TagError> {
        let result = self.conn.query_row(
            &format!("{} WHERE id = ?1", SELECT_TAG),
            params![id],
            Self::row_to_tag,
        );
        match result {
            Ok(tag) => Ok(Some(tag)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    /// Exact name lookup, ignoring case.
    fn get_by_name(&self, name: &str) -> Result<Option<Tag>, TagError> {
        let result = self.conn.query_row(
            &format!("{} WHERE name = ?1", SELECT_TAG),
            params![name.trim()],
            Self::row_to_tag,
        );
        match result {
            Ok(tag) => Ok(Some(tag)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    /// Substring match on the name, ignoring case. Wildcards match literally;
    /// a blank query finds nothing.
    fn search(&self, query: &str) -> Result<Vec<Tag>, TagError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", escape_like(query));
        self.query_tags(
            &format!(
                "{} WHERE name LIKE ?1 ESCAPE '\\' ORDER BY name COLLATE NOCASE",
                SELECT_TAG
            ),
            params![pattern],
        )
    }

    fn get_tags_for_link(&self, link_id: i64) -> Result<Vec<Tag>, TagError> {
        self.query_tags(
            "SELECT t.id, t.name, t.color, t.description, t.created_at, t.updated_at \
             FROM tags t JOIN link_tags lt ON lt.tag_id = t.id \
             WHERE lt.link_id = ?1 ORDER BY t.name COLLATE NOCASE",
            params![link_id],
        )
    }

    /// Creates a tag. `color` defaults to [`DEFAULT_TAG_COLOR`].
    fn create(
        &mut self,
        name: &str,
        color: Option<&str>,
        description: Option<&str>,
    ) -> Result<Tag, TagError> {
        let name = name.trim();
        let color = color.unwrap_or(DEFAULT_TAG_COLOR);
        Self::validate(name, color)?;

        if self.get_by_name(name)?.is_some() {
            return Err(TagError::DuplicateName(name.to_string()));
        }

        let now = now_millis();
        self.conn
            .execute(
                "INSERT INTO tags (name, color, description, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![name, color, description, now, now],
            )
            .map_err(|e| write_err(e, name))?;

        let tag = Tag {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
            color: color.to_string(),
            description: description.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        tracing::info!(id = tag.id, name = %tag.name, "tag created");
        Ok(tag)
    }

    fn get_or_create(&mut self, name: &str) -> Result<Tag, TagError> {
        match self.get_by_name(name)? {
            Some(tag) => Ok(tag),
            None => self.create(name, None, None),
        }
    }

    fn update(&mut self, tag: &Tag) -> Result<bool, TagError> {
        let name = tag.name.trim();
        Self::validate(name, &tag.color)?;

        let affected = self
            .conn
            .execute(
                "UPDATE tags SET name = ?1, color = ?2, description = ?3, updated_at = ?4 WHERE id = ?5",
                params![name, tag.color, tag.description, now_millis(), tag.id],
            )
            .map_err(|e| write_err(e, name))?;
        Ok(affected > 0)
    }

    /// Deletes a tag. Its link associations cascade.
    fn delete(&mut self, id: i64) -> Result<bool, TagError> {
        let affected = self
            .conn
            .execute("DELETE FROM tags WHERE id = ?1", params![id])
            .map_err(db_err)?;
        if affected > 0 {
            tracing::info!(id, "tag deleted");
        }
        Ok(affected > 0)
    }

    /// Attaches a tag to a link. `false` if already attached or either side is missing.
    fn add_tag_to_link(&mut self, link_id: i64, tag_id: i64) -> Result<bool, TagError> {
        if !self.pair_targets_exist(link_id, tag_id)? {
            return Ok(false);
        }
        let affected = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO link_tags (link_id, tag_id, created_at) VALUES (?1, ?2, ?3)",
                params![link_id, tag_id, now_millis()],
            )
            .map_err(db_err)?;
        Ok(affected == 1)
    }

    /// Detaches a tag from a link. `false` if the pair was not present.
    fn remove_tag_from_link(&mut self, link_id: i64, tag_id: i64) -> Result<bool, TagError> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM link_tags WHERE link_id = ?1 AND tag_id = ?2",
                params![link_id, tag_id],
            )
            .map_err(db_err)?;
        Ok(affected > 0)
    }
}
