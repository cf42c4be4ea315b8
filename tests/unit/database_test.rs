//! Unit tests for the WinWork database layer (connection + migrations).

use tempfile::TempDir;
use winwork::database::migrations::{get_schema_version, run_all, CURRENT_SCHEMA_VERSION};
use winwork::database::Database;

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_all_tables() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    for table in &["links", "tags", "link_tags", "app_settings", "schema_version"] {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "Table '{}' should exist after migrations", table);
    }
}

#[test]
fn test_migrations_create_indexes() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    for index in &["idx_links_parent", "idx_links_last_accessed", "idx_link_tags_tag"] {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='index' AND name=?1",
                [index],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "Index '{}' should exist after migrations", index);
    }
}

#[test]
fn test_schema_version_is_current() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let result = run_all(db.connection());
    assert!(result.is_ok(), "Running migrations twice should succeed (idempotent)");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_open_file_database_and_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("links.db");

    {
        let db = Database::open(&db_path).expect("open with file path should succeed");
        db.connection()
            .execute(
                "INSERT INTO links (name, link_type, sort_order, created_at, updated_at)
                 VALUES ('Docs', 0, 0, 1700000000000, 1700000000000)",
                [],
            )
            .unwrap();
    }
    assert!(db_path.exists(), "Database file should exist on disk");

    let db = Database::open(&db_path).expect("reopen should succeed");
    let count: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_foreign_keys_are_enforced() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let result = db.connection().execute(
        "INSERT INTO links (name, link_type, parent_id, sort_order, created_at, updated_at)
         VALUES ('Orphan', 1, 999, 0, 1, 1)",
        [],
    );
    assert!(result.is_err(), "parent_id must reference an existing link");
}

#[test]
fn test_tag_names_are_unique_ignoring_case() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();
    conn.execute(
        "INSERT INTO tags (name, color, created_at, updated_at) VALUES ('Work', '#fff', 1, 1)",
        [],
    )
    .unwrap();
    let result = conn.execute(
        "INSERT INTO tags (name, color, created_at, updated_at) VALUES ('WORK', '#000', 1, 1)",
        [],
    );
    assert!(result.is_err(), "name is UNIQUE COLLATE NOCASE");
}

#[test]
fn test_deleting_a_link_cascades_to_children_and_tags() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    conn.execute_batch(
        "INSERT INTO links (id, name, link_type, parent_id, sort_order, created_at, updated_at)
             VALUES (1, 'Folder', 0, NULL, 0, 1, 1);
         INSERT INTO links (id, name, url, link_type, parent_id, sort_order, created_at, updated_at)
             VALUES (2, 'Child', 'https://example.com', 1, 1, 0, 1, 1);
         INSERT INTO tags (id, name, color, created_at, updated_at) VALUES (1, 'web', '#fff', 1, 1);
         INSERT INTO link_tags (link_id, tag_id, created_at) VALUES (2, 1, 1);",
    )
    .unwrap();

    conn.execute("DELETE FROM links WHERE id = 1", []).unwrap();

    let links: i64 = conn.query_row("SELECT COUNT(*) FROM links", [], |r| r.get(0)).unwrap();
    let joins: i64 = conn.query_row("SELECT COUNT(*) FROM link_tags", [], |r| r.get(0)).unwrap();
    let tags: i64 = conn.query_row("SELECT COUNT(*) FROM tags", [], |r| r.get(0)).unwrap();
    assert_eq!(links, 0);
    assert_eq!(joins, 0);
    assert_eq!(tags, 1, "tags themselves survive");
}
