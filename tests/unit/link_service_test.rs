//! Unit tests for LinkService: validation, tree rules, recursive delete
//! and launching through a `LinkOpener`.

use std::cell::RefCell;

use rstest::rstest;
use winwork::database::Database;
use winwork::repositories::link_repository::LinkRepositoryTrait;
use winwork::repositories::tag_repository::{TagRepository, TagRepositoryTrait};
use winwork::services::link_opener::LinkOpener;
use winwork::services::link_service::{LinkService, LinkServiceTrait};
use winwork::types::errors::{LinkError, OpenError};
use winwork::types::link::{Link, LinkType};

fn setup() -> Database {
    Database::open_in_memory().expect("Failed to open in-memory database")
}

fn count_links(db: &Database) -> i64 {
    db.connection()
        .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))
        .unwrap()
}

/// Records what it was asked to open, or fails every launch.
#[derive(Default)]
struct RecordingOpener {
    opened: RefCell<Vec<i64>>,
    fail: bool,
}

impl LinkOpener for RecordingOpener {
    fn open(&self, link: &Link) -> Result<(), OpenError> {
        if self.fail {
            return Err(OpenError::LaunchFailed(link.name.clone()));
        }
        self.opened.borrow_mut().push(link.id);
        Ok(())
    }
}

#[rstest]
#[case(LinkType::Folder, None, true)]
#[case(LinkType::Notes, None, true)]
#[case(LinkType::WebUrl, Some("https://example.com"), true)]
#[case(LinkType::WebUrl, None, false)]
#[case(LinkType::WebUrl, Some("   "), false)]
#[case(LinkType::FilePath, None, false)]
#[case(LinkType::Application, Some("C:\\Tools\\app.exe"), true)]
#[case(LinkType::FolderPath, None, false)]
#[case(LinkType::WindowsStoreApp, None, false)]
#[case(LinkType::SystemLocation, Some("shell:Downloads"), true)]
#[case(LinkType::Terminal, None, false)]
#[case(LinkType::Terminal, Some("git status"), true)]
fn test_validate_requires_target_by_type(
    #[case] link_type: LinkType,
    #[case] url: Option<&str>,
    #[case] valid: bool,
) {
    let db = setup();
    let svc = LinkService::new(db.connection());
    let link = Link::new("Name", link_type, url);
    assert_eq!(svc.validate(&link).is_ok(), valid, "{:?} {:?}", link_type, url);
}

#[rstest]
#[case("")]
#[case("   ")]
fn test_validate_rejects_blank_name(#[case] name: &str) {
    let db = setup();
    let svc = LinkService::new(db.connection());
    let err = svc.validate(&Link::folder(name)).unwrap_err();
    assert!(matches!(err, LinkError::Validation(_)));
}

#[test]
fn test_create_link_appends_to_sibling_group() {
    let db = setup();
    let mut svc = LinkService::new(db.connection());

    let folder = svc.create_link(&Link::folder("  Work  ")).unwrap();
    assert_eq!(folder.name, "Work");
    assert_eq!(folder.sort_order, 0);

    let a = svc
        .create_link(&Link::new("A", LinkType::WebUrl, Some("https://a.example.com")).with_parent(Some(folder.id)))
        .unwrap();
    let b = svc
        .create_link(&Link::new("B", LinkType::WebUrl, Some("https://b.example.com")).with_parent(Some(folder.id)))
        .unwrap();
    let root2 = svc.create_link(&Link::folder("Home")).unwrap();

    assert_eq!((a.sort_order, b.sort_order), (0, 1));
    assert_eq!(root2.sort_order, 1);
}

#[test]
fn test_create_link_resets_access_data() {
    let db = setup();
    let mut svc = LinkService::new(db.connection());

    let mut link = Link::new("A", LinkType::WebUrl, Some("https://a.example.com"));
    link.access_count = 40;
    link.last_accessed_at = Some(1);
    let created = svc.create_link(&link).unwrap();
    assert_eq!(created.access_count, 0);
    assert!(created.last_accessed_at.is_none());
}

#[test]
fn test_create_link_rejects_bad_parent() {
    let db = setup();
    let mut svc = LinkService::new(db.connection());

    let leaf = svc
        .create_link(&Link::new("Leaf", LinkType::WebUrl, Some("https://l.example.com")))
        .unwrap();
    let child = Link::folder("Child").with_parent(Some(leaf.id));
    assert_eq!(svc.create_link(&child), Err(LinkError::InvalidParent(leaf.id)));

    let orphan = Link::folder("Orphan").with_parent(Some(9999));
    assert_eq!(svc.create_link(&orphan), Err(LinkError::InvalidParent(9999)));
    assert_eq!(count_links(&db), 1);
}

#[test]
fn test_update_link_missing_returns_false() {
    let db = setup();
    let mut svc = LinkService::new(db.connection());
    let mut ghost = Link::folder("Ghost");
    ghost.id = 321;
    assert_eq!(svc.update_link(&ghost), Ok(false));
}

#[test]
fn test_update_link_rejects_cycle_through_parent_change() {
    let db = setup();
    let mut svc = LinkService::new(db.connection());

    let top = svc.create_link(&Link::folder("Top")).unwrap();
    let inner = svc
        .create_link(&Link::folder("Inner").with_parent(Some(top.id)))
        .unwrap();

    let mut moved = top.clone();
    moved.parent_id = Some(inner.id);
    assert_eq!(
        svc.update_link(&moved),
        Err(LinkError::CycleDetected { link_id: top.id, parent_id: inner.id })
    );
}

#[test]
fn test_update_link_keeps_folder_with_children() {
    let db = setup();
    let mut svc = LinkService::new(db.connection());

    let folder = svc.create_link(&Link::folder("Work")).unwrap();
    svc.create_link(&Link::folder("Sub").with_parent(Some(folder.id)))
        .unwrap();

    let mut changed = folder.clone();
    changed.link_type = LinkType::WebUrl;
    changed.url = Some("https://example.com".into());
    assert!(matches!(svc.update_link(&changed), Err(LinkError::Validation(_))));

    let mut renamed = folder.clone();
    renamed.name = "Office".into();
    assert_eq!(svc.update_link(&renamed), Ok(true));
    assert_eq!(
        svc.repository().get_by_id(folder.id).unwrap().unwrap().name,
        "Office"
    );
}

#[test]
fn test_delete_link_recursive_removes_subtree() {
    let db = setup();
    let mut svc = LinkService::new(db.connection());

    let top = svc.create_link(&Link::folder("Top")).unwrap();
    let mid = svc
        .create_link(&Link::folder("Mid").with_parent(Some(top.id)))
        .unwrap();
    svc.create_link(&Link::new("Deep", LinkType::Notes, None).with_parent(Some(mid.id)))
        .unwrap();
    svc.create_link(
        &Link::new("Site", LinkType::WebUrl, Some("https://s.example.com")).with_parent(Some(top.id)),
    )
    .unwrap();
    let keep = svc.create_link(&Link::folder("Keep")).unwrap();

    let removed = svc.delete_link_recursive(top.id).unwrap();
    assert_eq!(removed.len(), 4);
    assert_eq!(removed.last(), Some(&("Top".to_string(), LinkType::Folder)));
    assert!(removed.contains(&("Deep".to_string(), LinkType::Notes)));
    assert!(removed.contains(&("Site".to_string(), LinkType::WebUrl)));

    // Children always precede their parent
    let pos = |name: &str| removed.iter().position(|(n, _)| n == name).unwrap();
    assert!(pos("Deep") < pos("Mid"));

    assert_eq!(count_links(&db), 1);
    assert!(svc.repository().get_by_id(keep.id).unwrap().is_some());
}

#[test]
fn test_delete_link_recursive_missing_is_empty() {
    let db = setup();
    let mut svc = LinkService::new(db.connection());
    assert!(svc.delete_link_recursive(5).unwrap().is_empty());
}

#[test]
fn test_delete_link_recursive_drops_tag_associations() {
    let db = setup();
    let conn = db.connection();
    let mut svc = LinkService::new(conn);
    let mut tags = TagRepository::new(conn);

    let link = svc
        .create_link(&Link::new("A", LinkType::WebUrl, Some("https://a.example.com")))
        .unwrap();
    let tag = tags.create("Work", None, None).unwrap();
    tags.add_tag_to_link(link.id, tag.id).unwrap();

    svc.delete_link_recursive(link.id).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM link_tags", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 0);
    assert!(tags.get_by_id(tag.id).unwrap().is_some());
}

#[test]
fn test_load_tree() {
    let db = setup();
    let mut svc = LinkService::new(db.connection());

    let work = svc.create_link(&Link::folder("Work")).unwrap();
    let sub = svc
        .create_link(&Link::folder("Sub").with_parent(Some(work.id)))
        .unwrap();
    let home = svc.create_link(&Link::folder("Home")).unwrap();

    let tree = svc.load_tree().unwrap();
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.roots(), &[work.id, home.id]);
    assert_eq!(tree.children_of(Some(work.id)), &[sub.id]);
    assert_eq!(tree.depth(sub.id), Some(1));
}

#[test]
fn test_open_link_records_access() {
    let db = setup();
    let mut svc = LinkService::new(db.connection());
    let opener = RecordingOpener::default();

    let link = svc
        .create_link(&Link::new("A", LinkType::WebUrl, Some("https://a.example.com")))
        .unwrap();
    assert_eq!(svc.open_link(link.id, &opener), Ok(true));
    assert_eq!(*opener.opened.borrow(), vec![link.id]);

    let stored = svc.repository().get_by_id(link.id).unwrap().unwrap();
    assert_eq!(stored.access_count, 1);
    assert!(stored.last_accessed_at.is_some());

    assert_eq!(svc.open_link(999, &opener), Ok(false));
}

#[test]
fn test_open_link_failure_leaves_access_untouched() {
    let db = setup();
    let mut svc = LinkService::new(db.connection());
    let opener = RecordingOpener { fail: true, ..Default::default() };

    let link = svc
        .create_link(&Link::new("A", LinkType::WebUrl, Some("https://a.example.com")))
        .unwrap();
    assert_eq!(
        svc.open_link(link.id, &opener),
        Err(LinkError::Open(OpenError::LaunchFailed("A".into())))
    );
    let stored = svc.repository().get_by_id(link.id).unwrap().unwrap();
    assert_eq!(stored.access_count, 0);
}

#[test]
fn test_record_access() {
    let db = setup();
    let mut svc = LinkService::new(db.connection());
    let link = svc.create_link(&Link::folder("F")).unwrap();
    assert_eq!(svc.record_access(link.id), Ok(true));
    assert_eq!(svc.record_access(link.id + 1), Ok(false));
}
