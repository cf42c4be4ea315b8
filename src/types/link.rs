use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of a node in the link tree.
///
/// The discriminants are the values stored in `links.link_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkType {
    Folder = 0,
    WebUrl = 1,
    FilePath = 2,
    Application = 3,
    FolderPath = 4,
    WindowsStoreApp = 5,
    SystemLocation = 6,
    Notes = 7,
    Terminal = 8,
}

impl LinkType {
    pub const ALL: [LinkType; 9] = [
        LinkType::Folder,
        LinkType::WebUrl,
        LinkType::FilePath,
        LinkType::Application,
        LinkType::FolderPath,
        LinkType::WindowsStoreApp,
        LinkType::SystemLocation,
        LinkType::Notes,
        LinkType::Terminal,
    ];

    pub fn as_i64(self) -> i64 {
        self as i64
    }

    pub fn from_i64(value: i64) -> Option<LinkType> {
        Self::ALL.iter().copied().find(|t| t.as_i64() == value)
    }

    /// Only folders may hold children.
    pub fn is_container(self) -> bool {
        matches!(self, LinkType::Folder)
    }

    /// Whether a link of this type needs a url/path/command to be useful.
    pub fn requires_target(self) -> bool {
        !matches!(self, LinkType::Folder | LinkType::Notes)
    }
}

/// A node in the bookmark/launcher tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub name: String,
    pub url: Option<String>,
    pub link_type: LinkType,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub icon_path: Option<String>,
    pub parent_id: Option<i64>,
    pub sort_order: i32,
    pub access_count: i64,
    pub last_accessed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    /// UI state, never written to the store.
    #[serde(default)]
    pub is_expanded: bool,
    /// UI state, never written to the store.
    #[serde(default)]
    pub is_selected: bool,
}

impl Link {
    /// A not-yet-persisted link. `id` and timestamps are assigned on create.
    pub fn new(name: &str, link_type: LinkType, url: Option<&str>) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            url: url.map(str::to_string),
            link_type,
            description: None,
            notes: None,
            icon_path: None,
            parent_id: None,
            sort_order: 0,
            access_count: 0,
            last_accessed_at: None,
            created_at: 0,
            updated_at: 0,
            is_expanded: false,
            is_selected: false,
        }
    }

    pub fn folder(name: &str) -> Self {
        Self::new(name, LinkType::Folder, None)
    }

    pub fn with_parent(mut self, parent_id: Option<i64>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn is_folder(&self) -> bool {
        self.link_type.is_container()
    }
}

/// An in-memory view of the whole forest.
///
/// Parent/child relations are kept as id lists rather than nested structs,
/// so a link never owns its children.
#[derive(Debug, Clone, Default)]
pub struct LinkTree {
    links: HashMap<i64, Link>,
    children: HashMap<Option<i64>, Vec<i64>>,
}

impl LinkTree {
    /// Builds the tree from a flat list. Sibling lists follow `sort_order`, then id.
    ///
    /// A link whose parent is missing from `links` is treated as a root.
    pub fn from_links(links: Vec<Link>) -> Self {
        let by_id: HashMap<i64, Link> = links.into_iter().map(|l| (l.id, l)).collect();
        let mut children: HashMap<Option<i64>, Vec<i64>> = HashMap::new();

        let mut ids: Vec<i64> = by_id.keys().copied().collect();
        ids.sort_by_key(|id| (by_id[id].sort_order, *id));

        for id in ids {
            let parent = by_id[&id].parent_id.filter(|p| by_id.contains_key(p));
            children.entry(parent).or_default().push(id);
        }

        Self { links: by_id, children }
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Link> {
        self.links.get(&id)
    }

    /// Ids of the root links in display order.
    pub fn roots(&self) -> &[i64] {
        self.children_of(None)
    }

    /// Ids of the direct children of `parent` (`None` = roots) in display order.
    pub fn children_of(&self, parent: Option<i64>) -> &[i64] {
        self.children.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All descendants of `id`, depth-first in display order. `id` itself is excluded.
    pub fn descendants(&self, id: i64) -> Vec<i64> {
        let mut out = Vec::new();
        let mut stack: Vec<i64> = self.children_of(Some(id)).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children_of(Some(current)).iter().rev().copied());
        }
        out
    }

    /// Ids from the root down to `id`, inclusive. Empty if `id` is unknown.
    pub fn path_to(&self, id: i64) -> Vec<i64> {
        let mut path = Vec::new();
        let mut current = self.links.get(&id);
        while let Some(link) = current {
            if path.contains(&link.id) {
                break;
            }
            path.push(link.id);
            current = link.parent_id.and_then(|p| self.links.get(&p));
        }
        path.reverse();
        path
    }

    /// Depth of `id` below the roots (roots are depth 0).
    pub fn depth(&self, id: i64) -> Option<usize> {
        let path = self.path_to(id);
        if path.is_empty() {
            None
        } else {
            Some(path.len() - 1)
        }
    }
}
