//! Link Service for WinWork.
//!
//! Holds the tree rules on top of [`LinkRepository`]: link validation,
//! parent checks on create/update, recursive delete, and launching.

use std::collections::HashSet;

use rusqlite::Connection;

use crate::repositories::link_repository::{LinkRepository, LinkRepositoryTrait};
use crate::services::link_opener::LinkOpener;
use crate::types::errors::LinkError;
use crate::types::link::{Link, LinkTree, LinkType};

/// Trait defining link service operations.
pub trait LinkServiceTrait {
    fn validate(&self, link: &Link) -> Result<(), LinkError>;
    fn create_link(&mut self, link: &Link) -> Result<Link, LinkError>;
    fn update_link(&mut self, link: &Link) -> Result<bool, LinkError>;
    fn delete_link_recursive(&mut self, id: i64) -> Result<Vec<(String, LinkType)>, LinkError>;
    fn move_link(
        &mut self,
        id: i64,
        new_parent_id: Option<i64>,
        new_sort_order: i32,
    ) -> Result<bool, LinkError>;
    fn load_tree(&self) -> Result<LinkTree, LinkError>;
    fn open_link(&mut self, id: i64, opener: &dyn LinkOpener) -> Result<bool, LinkError>;
    fn record_access(&mut self, id: i64) -> Result<bool, LinkError>;
}

/// Link service over a SQLite connection.
pub struct LinkService<'a> {
    conn: &'a Connection,
    links: LinkRepository<'a>,
}

impl<'a> LinkService<'a> {
    /// Creates a new `LinkService` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            links: LinkRepository::new(conn),
        }
    }

    /// Read access to the underlying repository for plain queries.
    pub fn repository(&self) -> &LinkRepository<'a> {
        &self.links
    }

    /// `root` followed by its whole subtree, parents always before children.
    fn collect_subtree(&self, root: Link) -> Result<Vec<Link>, LinkError> {
        let mut seen = HashSet::from([root.id]);
        let mut ordered = vec![root];
        let mut next = 0;
        while next < ordered.len() {
            let parent_id = ordered[next].id;
            for child in self.links.get_children(Some(parent_id))? {
                if seen.insert(child.id) {
                    ordered.push(child);
                }
            }
            next += 1;
        }
        Ok(ordered)
    }
}

impl<'a> LinkServiceTrait for LinkService<'a> {
    /// Name must be present; every type except Folder and Notes needs a target.
    fn validate(&self, link: &Link) -> Result<(), LinkError> {
        if link.name.trim().is_empty() {
            return Err(LinkError::Validation("name is required".to_string()));
        }
        let has_target = link
            .url
            .as_deref()
            .is_some_and(|target| !target.trim().is_empty());
        if link.link_type.requires_target() && !has_target {
            return Err(LinkError::Validation(format!(
                "{:?} link '{}' needs a url, path or command",
                link.link_type, link.name
            )));
        }
        Ok(())
    }

    /// Validates and stores a new link at the end of its sibling group.
    fn create_link(&mut self, link: &Link) -> Result<Link, LinkError> {
        self.validate(link)?;
        if let Some(parent_id) = link.parent_id {
            self.links.validate_parent(None, parent_id)?;
        }

        let mut new_link = link.clone();
        new_link.name = link.name.trim().to_string();
        new_link.sort_order = self.links.next_sort_order(link.parent_id)?;
        new_link.access_count = 0;
        new_link.last_accessed_at = None;
        self.links.create(&new_link)
    }

    /// Validates and persists changes. A changed parent gets the same checks as a move.
    fn update_link(&mut self, link: &Link) -> Result<bool, LinkError> {
        self.validate(link)?;
        let Some(existing) = self.links.get_by_id(link.id)? else {
            return Ok(false);
        };

        if link.parent_id != existing.parent_id {
            if let Some(parent_id) = link.parent_id {
                self.links.validate_parent(Some(link.id), parent_id)?;
            }
        }

        if existing.is_folder()
            && !link.is_folder()
            && !self.links.get_children(Some(link.id))?.is_empty()
        {
            return Err(LinkError::Validation(format!(
                "folder '{}' still has children",
                existing.name
            )));
        }

        self.links.update(link)
    }

    /// Deletes `id` and everything below it, deepest rows first.
    ///
    /// Returns the (name, type) of every removed row, the requested link last.
    fn delete_link_recursive(&mut self, id: i64) -> Result<Vec<(String, LinkType)>, LinkError> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| LinkError::DatabaseError(e.to_string()))?;

        let Some(root) = self.links.get_by_id(id)? else {
            return Ok(Vec::new());
        };
        let subtree = self.collect_subtree(root)?;

        let mut removed = Vec::with_capacity(subtree.len());
        for link in subtree.into_iter().rev() {
            self.links.delete(link.id)?;
            removed.push((link.name, link.link_type));
        }

        tx.commit()
            .map_err(|e| LinkError::DatabaseError(e.to_string()))?;
        tracing::info!(id, removed = removed.len(), "link subtree deleted");
        Ok(removed)
    }

    fn move_link(
        &mut self,
        id: i64,
        new_parent_id: Option<i64>,
        new_sort_order: i32,
    ) -> Result<bool, LinkError> {
        self.links.move_link(id, new_parent_id, new_sort_order)
    }

    fn load_tree(&self) -> Result<LinkTree, LinkError> {
        Ok(LinkTree::from_links(self.links.get_all()?))
    }

    /// Launches the link through `opener` and records the access on success.
    fn open_link(&mut self, id: i64, opener: &dyn LinkOpener) -> Result<bool, LinkError> {
        let Some(link) = self.links.get_by_id(id)? else {
            return Ok(false);
        };
        opener.open(&link)?;
        self.links.update_access(id)
    }

    fn record_access(&mut self, id: i64) -> Result<bool, LinkError> {
        self.links.update_access(id)
    }
}
