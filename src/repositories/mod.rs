// WinWork repositories
// Each repository borrows the shared SQLite connection and owns one table group.

pub mod link_repository;
pub mod settings_repository;
pub mod tag_repository;
