//! WinWork: the link tree, tag and settings store behind the WinWork launcher.
//!
//! This library crate exposes all modules for use by the RPC binary and integration tests.

pub mod app;
pub mod database;
pub mod platform;
pub mod repositories;
pub mod rpc_handler;
pub mod services;
pub mod types;
