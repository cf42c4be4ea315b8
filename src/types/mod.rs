// WinWork shared type definitions
// Each submodule defines types used across the repositories, services and RPC layer.

pub mod errors;
pub mod link;
pub mod settings;
pub mod tag;
