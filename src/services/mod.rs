// WinWork services
// Services hold the rules that sit above a single table: tree validation, launching, window styling.

pub mod link_opener;
pub mod link_service;
pub mod window_style;
