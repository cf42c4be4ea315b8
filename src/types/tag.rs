use serde::{Deserialize, Serialize};

/// Color given to tags created without one.
pub const DEFAULT_TAG_COLOR: &str = "#3b82f6";

/// A label that can be attached to any number of links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Validates a hex color string (e.g. "#2ea44f" or "#fff").
pub fn is_valid_hex_color(color: &str) -> bool {
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}
