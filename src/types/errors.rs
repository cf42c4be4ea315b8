use std::fmt;

// === LinkError ===

/// Errors related to link tree operations.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkError {
    /// Link with the given ID was not found.
    NotFound(i64),
    /// The link failed validation (blank name, missing target, ...).
    Validation(String),
    /// The requested parent does not exist or cannot hold children.
    InvalidParent(i64),
    /// The move would make a link its own ancestor.
    CycleDetected { link_id: i64, parent_id: i64 },
    /// The link could not be launched.
    Open(OpenError),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::NotFound(id) => write!(f, "Link not found: {}", id),
            LinkError::Validation(msg) => write!(f, "Invalid link: {}", msg),
            LinkError::InvalidParent(id) => write!(f, "Invalid parent folder: {}", id),
            LinkError::CycleDetected { link_id, parent_id } => write!(
                f,
                "Cannot move link {} under its own descendant {}",
                link_id, parent_id
            ),
            LinkError::Open(err) => write!(f, "{}", err),
            LinkError::DatabaseError(msg) => write!(f, "Link database error: {}", msg),
        }
    }
}

impl std::error::Error for LinkError {}

impl From<OpenError> for LinkError {
    fn from(err: OpenError) -> Self {
        LinkError::Open(err)
    }
}

// === TagError ===

/// Errors related to tag management operations.
#[derive(Debug, Clone, PartialEq)]
pub enum TagError {
    /// Tag with the given ID was not found.
    NotFound(i64),
    /// A tag with the same name (ignoring case) already exists.
    DuplicateName(String),
    /// The tag name is blank.
    InvalidName(String),
    /// The color is not a `#rgb` / `#rrggbb` hex string.
    InvalidColor(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagError::NotFound(id) => write!(f, "Tag not found: {}", id),
            TagError::DuplicateName(name) => write!(f, "Duplicate tag name: {}", name),
            TagError::InvalidName(name) => write!(f, "Invalid tag name: '{}'", name),
            TagError::InvalidColor(color) => write!(f, "Invalid tag color: {}", color),
            TagError::DatabaseError(msg) => write!(f, "Tag database error: {}", msg),
        }
    }
}

impl std::error::Error for TagError {}

// === SettingsError ===

/// Errors related to the settings store.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: '{}'", key),
            SettingsError::DatabaseError(msg) => {
                write!(f, "Settings database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === OpenError ===

/// Errors raised while launching a link.
#[derive(Debug, Clone, PartialEq)]
pub enum OpenError {
    /// Folders and notes have nothing to launch.
    NothingToOpen(String),
    /// The link has no url/path/command.
    MissingTarget(String),
    /// The OS refused to launch the target.
    LaunchFailed(String),
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenError::NothingToOpen(name) => write!(f, "Nothing to open for link: {}", name),
            OpenError::MissingTarget(name) => write!(f, "Link has no target: {}", name),
            OpenError::LaunchFailed(msg) => write!(f, "Failed to open link: {}", msg),
        }
    }
}

impl std::error::Error for OpenError {}
