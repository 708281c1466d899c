//! Typed inputs for orchestrator writes.

use crate::model::folder::FolderId;

/// What to do with a folder on delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FolderDeleteMode {
    /// Remove the folder only; children and cards move up to its parent.
    #[default]
    Dissolve,
    /// Remove the folder with its subtree and every card inside it.
    Cascade,
}

impl FolderDeleteMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dissolve => "dissolve",
            Self::Cascade => "cascade",
        }
    }

    /// Parses the lowercase config/transport spelling.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dissolve" => Some(Self::Dissolve),
            "cascade" => Some(Self::Cascade),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFolderRequest {
    pub name: String,
    pub parent_id: Option<FolderId>,
    pub color: Option<String>,
}

/// Parent field of an update; `Set(None)` moves the folder to the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParentChange {
    #[default]
    Keep,
    Set(Option<FolderId>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateFolderRequest {
    pub name: Option<String>,
    pub parent: ParentChange,
    /// Used verbatim only when the folder stays in its sibling group.
    pub order: Option<i64>,
    /// Blank clears the color.
    pub color: Option<String>,
}

impl UpdateFolderRequest {
    pub fn move_to(parent_id: Option<FolderId>) -> Self {
        Self {
            parent: ParentChange::Set(parent_id),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCardRequest {
    pub title: String,
    pub folder_id: Option<FolderId>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCardRequest {
    pub title: Option<String>,
    /// Blank clears the color.
    pub color: Option<String>,
    pub section_count: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::FolderDeleteMode;

    #[test]
    fn delete_mode_parses_case_insensitively() {
        assert_eq!(FolderDeleteMode::parse(" Cascade "), Some(FolderDeleteMode::Cascade));
        assert_eq!(FolderDeleteMode::parse("dissolve"), Some(FolderDeleteMode::Dissolve));
        assert_eq!(FolderDeleteMode::parse("purge"), None);
        assert_eq!(FolderDeleteMode::default(), FolderDeleteMode::Dissolve);
    }
}
