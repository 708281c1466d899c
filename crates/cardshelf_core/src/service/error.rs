//! Orchestrator error kinds and their wire body.
//!
//! # Responsibility
//! - Classify every orchestrator failure into one [`ErrorKind`].
//! - Render a stable `{ error, details? }` body and status code for hosts.
//!
//! # Invariants
//! - Foreign-owned and missing rows share `NotFound` and the same message.
//! - `Internal` bodies never carry the underlying cause.

use crate::model::card::CardId;
use crate::model::folder::FolderId;
use crate::model::EntityKind;
use crate::repo::TreeRepoError;
use crate::tree::order::MembershipMismatch;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result type for orchestrator operations.
pub type OrganizerResult<T> = Result<T, OrganizerError>;

/// Coarse classification of orchestrator failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthenticated,
    NotFound,
    StructuralViolation,
    Conflict,
    Validation,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::NotFound => "not_found",
            Self::StructuralViolation => "structural_violation",
            Self::Conflict => "conflict",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    /// HTTP-style status classification.
    pub fn status_code(self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::NotFound => 404,
            Self::StructuralViolation => 422,
            Self::Conflict => 409,
            Self::Validation => 400,
            Self::Internal => 500,
        }
    }
}

/// Folder move that would break the forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralViolation {
    IntoItself,
    IntoDescendant,
}

impl Display for StructuralViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IntoItself => write!(f, "cannot nest a folder in itself"),
            Self::IntoDescendant => write!(f, "cannot move a folder into its own descendant"),
        }
    }
}

/// Request that contradicts current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    DuplicateShortcut {
        folder_id: FolderId,
        card_id: CardId,
    },
    ReorderMismatch {
        kind: EntityKind,
        mismatch: MembershipMismatch<Uuid>,
    },
}

impl Display for ConflictReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateShortcut { .. } => {
                write!(f, "card already has a shortcut in this folder")
            }
            Self::ReorderMismatch { kind, .. } => write!(
                f,
                "reorder must list every {} of the group exactly once",
                kind.as_str()
            ),
        }
    }
}

/// Rejected input shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Blank { field: &'static str },
    TooLong { field: &'static str, max_chars: usize },
    InvalidColor(String),
    NegativeOrder(i64),
    NegativeSectionCount(i64),
    InvalidId { field: &'static str, value: String },
    UnknownDeleteMode(String),
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Blank { field } | Self::TooLong { field, .. } | Self::InvalidId { field, .. } => {
                field
            }
            Self::InvalidColor(_) => "color",
            Self::NegativeOrder(_) => "order",
            Self::NegativeSectionCount(_) => "section_count",
            Self::UnknownDeleteMode(_) => "mode",
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank { field } => write!(f, "{field} must not be blank"),
            Self::TooLong { field, max_chars } => {
                write!(f, "{field} must be at most {max_chars} characters")
            }
            Self::InvalidColor(value) => {
                write!(f, "color `{value}` must look like #RGB or #RRGGBB")
            }
            Self::NegativeOrder(value) => write!(f, "order must be non-negative, got {value}"),
            Self::NegativeSectionCount(value) => {
                write!(f, "section_count must be non-negative, got {value}")
            }
            Self::InvalidId { field, value } => write!(f, "{field} `{value}` is not a valid id"),
            Self::UnknownDeleteMode(value) => {
                write!(f, "delete mode `{value}` must be dissolve or cascade")
            }
        }
    }
}

impl Error for ValidationError {}

/// Errors surfaced by [`crate::service::OrganizerService`].
#[derive(Debug)]
pub enum OrganizerError {
    /// Identity resolver returned no owner.
    Unauthenticated,
    /// Missing, or owned by someone else.
    NotFound { kind: EntityKind, id: Uuid },
    Structural(StructuralViolation),
    Conflict(ConflictReason),
    Validation(ValidationError),
    /// Storage failure or corrupt data; logged, never detailed to callers.
    Internal(TreeRepoError),
}

impl OrganizerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Structural(_) => ErrorKind::StructuralViolation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Caller-facing body. `Internal` is reduced to a generic message.
    pub fn to_body(&self) -> ErrorBody {
        let details = match self {
            Self::Unauthenticated | Self::Structural(_) | Self::Internal(_) => None,
            Self::NotFound { kind, id } => Some(ErrorDetails::Entity {
                kind: *kind,
                id: *id,
            }),
            Self::Conflict(ConflictReason::DuplicateShortcut { folder_id, card_id }) => {
                Some(ErrorDetails::Shortcut {
                    folder_id: *folder_id,
                    card_id: *card_id,
                })
            }
            Self::Conflict(ConflictReason::ReorderMismatch { kind, mismatch }) => {
                Some(ErrorDetails::Membership {
                    kind: *kind,
                    missing: mismatch.missing.clone(),
                    unexpected: mismatch.unexpected.clone(),
                    duplicated: mismatch.duplicated.clone(),
                })
            }
            Self::Validation(err) => Some(ErrorDetails::Field {
                field: err.field().to_string(),
            }),
        };
        let error = match self {
            Self::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        ErrorBody { error, details }
    }
}

impl Display for OrganizerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "not authenticated"),
            Self::NotFound { kind, .. } => write!(f, "{} not found", kind.as_str()),
            Self::Structural(violation) => write!(f, "{violation}"),
            Self::Conflict(reason) => write!(f, "{reason}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Internal(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OrganizerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Internal(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TreeRepoError> for OrganizerError {
    fn from(value: TreeRepoError) -> Self {
        match value {
            TreeRepoError::NodeNotFound { kind, id } => Self::NotFound { kind, id },
            TreeRepoError::GroupMismatch { kind, mismatch } => {
                Self::Conflict(ConflictReason::ReorderMismatch { kind, mismatch })
            }
            TreeRepoError::DuplicateShortcut { folder_id, card_id } => {
                Self::Conflict(ConflictReason::DuplicateShortcut { folder_id, card_id })
            }
            TreeRepoError::CycleRejected { id, parent_id } if id == parent_id => {
                Self::Structural(StructuralViolation::IntoItself)
            }
            TreeRepoError::CycleRejected { .. } => {
                Self::Structural(StructuralViolation::IntoDescendant)
            }
            other => Self::Internal(other),
        }
    }
}

impl From<ValidationError> for OrganizerError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StructuralViolation> for OrganizerError {
    fn from(value: StructuralViolation) -> Self {
        Self::Structural(value)
    }
}

/// Structured error body returned by every write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

impl ErrorBody {
    /// Body for failures that never reached the orchestrator.
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

/// Machine-readable detail attached to an [`ErrorBody`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorDetails {
    Entity {
        kind: EntityKind,
        id: Uuid,
    },
    Shortcut {
        folder_id: FolderId,
        card_id: CardId,
    },
    Membership {
        kind: EntityKind,
        missing: Vec<Uuid>,
        unexpected: Vec<Uuid>,
        duplicated: Vec<Uuid>,
    },
    Field {
        field: String,
    },
}
