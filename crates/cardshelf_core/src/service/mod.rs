//! Organizer use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and tree algorithms into owner-scoped
//!   use-case APIs.
//! - Keep FFI and drag-and-drop layers decoupled from storage details.

pub mod error;
pub mod identity;
pub mod organizer_service;
pub mod requests;
pub mod validation;

pub use error::{
    ConflictReason, ErrorBody, ErrorDetails, ErrorKind, OrganizerError, OrganizerResult,
    StructuralViolation, ValidationError,
};
pub use identity::{IdentityResolver, StaticIdentity};
pub use organizer_service::OrganizerService;
pub use requests::{
    CreateCardRequest, CreateFolderRequest, FolderDeleteMode, ParentChange, UpdateCardRequest,
    UpdateFolderRequest,
};
