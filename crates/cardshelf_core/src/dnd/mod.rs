//! Drag-and-drop interpretation for folder listings.
//!
//! # Responsibility
//! - Classify a (dragged node, drop zone) pair into at most one organizer
//!   call.
//! - Keep an optimistic listing that reverts to the last confirmed state when
//!   the call fails.
//!
//! # Invariants
//! - A drop issues zero or one call; nothing is retried.
//! - Local rejections and no-op drops never reach the client.
//!
//! # See also
//! - `service::organizer_service` for the server-side checks each intent
//!   maps to.

pub mod controller;
pub mod intent;
pub mod view;

pub use controller::{dispatch, DragController, DropOutcome, OrganizerClient};
pub use intent::{classify, DragPayload, DropIntent, DropRejection, DropTarget};
pub use view::ListingView;
