//! Read-only algorithms over the folder forest.
//!
//! # Responsibility
//! - Decide whether a folder move keeps the forest acyclic.
//! - Allocate sibling orders and validate reorder membership.
//! - Resolve root-first breadcrumb paths.
//!
//! # Invariants
//! - Nothing in this module writes to the store.
//! - Every ancestor walk is bounded by the owner's folder count, so corrupt
//!   parent pointers cannot loop forever.

pub mod cycle_guard;
pub mod order;
pub mod path;
