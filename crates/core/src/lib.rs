//! Approval engine for Reimburse.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence and transport call into it to validate and resolve every state change.
//!
//! # Modules
//!
//! - `identity` - Roles, acting users and authorization checkpoints
//! - `rules` - Approval rule model, validation and rule selection
//! - `workflow` - Approval chain building and the expense state machine
//! - `visibility` - Role-scoped read filter for expenses

pub mod identity;
pub mod rules;
pub mod visibility;
pub mod workflow;
