//! Domain model for statement entries and upgradable members.
//!
//! # Responsibility
//! - Define canonical data structures used by the stores and services.
//!
//! # Invariants
//! - A member level only moves forward through [`level::Level::next`].
//! - Statement keys are unique per store; text is replaced, never appended.

pub mod level;
pub mod member;
pub mod statement;
