//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep callers decoupled from storage and delivery details.

pub mod failure;
pub mod notifier;
pub mod policy;
pub mod upgrade_service;
