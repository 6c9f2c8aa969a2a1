//! rawdha-notify - forwards newly created school documents to push topics.
//!
//! Two handlers react to document creation in the announcements and
//! notifications collections and publish a notification to the
//! `school_{rawdhaId}` topic of the document's tenant.

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod gateway;
pub mod handlers;
pub mod internal_metrics;
pub mod server;
pub mod task_manager;
pub mod trigger;

// Re-export core types for convenience
pub use crate::core::*;
