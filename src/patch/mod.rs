//! Source patches for breaking upgrades
//!
//! This module provides:
//! - Patch generation through a code-rewriting service
//! - Unified diff rendering
//! - Interactive review with backup-then-overwrite application

pub mod diff;
mod generator;
mod review;

pub use generator::{CodeRewriter, LlmRewriter, PatchGenerator};
pub use review::{
    apply_patch, backup_path, check_applicable, PatchOutcome, PatchReviewer, PatchState,
    ReviewOutcome,
};
