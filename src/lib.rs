//! depwise - Changelog-aware dependency upgrader library
//!
//! This library provides the upgrade pipeline for package.json projects:
//! - Registry lookups and GitHub changelog retrieval
//! - Risk classification of each upgrade from its changelog
//! - Source scanning and generated code patches for risky upgrades
//! - Interactive patch review and prefix-preserving manifest updates

pub mod changelog;
pub mod classify;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod llm;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod package_manager;
pub mod patch;
pub mod progress;
pub mod prompt;
pub mod registry;
pub mod scanner;
pub mod updater;
