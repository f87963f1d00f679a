//! Core domain models for depwise
//!
//! This module contains the fundamental types used throughout the pipeline:
//! - Risk tiers and their ordering
//! - Declared version specifications and prefix preservation
//! - Dependency records read from the manifest
//! - Upgrade candidates, file patches and skip reasons

mod candidate;
mod dependency;
mod risk;
mod version_spec;

pub use candidate::{FilePatch, MissingPeers, SkipReason, SkippedDependency, UpgradeCandidate};
pub use dependency::{Dependency, DependencyGroup, DependencySet};
pub use risk::RiskTier;
pub use version_spec::{is_outdated, normalize_version, RangePrefix, VersionSpec};
