//! Ferry Core - Profile registry, backup archives, and recovery
//!
//! This crate provides the selectable-profile registry, the portable
//! backup archive codec, the recovery planner, and the `BackupService`
//! that ties them together.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod archive;
pub mod backup;
pub mod config;
pub mod host;
pub mod planner;
pub mod profile;
pub mod provider;
pub mod storage;
pub mod util;

pub use archive::{ArchiveManifest, ArchiveSource};
pub use backup::{BackupService, RecoverOptions};
pub use config::FerryConfig;
pub use planner::RecoveryPlan;
pub use profile::{Avatar, Profile, ProfileMetadata, Theme};
pub use storage::{Database, ProfileStore};
