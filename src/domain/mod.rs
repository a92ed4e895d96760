//! Core domain models for binup
//!
//! This module contains the fundamental types used throughout the application:
//! - Module versions (released and pseudo) and their ordering
//! - Installed binary information read from build metadata
//! - Update targets and per-binary planning results
//! - Run mode and plan summary

mod installed_binary;
mod mode;
mod summary;
mod update_result;
mod update_target;
mod version;

pub use installed_binary::{InstalledBinary, DEVEL_VERSION};
pub use mode::Mode;
pub use summary::Plan;
pub use update_result::{SkipReason, UpToDateReason, UpdateResult};
pub use update_target::{TargetVersion, UpdateTarget, LATEST, LOCAL};
pub use version::{PseudoVersion, Version};
