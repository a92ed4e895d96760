//! binup - updater library for binaries installed with `go install`
//!
//! This library provides the core functionality for keeping Go binaries
//! up to date:
//! - Go module version parsing and ordering (released and pseudo-versions)
//! - Module proxy queries and the bounded update decision
//! - Build metadata reading, update planning and `go install` execution

pub mod buildinfo;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod installer;
pub mod orchestrator;
pub mod output;
pub mod planner;
pub mod progress;
pub mod registry;
pub mod update;
