//! Shared data models for the hevcbot transcode pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Jobs and their lifecycle phases
//! - Terminal outcomes and the user-visible status text for each

pub mod job;
pub mod outcome;

// Re-export common types
pub use job::{FileId, Job, JobPhase};
pub use outcome::JobOutcome;
