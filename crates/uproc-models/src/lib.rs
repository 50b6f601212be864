//! Shared data models for the upload processor.
//!
//! This crate provides the pure (no I/O) core of the pipeline:
//! - Job request payload and source classification
//! - Timecode table loading
//! - Split window computation

pub mod request;
pub mod split;
pub mod timecode;

// Re-export common types
pub use request::{JobRequest, Source};
pub use split::{split_window, SplitWindow, VideoTooShort};
pub use timecode::{Timecode, TimecodeError, TimecodeTable};
