//! Redis-backed queue transport and slot index.
//!
//! This crate provides:
//! - Job intake via a Redis Streams consumer group
//! - The append-only per-slot index of uploaded split clips

pub mod error;
pub mod queue;
pub mod slots;

pub use error::{QueueError, QueueResult};
pub use queue::{Delivery, JobQueue, QueueConfig};
pub use slots::{RedisSlotIndex, SlotRegistry};
