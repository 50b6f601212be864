//! MySQL job status store.
//!
//! The worker records job lifecycle state here for downstream
//! consumers; the schema itself is owned elsewhere.

pub mod error;
pub mod status;

pub use error::{DbError, DbResult};
pub use status::{MySqlStatusStore, StatusStore};
