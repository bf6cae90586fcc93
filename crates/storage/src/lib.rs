//! Raw storage for ingested payloads.
//!
//! - [`RawStore`]: write-once payload and metadata files keyed by job id
//! - [`ErrorLog`]: append-only JSON-lines log of server-side failures

pub mod backend;
pub mod error;
pub mod error_log;
pub mod raw;

pub use backend::LocalBackend;
pub use error::StorageError;
pub use error_log::{ErrorEntry, ErrorLog};
pub use raw::RawStore;
