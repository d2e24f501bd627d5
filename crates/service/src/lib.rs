//! Service layer: file-backed record stores and the registry that serves them.
//! - One `RecordStore` per resource, each bound to a JSON array file.
//! - Explicit failure kinds in `errors`, counters in `metrics`.

pub mod errors;
pub mod metrics;
pub mod registry;
pub mod runtime;
pub mod storage;

pub use registry::StoreRegistry;
pub use storage::{record_store::RecordStore, repository::RecordRepository};
