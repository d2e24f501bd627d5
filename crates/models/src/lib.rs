//! Record and resource definitions shared by the store and the HTTP layer.

pub mod errors;
pub mod record;
pub mod resource;
pub mod text;
pub mod datetime;

pub use record::{Fields, Record, ID_FIELD};
pub use resource::{builtin_resources, resolve_resources, ReadFailurePolicy, ResourceConfig};
