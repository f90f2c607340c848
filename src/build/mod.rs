//! Artifact builders
//!
//! Pure functions from a loaded [`SpecDocument`](crate::spec::SpecDocument)
//! to Postman artifacts. No I/O happens here.

pub mod collection;
pub mod environment;
pub mod example;

pub use collection::build_collection;
pub use environment::build_environments;
