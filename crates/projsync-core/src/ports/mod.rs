//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are the interfaces the core depends on; their implementations live
//! in adapter crates.
//!
//! - [`IRemoteCollection`] - Remote document collection operations

pub mod remote_collection;

pub use remote_collection::IRemoteCollection;
