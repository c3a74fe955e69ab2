//! projsync Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `LocalFile`, `RemoteDocument`, `RemoteProjectHandle`, `SyncReport`
//! - **Ignore rules** - `IgnoreRuleSet` parsed from the project's ignore file
//! - **Project state** - `ProjectConfig` and the sync `Manifest`
//! - **Port definitions** - `IRemoteCollection`, implemented by adapter crates
//!
//! # Architecture
//!
//! The domain module holds pure types with no I/O. Ports define the trait
//! interfaces adapter crates implement. Configuration values are loaded by
//! the caller and passed in explicitly; nothing here keeps process-wide state.

pub mod config;
pub mod domain;
pub mod ignore;
pub mod manifest;
pub mod ports;
pub mod project;
pub mod structure;
