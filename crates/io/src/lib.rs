//! `auditgrid-io`: the persistence gateway for audit sessions.
//!
//! Reads an audit's payload once at session start and writes the committed
//! result once at the end, over any [`store::KeyValueStore`].

pub mod error;
pub mod gateway;
pub mod sample;
pub mod store;

pub use error::StoreError;
pub use gateway::{AuditGateway, AuditPayload, FieldMapping, LoadSource, LoadedAudit, RegistryRecord};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
