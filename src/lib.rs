//! Data Vault 2.0 repository engine
//!
//! Hubs, links and satellites are read and written exclusively through a fixed
//! family of stored procedures (`ReadRecord<Entity>`, `LinkRecord<Entity>`, ...)
//! that exchange JSON payloads. Entity types declare their identifiers once with
//! [`dv_descriptor!`]; repositories derive everything else from them.

pub mod audit;
pub mod cache;
pub mod config;
pub mod entity;
pub mod error;
pub mod naming;
pub mod protocol;
pub mod query;
pub mod repository;

pub use audit::{AuditContext, AuditInfo, StaticAuditContext};
pub use config::DataVaultConfig;
pub use entity::{DvEntity, DvRecord, HubEntity, LinkEntity, Lookup, LookupItem};
pub use error::{BusinessErrorCode, DataVaultError, Result};
pub use naming::{EntityDescriptor, EntityKind, StoredProcedure};
pub use repository::{DataVaultContext, DataVaultRepository, HubRepository, LinkRepository, UnitOfWork};

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
}
