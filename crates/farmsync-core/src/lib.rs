//! farmsync-core - Core library for farmsync
//!
//! This crate contains the offline-first data layer shared by farmsync
//! front-ends: typed records, the authenticated request gateway, the local
//! mirror store, the session, and one generic synchronizer per resource kind.

pub mod config;
pub mod connectivity;
pub mod error;
pub mod gateway;
pub mod mirror;
pub mod records;
pub mod service;
pub mod session;
pub mod slice;
pub mod sync;
pub mod util;

pub use config::{ClientConfig, ConfigError};
pub use connectivity::Connectivity;
pub use error::{Error, Result};
pub use gateway::{ApiClient, Method, RequestError};
pub use mirror::MirrorStore;
pub use records::{Crop, FarmType, Farmer, Record, RecordId, ResourceKind, User};
pub use service::FarmClient;
pub use session::{AuthSession, Session, SessionUser};
pub use slice::{Operation, Slice, SliceEvent, SliceState, SyncStatus};
pub use sync::Synchronizer;
