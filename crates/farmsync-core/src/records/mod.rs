//! Typed records for each managed resource kind

mod crop;
mod farm_type;
mod farmer;
mod id;
mod user;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use crop::{Crop, ImageUpload, NewCrop};
pub use farm_type::{FarmType, NewFarmType};
pub use farmer::{Farmer, NewFarmer};
pub use id::{IdParseError, LocalId, RecordId};
pub use user::{NewUser, Role, User};

/// The four entity types mirrored by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    FarmType,
    Crop,
    Farmer,
    User,
}

impl ResourceKind {
    pub const ALL: [Self; 4] = [Self::FarmType, Self::Crop, Self::Farmer, Self::User];

    /// Collection endpoint relative to the API base URL
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::FarmType => "/farm-types/",
            Self::Crop => "/crops/",
            Self::Farmer => "/farmers/",
            Self::User => "/users/",
        }
    }

    /// Durable key of the kind's snapshot in the mirror store
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::FarmType => "farm_types",
            Self::Crop => "crops",
            Self::Farmer => "farmers",
            Self::User => "users",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FarmType => "farm types",
            Self::Crop => "crops",
            Self::Farmer => "farmers",
            Self::User => "users",
        }
    }

    pub const fn singular(self) -> &'static str {
        match self {
            Self::FarmType => "Farm type",
            Self::Crop => "Crop",
            Self::Farmer => "Farmer",
            Self::User => "User",
        }
    }

    /// Detail endpoint for a single record (`/crops/7/`)
    pub fn detail_path(self, id: &RecordId) -> String {
        format!("{}{}/", self.endpoint(), id.path_segment())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A uniquely identified entity of one resource kind.
pub trait Record:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Fields supplied when creating a record
    type Draft: Serialize + Send + Sync;

    const KIND: ResourceKind;

    fn id(&self) -> &RecordId;

    /// Build a record from a draft and an id assigned outside the server
    fn from_draft(id: RecordId, draft: Self::Draft) -> Self;

    /// Body sent when the whole record is written back to the server
    fn write_payload(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// Reference to another record, either a bare id or the expanded record.
///
/// The server nests related records in list responses and expects bare ids
/// in write payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference<T> {
    Id(RecordId),
    Expanded(T),
}

impl<T: Record> Reference<T> {
    pub fn id(&self) -> &RecordId {
        match self {
            Self::Id(id) => id,
            Self::Expanded(record) => record.id(),
        }
    }
}

impl<T> From<RecordId> for Reference<T> {
    fn from(value: RecordId) -> Self {
        Self::Id(value)
    }
}
