use serde::{Deserialize, Serialize};

use super::{Record, RecordId, ResourceKind};

/// Category of farming operation (dairy, poultry, horticulture, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmType {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFarmType {
    pub name: String,
    pub description: String,
}

impl Record for FarmType {
    type Draft = NewFarmType;

    const KIND: ResourceKind = ResourceKind::FarmType;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn from_draft(id: RecordId, draft: NewFarmType) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
        }
    }
}
