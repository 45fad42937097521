use serde::{Deserialize, Serialize};

use super::{Crop, FarmType, Record, RecordId, Reference, ResourceKind};

/// A registered farmer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Farmer {
    pub id: RecordId,
    pub name: String,
    pub national_id: String,
    #[serde(default)]
    pub location: String,
    pub farm_type: Reference<FarmType>,
    pub crop: Reference<Crop>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFarmer {
    pub name: String,
    pub national_id: String,
    pub location: String,
    pub farm_type: RecordId,
    pub crop: RecordId,
}

impl Record for Farmer {
    type Draft = NewFarmer;

    const KIND: ResourceKind = ResourceKind::Farmer;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn from_draft(id: RecordId, draft: NewFarmer) -> Self {
        Self {
            id,
            name: draft.name,
            national_id: draft.national_id,
            location: draft.location,
            farm_type: draft.farm_type.into(),
            crop: draft.crop.into(),
        }
    }

    fn write_payload(&self) -> serde_json::Result<serde_json::Value> {
        let mut payload = serde_json::to_value(self)?;
        payload["farm_type"] = serde_json::to_value(self.farm_type.id())?;
        payload["crop"] = serde_json::to_value(self.crop.id())?;
        Ok(payload)
    }
}
