use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{Record, RecordId, ResourceKind};

/// A crop grown by registered farmers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crop {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Server image URL, or a local file path for crops created offline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCrop {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    pub description: String,
}

impl NewCrop {
    /// Text fields of the multipart form used when an image is attached
    pub(crate) fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("name".to_string(), self.name.clone()),
            ("description".to_string(), self.description.clone()),
        ];
        if let Some(crop_type) = &self.crop_type {
            fields.push(("type".to_string(), crop_type.clone()));
        }
        fields
    }
}

impl Record for Crop {
    type Draft = NewCrop;

    const KIND: ResourceKind = ResourceKind::Crop;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn from_draft(id: RecordId, draft: NewCrop) -> Self {
        Self {
            id,
            name: draft.name,
            crop_type: draft.crop_type,
            description: draft.description,
            image: None,
        }
    }
}

/// Image file attached to a crop on creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Read an image from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bytes = tokio::fs::read(&path).await?;
        Ok(Self { path, bytes })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| "image".to_string(), |name| name.to_string_lossy().to_string())
    }

    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.path)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}
