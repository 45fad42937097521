//! Generic offline-first synchronizer, one instance per resource kind.
//!
//! Online, every operation goes through the gateway and the server's answer
//! is reconciled into the mirror. Offline, the mirror is the source of truth
//! and mutations are applied to it directly; they are not replayed later.
//! Records carrying a local id are unknown to the server, so their updates
//! and deletes always take the offline path.
//!
//! Each operation dispatches `Started` on the slice followed by exactly one
//! success event or `Failed`, and hands the same outcome back to the caller.

use serde_json::Value;

use crate::connectivity::Connectivity;
use crate::error::{Error, Result};
use crate::gateway::{ApiClient, Method};
use crate::mirror::MirrorStore;
use crate::records::{Crop, ImageUpload, NewCrop, Record, RecordId, ResourceKind};
use crate::session::Session;
use crate::slice::{Operation, Slice, SliceEvent};

#[derive(Clone)]
pub struct Synchronizer<R: Record> {
    gateway: ApiClient,
    mirror: MirrorStore,
    connectivity: Connectivity,
    session: Session,
    slice: Slice<R>,
}

impl<R: Record> Synchronizer<R> {
    pub fn new(
        gateway: ApiClient,
        mirror: MirrorStore,
        connectivity: Connectivity,
        session: Session,
    ) -> Self {
        Self {
            gateway,
            mirror,
            connectivity,
            session,
            slice: Slice::new(),
        }
    }

    pub const fn kind(&self) -> ResourceKind {
        R::KIND
    }

    /// Observable state of this kind
    pub const fn slice(&self) -> &Slice<R> {
        &self.slice
    }

    /// Load the whole collection.
    ///
    /// A failed online fetch is reported as such; the mirror is not used as
    /// a fallback.
    pub async fn fetch_all(&self) -> Result<Vec<R>> {
        self.slice.dispatch(SliceEvent::Started(Operation::Fetch));
        let outcome = if self.connectivity.is_online() {
            self.fetch_all_online().await
        } else {
            self.fetch_all_offline().await
        };
        self.settle(outcome, |records| SliceEvent::Fetched(records.clone()))
    }

    pub async fn create(&self, draft: R::Draft) -> Result<R> {
        self.slice.dispatch(SliceEvent::Started(Operation::Create));
        let outcome = if self.connectivity.is_online() {
            self.create_online(&draft).await
        } else {
            self.create_offline(draft).await
        };
        self.settle(outcome, |record| SliceEvent::Created(record.clone()))
    }

    /// Replace a record with `record`, matched by id.
    pub async fn update(&self, record: R) -> Result<R> {
        self.slice.dispatch(SliceEvent::Started(Operation::Update));
        let outcome = if self.reaches_server(record.id()) {
            self.update_online(&record).await
        } else {
            self.update_offline(record).await
        };
        self.settle(outcome, |record| SliceEvent::Updated(record.clone()))
    }

    /// Apply a JSON object of changed fields to one record.
    pub async fn update_partial(&self, id: &RecordId, changes: &Value) -> Result<R> {
        self.slice.dispatch(SliceEvent::Started(Operation::Update));
        let outcome = if changes.is_object() {
            if self.reaches_server(id) {
                self.update_partial_online(id, changes).await
            } else {
                self.update_partial_offline(id, changes).await
            }
        } else {
            Err(Error::InvalidInput("Changes must be a JSON object".to_string()))
        };
        self.settle(outcome, |record| SliceEvent::Updated(record.clone()))
    }

    pub async fn delete_by_id(&self, id: &RecordId) -> Result<()> {
        self.slice.dispatch(SliceEvent::Started(Operation::Delete));
        let outcome = if self.reaches_server(id) {
            self.delete_online(id).await
        } else {
            self.remove_from_mirror(id).await
        };
        self.settle(outcome, |()| SliceEvent::Deleted(*id))
    }

    /// Load a single record and upsert it into the collection.
    pub async fn fetch_by_id(&self, id: &RecordId) -> Result<R> {
        self.slice.dispatch(SliceEvent::Started(Operation::FetchOne));
        let outcome = if self.reaches_server(id) {
            self.fetch_one_online(id).await
        } else {
            self.fetch_one_offline(id).await
        };
        self.settle(outcome, |record| SliceEvent::Loaded(record.clone()))
    }

    fn reaches_server(&self, id: &RecordId) -> bool {
        self.connectivity.is_online() && !id.is_local()
    }

    fn token(&self) -> Option<String> {
        self.session.access_token()
    }

    fn settle<T>(&self, outcome: Result<T>, event: impl FnOnce(&T) -> SliceEvent<R>) -> Result<T> {
        match outcome {
            Ok(value) => {
                self.slice.dispatch(event(&value));
                Ok(value)
            }
            Err(error) => {
                tracing::warn!(kind = %R::KIND, %error, "Sync operation failed");
                self.slice.dispatch(SliceEvent::Failed(error.to_string()));
                Err(error)
            }
        }
    }

    async fn fetch_all_online(&self) -> Result<Vec<R>> {
        let token = self.token();
        let records: Vec<R> = self
            .gateway
            .request_as(Method::Get, R::KIND.endpoint(), None, token.as_deref())
            .await?;
        self.mirror.save(&records).await?;
        tracing::info!(kind = %R::KIND, count = records.len(), "Fetched from server");
        Ok(records)
    }

    async fn fetch_all_offline(&self) -> Result<Vec<R>> {
        let records = self
            .mirror
            .load::<R>()
            .await?
            .ok_or(Error::OfflineUnavailable(R::KIND))?;
        tracing::info!(kind = %R::KIND, count = records.len(), "Loaded from local mirror");
        Ok(records)
    }

    async fn create_online(&self, draft: &R::Draft) -> Result<R> {
        let token = self.token();
        let payload = serde_json::to_value(draft)?;
        let record: R = self
            .gateway
            .request_as(
                Method::Post,
                R::KIND.endpoint(),
                Some(&payload),
                token.as_deref(),
            )
            .await?;
        self.append_to_mirror(&record).await?;
        tracing::info!(kind = %R::KIND, id = %record.id(), "Created on server");
        Ok(record)
    }

    async fn create_offline(&self, draft: R::Draft) -> Result<R> {
        let record = R::from_draft(RecordId::new_local(), draft);
        self.append_to_mirror(&record).await?;
        tracing::info!(kind = %R::KIND, id = %record.id(), "Created locally");
        Ok(record)
    }

    async fn update_online(&self, record: &R) -> Result<R> {
        let token = self.token();
        let payload = record.write_payload()?;
        let updated: R = self
            .gateway
            .request_as(
                Method::Put,
                &R::KIND.detail_path(record.id()),
                Some(&payload),
                token.as_deref(),
            )
            .await?;
        self.replace_in_mirror(&updated).await?;
        tracing::info!(kind = %R::KIND, id = %updated.id(), "Updated on server");
        Ok(updated)
    }

    async fn update_offline(&self, record: R) -> Result<R> {
        self.replace_in_mirror(&record).await?;
        tracing::info!(kind = %R::KIND, id = %record.id(), "Updated locally");
        Ok(record)
    }

    async fn update_partial_online(&self, id: &RecordId, changes: &Value) -> Result<R> {
        let token = self.token();
        let updated: R = self
            .gateway
            .request_as(
                Method::Patch,
                &R::KIND.detail_path(id),
                Some(changes),
                token.as_deref(),
            )
            .await?;
        self.replace_in_mirror(&updated).await?;
        tracing::info!(kind = %R::KIND, %id, "Patched on server");
        Ok(updated)
    }

    async fn update_partial_offline(&self, id: &RecordId, changes: &Value) -> Result<R> {
        let current = self
            .mirror
            .load::<R>()
            .await?
            .and_then(|records| records.into_iter().find(|record| record.id() == id))
            .ok_or_else(|| not_found::<R>(id))?;

        let updated = merge_changes(&current, changes)?;
        self.replace_in_mirror(&updated).await?;
        tracing::info!(kind = %R::KIND, %id, "Patched locally");
        Ok(updated)
    }

    async fn delete_online(&self, id: &RecordId) -> Result<()> {
        let token = self.token();
        self.gateway
            .request(
                Method::Delete,
                &R::KIND.detail_path(id),
                None,
                token.as_deref(),
            )
            .await?;
        self.remove_from_mirror(id).await?;
        tracing::info!(kind = %R::KIND, %id, "Deleted on server");
        Ok(())
    }

    async fn fetch_one_online(&self, id: &RecordId) -> Result<R> {
        let token = self.token();
        let record: R = self
            .gateway
            .request_as(
                Method::Get,
                &R::KIND.detail_path(id),
                None,
                token.as_deref(),
            )
            .await?;
        self.upsert_into_mirror(&record).await?;
        Ok(record)
    }

    async fn fetch_one_offline(&self, id: &RecordId) -> Result<R> {
        self.mirror
            .load::<R>()
            .await?
            .ok_or(Error::OfflineUnavailable(R::KIND))?
            .into_iter()
            .find(|record| record.id() == id)
            .ok_or_else(|| not_found::<R>(id))
    }

    /// Append to the snapshot, creating it when absent.
    async fn append_to_mirror(&self, record: &R) -> Result<()> {
        let mut records = self.mirror.load::<R>().await?.unwrap_or_default();
        records.push(record.clone());
        self.mirror.save(&records).await
    }

    /// Replace the entry with the same id in an existing snapshot.
    ///
    /// Without a snapshot or a matching entry nothing is written.
    async fn replace_in_mirror(&self, record: &R) -> Result<()> {
        let Some(mut records) = self.mirror.load::<R>().await? else {
            return Ok(());
        };
        let Some(existing) = records.iter_mut().find(|item| item.id() == record.id()) else {
            return Ok(());
        };
        *existing = record.clone();
        self.mirror.save(&records).await
    }

    /// Replace or append by id, creating the snapshot when absent.
    async fn upsert_into_mirror(&self, record: &R) -> Result<()> {
        let mut records = self.mirror.load::<R>().await?.unwrap_or_default();
        match records.iter_mut().find(|item| item.id() == record.id()) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        self.mirror.save(&records).await
    }

    async fn remove_from_mirror(&self, id: &RecordId) -> Result<()> {
        let Some(mut records) = self.mirror.load::<R>().await? else {
            return Ok(());
        };
        records.retain(|record| record.id() != id);
        self.mirror.save(&records).await
    }
}

impl Synchronizer<Crop> {
    /// Create a crop with an attached image.
    ///
    /// Offline, the image's local path becomes the crop's image reference.
    pub async fn create_with_image(&self, draft: NewCrop, image: ImageUpload) -> Result<Crop> {
        self.slice.dispatch(SliceEvent::Started(Operation::Create));
        let outcome = if self.connectivity.is_online() {
            self.upload_crop(&draft, &image).await
        } else {
            let mut crop = Crop::from_draft(RecordId::new_local(), draft);
            crop.image = Some(image.path.display().to_string());
            self.append_to_mirror(&crop).await.map(|()| crop)
        };
        self.settle(outcome, |crop| SliceEvent::Created(crop.clone()))
    }

    async fn upload_crop(&self, draft: &NewCrop, image: &ImageUpload) -> Result<Crop> {
        let token = self.token();
        let payload = self
            .gateway
            .upload(
                Crop::KIND.endpoint(),
                draft.form_fields(),
                "image",
                image,
                token.as_deref(),
            )
            .await?;
        let crop: Crop = serde_json::from_value(payload)?;
        self.append_to_mirror(&crop).await?;
        tracing::info!(id = %crop.id, "Created crop with image on server");
        Ok(crop)
    }
}

fn not_found<R: Record>(id: &RecordId) -> Error {
    Error::NotFound {
        kind: R::KIND,
        id: id.to_string(),
    }
}

/// Overlay `changes` on the stored record. The id is never changed.
fn merge_changes<R: Record>(current: &R, changes: &Value) -> Result<R> {
    let mut merged = serde_json::to_value(current)?;
    if let (Some(target), Some(changes)) = (merged.as_object_mut(), changes.as_object()) {
        for (field, value) in changes {
            if field != "id" {
                target.insert(field.clone(), value.clone());
            }
        }
    }
    Ok(serde_json::from_value(merged)?)
}
