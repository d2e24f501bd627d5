use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use models::{
    datetime::DateRange,
    record::{missing_fields, Fields, Record},
    text::contains_folded,
    ReadFailurePolicy, ResourceConfig,
};
use tokio::{fs, sync::Mutex};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::metrics::{self, STALE_READS_TOTAL, WRITE_FAILURES_TOTAL};

/// Generic JSON file-backed record collection.
///
/// Every operation re-reads the backing file, works on the loaded array and,
/// for mutations, rewrites the whole file. One mutex per store spans the
/// reload, the in-memory change and the rewrite, so concurrent mutations of
/// the same resource never lose each other's updates.
pub struct RecordStore {
    config: ResourceConfig,
    file_path: PathBuf,
    collection: Mutex<Vec<Record>>,
}

fn parse_collection(bytes: &[u8]) -> Result<Vec<Record>, ServiceError> {
    serde_json::from_slice(bytes).map_err(|e| ServiceError::StorageUnavailable(e.to_string()))
}

fn fresh_id(records: &[Record]) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !records.iter().any(|r| r.id() == Some(id.as_str())) {
            return id;
        }
    }
}

impl RecordStore {
    /// Load the collection at `path`. A missing file is seeded with an empty array;
    /// a present but unreadable one is an error.
    pub async fn open<P: Into<PathBuf>>(path: P, config: ResourceConfig) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::StorageUnavailable(format!("{}: {e}", parent.display())))?;
        }

        let records = match fs::read(&file_path).await {
            Ok(bytes) => parse_collection(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fs::write(&file_path, b"[]")
                    .await
                    .map_err(|e| ServiceError::StorageWriteFailed(e.to_string()))?;
                info!(resource = %config.name, path = %file_path.display(), "seeded empty collection");
                Vec::new()
            }
            Err(e) => return Err(ServiceError::StorageUnavailable(e.to_string())),
        };

        info!(resource = %config.name, path = %file_path.display(), count = records.len(), "collection loaded");
        Ok(Arc::new(Self { config, file_path, collection: Mutex::new(records) }))
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    async fn read_file(&self) -> Result<Vec<Record>, ServiceError> {
        let bytes = fs::read(&self.file_path)
            .await
            .map_err(|e| ServiceError::StorageUnavailable(e.to_string()))?;
        parse_collection(&bytes)
    }

    async fn persist(&self, records: &[Record]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(records).map_err(|e| ServiceError::StorageWriteFailed(e.to_string()))?;
        if let Err(e) = fs::write(&self.file_path, data).await {
            WRITE_FAILURES_TOTAL.with_label_values(&[self.name()]).inc();
            error!(resource = %self.config.name, path = %self.file_path.display(), error = %e, "collection write failed");
            return Err(ServiceError::StorageWriteFailed(e.to_string()));
        }
        debug!(resource = %self.config.name, count = records.len(), "collection written");
        Ok(())
    }

    /// Reload into an already held collection, applying the resource's read-failure policy.
    async fn refresh(&self, collection: &mut Vec<Record>) -> Result<(), ServiceError> {
        match self.read_file().await {
            Ok(fresh) => {
                *collection = fresh;
                Ok(())
            }
            Err(e) => match self.config.read_failure {
                ReadFailurePolicy::ServeStale => {
                    STALE_READS_TOTAL.with_label_values(&[self.name()]).inc();
                    warn!(resource = %self.config.name, error = %e, "reload failed; serving last loaded collection");
                    Ok(())
                }
                ReadFailurePolicy::Fail => Err(e),
            },
        }
    }

    /// Re-read the backing file. On failure the previous collection is kept and the error returned.
    pub async fn reload(&self) -> Result<(), ServiceError> {
        let mut collection = self.collection.lock().await;
        let fresh = self.read_file().await?;
        *collection = fresh;
        Ok(())
    }

    /// All records in file order.
    pub async fn list(&self) -> Result<Vec<Record>, ServiceError> {
        metrics::record_operation(self.name(), "list");
        let mut collection = self.collection.lock().await;
        self.refresh(&mut collection).await?;
        Ok(collection.clone())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Record, ServiceError> {
        metrics::record_operation(self.name(), "get");
        let mut collection = self.collection.lock().await;
        self.refresh(&mut collection).await?;
        collection
            .iter()
            .find(|r| r.id() == Some(id))
            .cloned()
            .ok_or_else(|| ServiceError::not_found(&format!("{} `{id}`", self.config.name)))
    }

    /// Records whose `field` contains `term`, ignoring case and diacritics.
    /// Only configured search fields can be queried; an empty result is `NotFound`.
    pub async fn find_by_field(&self, field: &str, term: &str) -> Result<Vec<Record>, ServiceError> {
        if !self.config.search_fields.iter().any(|f| f == field) {
            return Err(ServiceError::BadRequest(format!(
                "field `{field}` is not searchable on `{}`",
                self.config.name
            )));
        }
        self.find_matching(&[field.to_string()], term, "find_by_field").await
    }

    /// Like `find_by_field`, matching any of the configured search fields.
    pub async fn search(&self, term: &str) -> Result<Vec<Record>, ServiceError> {
        if self.config.search_fields.is_empty() {
            return Err(ServiceError::BadRequest(format!("`{}` has no searchable fields", self.config.name)));
        }
        let fields = self.config.search_fields.clone();
        self.find_matching(&fields, term, "search").await
    }

    async fn find_matching(&self, fields: &[String], term: &str, operation: &str) -> Result<Vec<Record>, ServiceError> {
        metrics::record_operation(self.name(), operation);
        let mut collection = self.collection.lock().await;
        self.refresh(&mut collection).await?;
        let found: Vec<Record> = collection
            .iter()
            .filter(|r| fields.iter().any(|f| r.text(f).is_some_and(|text| contains_folded(&text, term))))
            .cloned()
            .collect();
        debug!(resource = %self.config.name, %term, matches = found.len(), "text search");
        if found.is_empty() {
            return Err(ServiceError::NotFound(format!("no {} matching `{term}`", self.config.name)));
        }
        Ok(found)
    }

    /// Records whose `field` lies within `[start, end]`. Both bounds are required.
    pub async fn find_by_date_range(
        &self,
        field: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<Record>, ServiceError> {
        metrics::record_operation(self.name(), "find_by_date_range");
        let (start, end) = match (start, end) {
            (Some(s), Some(e)) if !s.trim().is_empty() && !e.trim().is_empty() => (s, e),
            _ => return Err(ServiceError::BadRequest("both start and end dates are required".into())),
        };
        let range = DateRange::parse(start, end, self.config.end_of_day_upper_bound)?;

        let mut collection = self.collection.lock().await;
        self.refresh(&mut collection).await?;
        Ok(collection
            .iter()
            .filter(|r| r.text(field).is_some_and(|value| range.matches(&value)))
            .cloned()
            .collect())
    }

    /// Date-range lookup on the resource's configured date field.
    pub async fn find_in_date_range(&self, start: Option<&str>, end: Option<&str>) -> Result<Vec<Record>, ServiceError> {
        let field = self
            .config
            .date_field
            .clone()
            .ok_or_else(|| ServiceError::BadRequest(format!("`{}` has no date field", self.config.name)))?;
        self.find_by_date_range(&field, start, end).await
    }

    /// Validate (when configured), assign a fresh id, append and persist.
    pub async fn create(&self, fields: Fields) -> Result<Record, ServiceError> {
        metrics::record_operation(self.name(), "create");
        if self.config.validates_on_create() {
            let missing = missing_fields(&fields, &self.config.required);
            if !missing.is_empty() {
                return Err(ServiceError::Validation { missing });
            }
        }

        let mut collection = self.collection.lock().await;
        self.refresh(&mut collection).await?;
        let record = Record::new_with_id(fresh_id(&collection), fields);
        collection.push(record.clone());
        self.persist(&collection).await?;
        info!(resource = %self.config.name, id = record.id().unwrap_or_default(), "record created");
        Ok(record)
    }

    /// Shallow-merge `patch` into the record; `id` in the patch is ignored.
    pub async fn update_by_id(&self, id: &str, patch: Fields) -> Result<Record, ServiceError> {
        metrics::record_operation(self.name(), "update");
        let mut collection = self.collection.lock().await;
        self.refresh(&mut collection).await?;
        let record = collection
            .iter_mut()
            .find(|r| r.id() == Some(id))
            .ok_or_else(|| ServiceError::not_found(&format!("{} `{id}`", self.config.name)))?;
        record.merge(patch);
        let updated = record.clone();
        self.persist(&collection).await?;
        info!(resource = %self.config.name, %id, "record updated");
        Ok(updated)
    }

    /// Remove the record and persist; returns what was removed.
    pub async fn delete_by_id(&self, id: &str) -> Result<Record, ServiceError> {
        metrics::record_operation(self.name(), "delete");
        let mut collection = self.collection.lock().await;
        self.refresh(&mut collection).await?;
        let index = collection
            .iter()
            .position(|r| r.id() == Some(id))
            .ok_or_else(|| ServiceError::not_found(&format!("{} `{id}`", self.config.name)))?;
        let removed = collection.remove(index);
        self.persist(&collection).await?;
        info!(resource = %self.config.name, %id, "record deleted");
        Ok(removed)
    }
}
