use async_trait::async_trait;
use models::{Fields, Record, ResourceConfig};

use crate::errors::ServiceError;
use crate::storage::record_store::RecordStore;

/// Trait abstraction for one resource's record collection.
/// The HTTP layer only sees this; `RecordStore` is the file-backed implementation.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    fn config(&self) -> &ResourceConfig;
    async fn list(&self) -> Result<Vec<Record>, ServiceError>;
    async fn get(&self, id: &str) -> Result<Record, ServiceError>;
    async fn search(&self, term: &str) -> Result<Vec<Record>, ServiceError>;
    async fn find_by_field(&self, field: &str, term: &str) -> Result<Vec<Record>, ServiceError>;
    async fn find_by_date_range(&self, start: Option<&str>, end: Option<&str>) -> Result<Vec<Record>, ServiceError>;
    async fn create(&self, fields: Fields) -> Result<Record, ServiceError>;
    async fn update(&self, id: &str, patch: Fields) -> Result<Record, ServiceError>;
    async fn delete(&self, id: &str) -> Result<Record, ServiceError>;
}

#[async_trait]
impl RecordRepository for RecordStore {
    fn config(&self) -> &ResourceConfig { RecordStore::config(self) }
    async fn list(&self) -> Result<Vec<Record>, ServiceError> { RecordStore::list(self).await }
    async fn get(&self, id: &str) -> Result<Record, ServiceError> { self.get_by_id(id).await }
    async fn search(&self, term: &str) -> Result<Vec<Record>, ServiceError> { RecordStore::search(self, term).await }
    async fn find_by_field(&self, field: &str, term: &str) -> Result<Vec<Record>, ServiceError> { RecordStore::find_by_field(self, field, term).await }
    async fn find_by_date_range(&self, start: Option<&str>, end: Option<&str>) -> Result<Vec<Record>, ServiceError> { self.find_in_date_range(start, end).await }
    async fn create(&self, fields: Fields) -> Result<Record, ServiceError> { RecordStore::create(self, fields).await }
    async fn update(&self, id: &str, patch: Fields) -> Result<Record, ServiceError> { self.update_by_id(id, patch).await }
    async fn delete(&self, id: &str) -> Result<Record, ServiceError> { self.delete_by_id(id).await }
}
