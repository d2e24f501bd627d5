use std::{collections::BTreeMap, path::Path, sync::Arc};

use models::ResourceConfig;
use tracing::info;

use crate::errors::ServiceError;
use crate::storage::{record_store::RecordStore, repository::RecordRepository};

/// Resource name -> store. Built once at startup and shared by all handlers.
#[derive(Clone, Default)]
pub struct StoreRegistry {
    stores: Arc<BTreeMap<String, Arc<dyn RecordRepository>>>,
}

impl StoreRegistry {
    /// Open one `RecordStore` per resource under `data_dir`.
    /// Two resources may not share a name or a backing file.
    pub async fn open<P: AsRef<Path>>(data_dir: P, resources: Vec<ResourceConfig>) -> Result<Self, ServiceError> {
        let data_dir = data_dir.as_ref();
        let mut stores: BTreeMap<String, Arc<dyn RecordRepository>> = BTreeMap::new();
        for (i, cfg) in resources.iter().enumerate() {
            if let Some(other) = resources[..i].iter().find(|o| o.name == cfg.name || o.file == cfg.file) {
                return Err(ServiceError::Config(format!(
                    "resources `{}` and `{}` collide on name or file",
                    other.name, cfg.name
                )));
            }
        }
        for cfg in resources {
            let name = cfg.name.clone();
            let store = RecordStore::open(data_dir.join(&cfg.file), cfg).await?;
            stores.insert(name, store);
        }
        info!(data_dir = %data_dir.display(), resources = stores.len(), "store registry ready");
        Ok(Self { stores: Arc::new(stores) })
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn RecordRepository>, ServiceError> {
        self.stores
            .get(name)
            .cloned()
            .ok_or_else(|| ServiceError::not_found(&format!("resource `{name}`")))
    }

    /// Configurations of every registered resource, sorted by name.
    pub fn resources(&self) -> Vec<ResourceConfig> {
        self.stores.values().map(|s| s.config().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::builtin_resources;
    use uuid::Uuid;

    #[tokio::test]
    async fn opens_every_builtin_resource() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("store_registry_{}", Uuid::new_v4()));
        let registry = StoreRegistry::open(&dir, builtin_resources()).await?;
        assert_eq!(registry.len(), 6);

        for name in ["appoint", "event", "prof", "student", "teacher", "user"] {
            let store = registry.get(name)?;
            assert!(store.list().await?.is_empty());
            assert!(tokio::fs::metadata(dir.join(&store.config().file)).await.is_ok());
        }
        assert!(matches!(registry.get("nope"), Err(ServiceError::NotFound(_))));

        let names: Vec<String> = registry.resources().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["appoint", "event", "prof", "student", "teacher", "user"]);

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn rejects_shared_backing_file() {
        let dir = std::env::temp_dir().join(format!("store_registry_{}", Uuid::new_v4()));
        let resources = vec![
            ResourceConfig::new("teacher", "teachers.json"),
            ResourceConfig::new("schedule", "teachers.json"),
        ];
        assert!(matches!(StoreRegistry::open(&dir, resources).await, Err(ServiceError::Config(_))));
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
