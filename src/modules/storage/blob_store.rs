use async_trait::async_trait;

use crate::core::error::AppError;

/// Durable byte storage keyed by an opaque blob key.
///
/// Keys are never reused: a replacement is written under a fresh key and the old key is
/// deleted only after the metadata swap committed, so a reader holding either key gets a
/// complete payload.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError>;

    /// `None` when no object exists under `key`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError>;

    /// Deleting a missing key is not an error
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}

#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// Blob store kept in a map; `fail_puts` simulates an unreachable backend.
    #[derive(Default)]
    pub struct MemoryBlobStore {
        objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
        fail_puts: Mutex<bool>,
    }

    impl MemoryBlobStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn keys(&self) -> Vec<String> {
            let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
            keys.sort();
            keys
        }

        pub fn remove_silently(&self, key: &str) {
            self.objects.lock().unwrap().remove(key);
        }

        pub fn set_fail_puts(&self, fail: bool) {
            *self.fail_puts.lock().unwrap() = fail;
        }
    }

    #[async_trait]
    impl BlobStore for MemoryBlobStore {
        async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), AppError> {
            if *self.fail_puts.lock().unwrap() {
                return Err(AppError::StoreUnavailable("blob store offline".to_string()));
            }
            self.objects
                .lock()
                .unwrap()
                .insert(key.to_string(), (data, content_type.to_string()));
            Ok(())
        }

        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError> {
            Ok(self
                .objects
                .lock()
                .unwrap()
                .get(key)
                .map(|(data, _)| data.clone()))
        }

        async fn delete(&self, key: &str) -> Result<(), AppError> {
            self.objects.lock().unwrap().remove(key);
            Ok(())
        }
    }
}
