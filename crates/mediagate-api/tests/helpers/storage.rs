//! In-memory storage double that records every put.

use async_trait::async_trait;
use bytes::Bytes;
use mediagate_core::StorageBackend;
use mediagate_storage::{Storage, StorageError, StorageResult, StoredObject};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const TEST_BUCKET: &str = "test-media";

#[derive(Debug, Clone)]
pub struct StoredPut {
    pub key: String,
    pub data: Bytes,
    pub content_type: String,
}

#[derive(Default)]
pub struct RecordingStorage {
    puts: Mutex<Vec<StoredPut>>,
    calls: AtomicUsize,
    /// 1-based call number that fails.
    fail_on_call: Option<usize>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on_call(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::default()
        }
    }

    pub fn puts(&self) -> Vec<StoredPut> {
        self.puts.lock().expect("puts lock poisoned").clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<StoredObject> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(StorageError::UploadFailed(format!(
                "simulated failure on call {}",
                call
            )));
        }

        self.puts.lock().expect("puts lock poisoned").push(StoredPut {
            key: key.to_string(),
            data,
            content_type: content_type.to_string(),
        });

        Ok(StoredObject {
            bucket: TEST_BUCKET.to_string(),
            key: key.to_string(),
        })
    }

    fn bucket(&self) -> &str {
        TEST_BUCKET
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
