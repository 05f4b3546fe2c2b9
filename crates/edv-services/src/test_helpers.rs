//! In-memory fakes for the storage seams
//!
//! Each fake replays scripted results in order and counts calls, so tests can assert
//! exactly how many remote operations a submission performed.

use async_trait::async_trait;
use bytes::Bytes;
use edv_storage::{
    CredentialRefresher, RefreshError, RemoteStorage, RemoteStoreError, RemoteStoreResult,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Link the fake storage returns when no result is scripted.
pub fn default_link(file_name: &str) -> String {
    format!("https://www.dropbox.com/s/test/{}?dl=1", file_name)
}

/// Remote storage fake. Unscripted calls succeed with [`default_link`].
#[derive(Default)]
pub struct FakeStorage {
    responses: Mutex<VecDeque<RemoteStoreResult<String>>>,
    stored: Mutex<Vec<String>>,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = RemoteStoreResult<String>>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            stored: Mutex::new(Vec::new()),
        }
    }

    /// Number of `store` calls made.
    pub fn calls(&self) -> usize {
        self.stored.lock().unwrap().len()
    }

    /// File names passed to `store`, in call order.
    pub fn stored_names(&self) -> Vec<String> {
        self.stored.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteStorage for FakeStorage {
    async fn store(&self, _data: Bytes, file_name: &str) -> RemoteStoreResult<String> {
        self.stored.lock().unwrap().push(file_name.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(default_link(file_name)))
    }
}

/// Credential refresher fake. Unscripted calls succeed.
#[derive(Default)]
pub struct FakeRefresher {
    results: Mutex<VecDeque<Result<(), RefreshError>>>,
    calls: AtomicUsize,
}

impl FakeRefresher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(payload: &str) -> Self {
        let refresher = Self::new();
        refresher.push_result(Err(RefreshError::Rejected {
            status: 400,
            payload: payload.to_string(),
        }));
        refresher
    }

    pub fn push_result(&self, result: Result<(), RefreshError>) {
        self.results.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialRefresher for FakeRefresher {
    async fn refresh(&self) -> Result<(), RefreshError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

/// Shorthand for a rejected-credential store result.
pub fn auth_error() -> RemoteStoreResult<String> {
    Err(RemoteStoreError::Auth("expired_access_token/".to_string()))
}

/// Shorthand for a non-auth store failure.
pub fn upload_error(reason: &str) -> RemoteStoreResult<String> {
    Err(RemoteStoreError::UploadFailed(reason.to_string()))
}
