use crate::{
    CredentialRefresher, CredentialStore, DropboxStorage, RemoteStorage, RemoteStoreError,
    RemoteStoreResult, TokenRefresher,
};
use edv_core::Config;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Everything the upload pipeline needs, sharing one credential store.
#[derive(Clone)]
pub struct StorageStack {
    pub credentials: Arc<CredentialStore>,
    pub storage: Arc<dyn RemoteStorage>,
    pub refresher: Arc<dyn CredentialRefresher>,
}

/// HTTP client shared by the token refresher and the Dropbox client.
pub fn create_http_client(config: &Config) -> RemoteStoreResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .map_err(|e| RemoteStoreError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

/// Create the credential store, refresher, and Dropbox storage from configuration
pub fn create_storage(config: &Config) -> RemoteStoreResult<StorageStack> {
    let client = create_http_client(config)?;
    let credentials = Arc::new(CredentialStore::new(config.credentials.clone()));

    let refresher = TokenRefresher::new(
        client.clone(),
        config.dropbox_token_url.clone(),
        credentials.clone(),
    );

    let storage = DropboxStorage::new(
        client,
        config.dropbox_api_url.clone(),
        config.dropbox_content_url.clone(),
        config.upload_folder.clone(),
        config.upload_mode,
        credentials.clone(),
    );

    tracing::info!(
        folder = %config.upload_folder,
        mode = %config.upload_mode,
        api_url = %config.dropbox_api_url,
        "Dropbox storage configured"
    );

    Ok(StorageStack {
        credentials,
        storage: Arc::new(storage),
        refresher: Arc::new(refresher),
    })
}
