//! EDV Storage Library
//!
//! Remote document storage for EDV: the credential store, the OAuth2 token refresher,
//! and the Dropbox client that stores bytes and returns a direct-download link.
//!
//! # Remote path format
//!
//! Every document is stored at `{folder}/{file_name}`, with the folder defaulting to
//! `/EDV`. Path generation is centralized in the `keys` module.

pub mod credentials;
pub mod dropbox;
pub mod factory;
pub(crate) mod keys;
pub mod links;
pub mod refresh;
pub mod traits;

// Re-export commonly used types
pub use credentials::CredentialStore;
pub use dropbox::DropboxStorage;
pub use factory::{create_http_client, create_storage, StorageStack};
pub use refresh::{CredentialRefresher, RefreshError, TokenRefresher};
pub use traits::{RemoteStorage, RemoteStoreError, RemoteStoreResult};
