use crate::credentials::CredentialStore;
use crate::keys::remote_path;
use crate::links::direct_download_url;
use crate::traits::{RemoteStorage, RemoteStoreError, RemoteStoreResult};
use async_trait::async_trait;
use bytes::Bytes;
use edv_core::{Credentials, UploadMode};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

/// Dropbox storage implementation
///
/// Holds no token of its own: every `store` call opens a [`DropboxSession`] bound to
/// the credential snapshot current at that moment.
#[derive(Clone)]
pub struct DropboxStorage {
    client: Client,
    api_url: String,
    content_url: String,
    folder: String,
    mode: UploadMode,
    credentials: Arc<CredentialStore>,
}

#[derive(Serialize)]
struct UploadArg<'a> {
    path: &'a str,
    mode: &'a str,
    autorename: bool,
    mute: bool,
}

#[derive(Serialize)]
struct SharedLinkArg<'a> {
    path: &'a str,
}

impl DropboxStorage {
    /// Create a new DropboxStorage instance
    ///
    /// # Arguments
    /// * `api_url` - RPC endpoint base (e.g. "https://api.dropboxapi.com")
    /// * `content_url` - content endpoint base (e.g. "https://content.dropboxapi.com")
    /// * `folder` - remote folder documents are stored under (e.g. "/EDV")
    pub fn new(
        client: Client,
        api_url: impl Into<String>,
        content_url: impl Into<String>,
        folder: impl Into<String>,
        mode: UploadMode,
        credentials: Arc<CredentialStore>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            content_url: content_url.into().trim_end_matches('/').to_string(),
            folder: folder.into(),
            mode,
            credentials,
        }
    }

    /// Open a session bound to the current credential snapshot.
    pub fn session(&self) -> DropboxSession<'_> {
        DropboxSession {
            storage: self,
            credentials: self.credentials.snapshot(),
        }
    }
}

/// Request handle for one `store` call. Built per call, never cached.
pub struct DropboxSession<'a> {
    storage: &'a DropboxStorage,
    credentials: Arc<Credentials>,
}

impl DropboxSession<'_> {
    fn bearer(&self) -> String {
        format!("Bearer {}", self.credentials.access_token)
    }

    /// `files/upload`: write the bytes at `path`.
    pub async fn upload(&self, path: &str, data: Bytes) -> RemoteStoreResult<()> {
        let arg = UploadArg {
            path,
            mode: match self.storage.mode {
                UploadMode::Add => "add",
                UploadMode::Overwrite => "overwrite",
            },
            autorename: false,
            mute: false,
        };
        let arg = serde_json::to_string(&arg)
            .map_err(|e| RemoteStoreError::UploadFailed(e.to_string()))?;

        let response = self
            .storage
            .client
            .post(format!("{}/2/files/upload", self.storage.content_url))
            .header(reqwest::header::AUTHORIZATION, self.bearer())
            .header("Dropbox-API-Arg", header_safe_json(&arg))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await
            .map_err(|e| RemoteStoreError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = read_body(response).await;
        if status == StatusCode::UNAUTHORIZED {
            return Err(RemoteStoreError::Auth(error_summary(&body)));
        }

        Err(RemoteStoreError::UploadFailed(format!(
            "status {}: {}",
            status.as_u16(),
            error_summary(&body)
        )))
    }

    /// `sharing/create_shared_link_with_settings`: returns the link as issued.
    ///
    /// When the file already has a link the service answers 409 with the existing
    /// link's metadata, which is returned instead.
    pub async fn create_shared_link(&self, path: &str) -> RemoteStoreResult<String> {
        let response = self
            .storage
            .client
            .post(format!(
                "{}/2/sharing/create_shared_link_with_settings",
                self.storage.api_url
            ))
            .header(reqwest::header::AUTHORIZATION, self.bearer())
            .json(&SharedLinkArg { path })
            .send()
            .await
            .map_err(|e| RemoteStoreError::Transport(e.to_string()))?;

        let status = response.status();
        let body = read_body(response).await;
        let parsed: Option<serde_json::Value> = serde_json::from_str(&body).ok();

        if status.is_success() {
            return parsed
                .as_ref()
                .and_then(|v| v.get("url"))
                .and_then(|v| v.as_str())
                .map(String::from)
                .ok_or_else(|| {
                    RemoteStoreError::SharedLinkFailed("response has no url".to_string())
                });
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(RemoteStoreError::Auth(error_summary(&body)));
        }

        if status == StatusCode::CONFLICT {
            if let Some(url) = parsed
                .as_ref()
                .and_then(|v| v.pointer("/error/shared_link_already_exists/metadata/url"))
                .and_then(|v| v.as_str())
            {
                tracing::debug!(path = %path, "Reusing existing shared link");
                return Ok(url.to_string());
            }
        }

        Err(RemoteStoreError::SharedLinkFailed(format!(
            "status {}: {}",
            status.as_u16(),
            error_summary(&body)
        )))
    }
}

#[async_trait]
impl RemoteStorage for DropboxStorage {
    async fn store(&self, data: Bytes, file_name: &str) -> RemoteStoreResult<String> {
        let path = remote_path(&self.folder, file_name)?;
        let size = data.len();
        let start = std::time::Instant::now();

        let session = self.session();

        if let Err(e) = session.upload(&path, data).await {
            tracing::warn!(
                error = %e,
                path = %path,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Dropbox upload failed"
            );
            return Err(e);
        }

        let link = session.create_shared_link(&path).await.map_err(|e| {
            tracing::warn!(error = %e, path = %path, "Dropbox shared link failed");
            e
        })?;

        let link = direct_download_url(&link).map_err(RemoteStoreError::SharedLinkFailed)?;

        tracing::info!(
            path = %path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Dropbox upload successful"
        );

        Ok(link)
    }
}

async fn read_body(response: Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string())
}

/// `error_summary` field of a Dropbox error body, or the body itself.
fn error_summary(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error_summary").and_then(|s| s.as_str()).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Escape non-ASCII characters as `\uXXXX` so JSON can travel in an HTTP header.
fn header_safe_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn creds(access: &str) -> Credentials {
        Credentials {
            access_token: access.to_string(),
            refresh_token: "refresh".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        }
    }

    fn storage(server: &mockito::Server, store: Arc<CredentialStore>) -> DropboxStorage {
        DropboxStorage::new(
            Client::new(),
            server.url(),
            server.url(),
            "/EDV",
            UploadMode::Add,
            store,
        )
    }

    #[tokio::test]
    async fn test_store_uploads_then_links() {
        let mut server = mockito::Server::new_async().await;
        let upload = server
            .mock("POST", "/2/files/upload")
            .match_header("authorization", "Bearer token-1")
            .match_header("content-type", "application/octet-stream")
            .match_header(
                "dropbox-api-arg",
                r#"{"path":"/EDV/aadhaar.pdf","mode":"add","autorename":false,"mute":false}"#,
            )
            .match_body("pdf-bytes")
            .with_status(200)
            .with_body(r#"{"name":"aadhaar.pdf","path_display":"/EDV/aadhaar.pdf"}"#)
            .expect(1)
            .create_async()
            .await;
        let link = server
            .mock("POST", "/2/sharing/create_shared_link_with_settings")
            .match_header("authorization", "Bearer token-1")
            .match_body(Matcher::Json(serde_json::json!({"path": "/EDV/aadhaar.pdf"})))
            .with_status(200)
            .with_body(r#"{"url":"https://www.dropbox.com/scl/fi/a1/aadhaar.pdf?rlkey=r&dl=0"}"#)
            .expect(1)
            .create_async()
            .await;

        let store = Arc::new(CredentialStore::new(creds("token-1")));
        let url = storage(&server, store)
            .store(Bytes::from_static(b"pdf-bytes"), "aadhaar.pdf")
            .await
            .unwrap();

        upload.assert_async().await;
        link.assert_async().await;
        assert_eq!(
            url,
            "https://www.dropbox.com/scl/fi/a1/aadhaar.pdf?rlkey=r&dl=1"
        );
    }

    #[tokio::test]
    async fn test_store_uses_current_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let _upload = server
            .mock("POST", "/2/files/upload")
            .match_header("authorization", "Bearer token-2")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let _link = server
            .mock("POST", "/2/sharing/create_shared_link_with_settings")
            .match_header("authorization", "Bearer token-2")
            .with_status(200)
            .with_body(r#"{"url":"https://www.dropbox.com/s/x/pan.pdf?dl=0"}"#)
            .create_async()
            .await;

        let store = Arc::new(CredentialStore::new(creds("token-1")));
        let storage = storage(&server, store.clone());
        store.replace(creds("token-2"));

        let url = storage
            .store(Bytes::from_static(b"x"), "pan.pdf")
            .await
            .unwrap();
        assert_eq!(url, "https://www.dropbox.com/s/x/pan.pdf?dl=1");
    }

    #[tokio::test]
    async fn test_store_unauthorized_is_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let _upload = server
            .mock("POST", "/2/files/upload")
            .with_status(401)
            .with_body(r#"{"error_summary":"expired_access_token/..","error":{".tag":"expired_access_token"}}"#)
            .create_async()
            .await;
        let link = server
            .mock("POST", "/2/sharing/create_shared_link_with_settings")
            .expect(0)
            .create_async()
            .await;

        let store = Arc::new(CredentialStore::new(creds("expired")));
        let err = storage(&server, store)
            .store(Bytes::from_static(b"x"), "pan.pdf")
            .await
            .unwrap_err();

        link.assert_async().await;
        assert_eq!(
            err,
            RemoteStoreError::Auth("expired_access_token/..".to_string())
        );
    }

    #[tokio::test]
    async fn test_store_conflict_is_upload_error() {
        let mut server = mockito::Server::new_async().await;
        let _upload = server
            .mock("POST", "/2/files/upload")
            .with_status(409)
            .with_body(r#"{"error_summary":"path/conflict/file/..","error":{".tag":"path"}}"#)
            .create_async()
            .await;

        let store = Arc::new(CredentialStore::new(creds("token")));
        let err = storage(&server, store)
            .store(Bytes::from_static(b"x"), "pan.pdf")
            .await
            .unwrap_err();

        assert!(!err.is_auth());
        assert!(matches!(err, RemoteStoreError::UploadFailed(ref m) if m.contains("path/conflict")));
    }

    #[tokio::test]
    async fn test_shared_link_unauthorized_is_auth_error() {
        let mut server = mockito::Server::new_async().await;
        let _upload = server
            .mock("POST", "/2/files/upload")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let _link = server
            .mock("POST", "/2/sharing/create_shared_link_with_settings")
            .with_status(401)
            .with_body(r#"{"error_summary":"invalid_access_token/"}"#)
            .create_async()
            .await;

        let store = Arc::new(CredentialStore::new(creds("token")));
        let err = storage(&server, store)
            .store(Bytes::from_static(b"x"), "pan.pdf")
            .await
            .unwrap_err();
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn test_existing_shared_link_is_reused() {
        let mut server = mockito::Server::new_async().await;
        let _upload = server
            .mock("POST", "/2/files/upload")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;
        let _link = server
            .mock("POST", "/2/sharing/create_shared_link_with_settings")
            .with_status(409)
            .with_body(
                r#"{"error_summary":"shared_link_already_exists/metadata/..","error":{".tag":"shared_link_already_exists","shared_link_already_exists":{".tag":"metadata","metadata":{"url":"https://www.dropbox.com/s/old/pan.pdf?dl=0"}}}}"#,
            )
            .create_async()
            .await;

        let store = Arc::new(CredentialStore::new(creds("token")));
        let url = storage(&server, store)
            .store(Bytes::from_static(b"x"), "pan.pdf")
            .await
            .unwrap();
        assert_eq!(url, "https://www.dropbox.com/s/old/pan.pdf?dl=1");
    }

    #[tokio::test]
    async fn test_invalid_file_name_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let upload = server
            .mock("POST", "/2/files/upload")
            .expect(0)
            .create_async()
            .await;

        let store = Arc::new(CredentialStore::new(creds("token")));
        let err = storage(&server, store)
            .store(Bytes::from_static(b"x"), "../escape.pdf")
            .await
            .unwrap_err();

        upload.assert_async().await;
        assert!(matches!(err, RemoteStoreError::InvalidPath(_)));
    }

    #[test]
    fn test_header_safe_json() {
        assert_eq!(header_safe_json(r#"{"path":"/EDV/a.pdf"}"#), r#"{"path":"/EDV/a.pdf"}"#);
        assert_eq!(header_safe_json("é"), "\\u00e9");
        assert_eq!(header_safe_json("😀"), "\\ud83d\\ude00");
    }

    #[test]
    fn test_error_summary_falls_back_to_body() {
        assert_eq!(error_summary(r#"{"error_summary":"too_many_write_operations/"}"#), "too_many_write_operations/");
        assert_eq!(error_summary("Service Unavailable"), "Service Unavailable");
    }
}
