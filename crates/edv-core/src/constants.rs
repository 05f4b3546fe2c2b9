//! Fixed values shared by the storage client, encoder, and surfaces.

/// Remote folder every document is stored under.
pub const DEFAULT_UPLOAD_FOLDER: &str = "/EDV";

/// File name offered for the QR code download.
pub const QR_CODE_FILE_NAME: &str = "qr_code.png";

/// MIME type of the QR code download.
pub const QR_CODE_CONTENT_TYPE: &str = "image/png";

/// Extensions accepted by the submission surface.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["pdf", "jpeg", "jpg", "png"];

pub const DEFAULT_DROPBOX_API_URL: &str = "https://api.dropboxapi.com";
pub const DEFAULT_DROPBOX_CONTENT_URL: &str = "https://content.dropboxapi.com";
pub const DEFAULT_DROPBOX_TOKEN_URL: &str = "https://api.dropboxapi.com/oauth2/token";
