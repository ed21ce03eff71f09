//! Multipart uploads for Google Drive.
//!
//! Files are sent as a single `multipart/related` request: a JSON metadata part
//! followed by the raw file bytes. There is no resumable or chunked mode; the
//! whole file is read into memory first.

use crate::auth::AccessToken;
use crate::client::{decode, ensure_success, RequestExecutor};
use crate::errors::{DriveError, DriveResult, ValidationError};
use crate::services::{require, require_token};
use crate::transport::{HttpMethod, MultipartBody, RequestBody};
use crate::types::{FileMetadata, FileRef};
use bytes::Bytes;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Service for uploading local files.
pub struct UploadService {
    executor: Arc<RequestExecutor>,
}

impl UploadService {
    /// Creates a new upload service.
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Uploads a local file into `folder_id`, keeping its base name.
    ///
    /// Arguments and the local path are checked before any request is sent.
    ///
    /// # Returns
    ///
    /// The ID of the new Drive file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use integrations_drive_deploy::*;
    /// # async fn example(client: DriveDeployClient) -> DriveResult<()> {
    /// let token = AccessToken::bearer("ya29....");
    /// let id = client.uploads().upload_file_to_drive(&token, "folder123", "./out/report.pdf").await?;
    /// println!("uploaded {}", id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn upload_file_to_drive(
        &self,
        token: &AccessToken,
        folder_id: &str,
        file_path: impl AsRef<Path>,
    ) -> DriveResult<String> {
        let file_path = file_path.as_ref();

        require_token(token)?;
        require(folder_id, "folderID")?;
        if file_path.as_os_str().is_empty() {
            return Err(DriveError::missing("filePath"));
        }
        check_local_file(file_path).await?;

        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.upload(token, FileMetadata::new(&file_name, folder_id), file_path, true)
            .await
    }

    /// Uploads `file_path` with explicit metadata.
    ///
    /// With `with_disposition` the content part also carries a `form-data`
    /// disposition naming the file; Drive ignores it.
    pub(crate) async fn upload(
        &self,
        token: &AccessToken,
        metadata: FileMetadata,
        file_path: &Path,
        with_disposition: bool,
    ) -> DriveResult<String> {
        let content = tokio::fs::read(file_path).await?;
        let content_type = content_type_for(file_path);

        let metadata_json = serde_json::to_vec(&metadata).map_err(|e| {
            DriveError::invalid_request(format!("Failed to serialize metadata: {}", e))
        })?;

        let mut body = MultipartBody::new(
            Bytes::from(metadata_json),
            Bytes::from(content),
            content_type.essence_str(),
        );
        if with_disposition {
            body = body.with_file_name(&metadata.name);
        }

        let mut url = self.executor.build_upload_url("files")?;
        url.query_pairs_mut().append_pair("uploadType", "multipart");

        debug!(
            name = %metadata.name,
            content_type = %content_type,
            size = body.content.len(),
            "uploading file"
        );

        let mut request = self.executor.authorized(HttpMethod::Post, url, token)?;
        request.body = Some(RequestBody::Multipart(body));

        let response = ensure_success(self.executor.send(request).await?)?;
        let file: FileRef = decode(&response)?;

        let id = file
            .id()
            .ok_or_else(|| DriveError::missing_field("id", response.text()))?
            .to_string();

        info!(file_id = %id, name = %metadata.name, "uploaded new file");
        Ok(id)
    }
}

/// Content type for a local file, from its extension.
pub fn content_type_for(path: &Path) -> mime::Mime {
    mime_guess::from_path(path).first_or_octet_stream()
}

/// Fails unless `path` exists and is not a directory.
pub(crate) async fn check_local_file(path: &Path) -> DriveResult<()> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ValidationError::FileNotFound(path.display().to_string()).into());
        }
        Err(e) => return Err(e.into()),
    };

    if metadata.is_dir() {
        return Err(ValidationError::NotAFile(path.display().to_string()).into());
    }

    Ok(())
}
