//! Patch and delete calls used by the deploy workflow.

use crate::auth::AccessToken;
use crate::client::{decode, RequestExecutor};
use crate::errors::{DriveError, DriveResult};
use crate::transport::{HttpMethod, RequestBody};
use crate::types::{FileRef, RenameRequest, SharingRestrictions};
use reqwest::StatusCode;
use std::sync::Arc;
use tracing::debug;

/// Renames, moves, deletes and restricts existing Drive files.
pub(crate) struct MoverService {
    executor: Arc<RequestExecutor>,
}

impl MoverService {
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// PATCH `{name}` on the file.
    pub(crate) async fn rename(
        &self,
        token: &AccessToken,
        file_id: &str,
        new_name: &str,
    ) -> DriveResult<()> {
        let url = self.executor.file_url(file_id)?;
        let body = RequestBody::json(&RenameRequest {
            name: new_name.to_string(),
        })?;

        debug!(file_id, new_name, "renaming file");
        self.executor
            .execute(HttpMethod::Patch, url, token, Some(body))
            .await?;
        Ok(())
    }

    /// Moves the file by adding one parent and removing another.
    ///
    /// The decoded response must carry a non-empty `id`.
    pub(crate) async fn move_parents(
        &self,
        token: &AccessToken,
        file_id: &str,
        add_parent: &str,
        remove_parent: &str,
    ) -> DriveResult<FileRef> {
        let mut url = self.executor.file_url(file_id)?;
        url.query_pairs_mut()
            .append_pair("addParents", add_parent)
            .append_pair("removeParents", remove_parent)
            .append_pair("fields", "id,parents");

        debug!(file_id, add_parent, remove_parent, "moving file");
        let response = self
            .executor
            .execute(HttpMethod::Patch, url, token, None)
            .await?;

        let file: FileRef = decode(&response)?;
        if file.id().is_none() {
            return Err(DriveError::missing_field("id", response.text()));
        }
        Ok(file)
    }

    /// Deletes the file. Only 204 and 200 count as success.
    pub(crate) async fn delete(&self, token: &AccessToken, file_id: &str) -> DriveResult<()> {
        let url = self.executor.file_url(file_id)?;
        let request = self.executor.authorized(HttpMethod::Delete, url, token)?;

        debug!(file_id, "deleting file");
        let response = self.executor.send(request).await?;

        match response.status {
            StatusCode::NO_CONTENT | StatusCode::OK => Ok(()),
            status => Err(DriveError::remote(status, response.text())),
        }
    }

    /// Blocks copying by readers and resharing by writers.
    pub(crate) async fn restrict_sharing(
        &self,
        token: &AccessToken,
        file_id: &str,
    ) -> DriveResult<()> {
        let url = self.executor.file_url(file_id)?;
        let body = RequestBody::json(&SharingRestrictions::locked())?;

        self.executor
            .execute(HttpMethod::Patch, url, token, Some(body))
            .await?;
        Ok(())
    }
}

/// Name an existing version is renamed to before it is archived.
///
/// An empty description, or the literal `null`, becomes `unknown`.
pub(crate) fn archived_file_name(file_name: &str, description: &str) -> String {
    let version = match description {
        "" | "null" => "unknown",
        other => other,
    };
    format!("{}-{}.pdf", file_name, version)
}
