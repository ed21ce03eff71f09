//! Search for a deployed file and compare its version label.

use crate::auth::AccessToken;
use crate::client::RequestExecutor;
use crate::errors::DriveResult;
use crate::services::{require, require_token};
use crate::transport::HttpMethod;
use crate::types::{DriveFileRecord, FileList};
use std::sync::Arc;
use tracing::info;

/// Fields requested from `files.list`.
pub const SEARCH_FIELDS: &str = "files(id,name,description)";

/// Service for looking up deployed files by name.
pub struct QueryService {
    executor: Arc<RequestExecutor>,
}

impl QueryService {
    /// Creates a new query service.
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        Self { executor }
    }

    /// Finds `<file_name>.pdf` directly inside `folder_id`, ignoring trashed files.
    ///
    /// Returns the first match, if any.
    pub async fn find_file(
        &self,
        token: &AccessToken,
        file_name: &str,
        folder_id: &str,
    ) -> DriveResult<Option<DriveFileRecord>> {
        require_token(token)?;
        require(file_name, "fileName")?;
        require(folder_id, "folderID")?;

        let mut url = self.executor.build_url("files")?;
        url.query_pairs_mut()
            .append_pair("q", &search_query(folder_id, &pdf_file_name(file_name)))
            .append_pair("fields", SEARCH_FIELDS);

        let list: FileList = self
            .executor
            .execute_json(HttpMethod::Get, url, token, None)
            .await?;

        Ok(list.files.into_iter().next())
    }

    /// Returns true iff a file named `<file_name>.pdf` exists in `folder_id` and the
    /// first match's description equals `version_label` exactly.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use integrations_drive_deploy::*;
    /// # async fn example(client: DriveDeployClient) -> DriveResult<()> {
    /// let token = AccessToken::bearer("ya29....");
    /// if client.query().check_remote_version_exists(&token, "handbook", "folder", "v2").await? {
    ///     println!("already deployed");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn check_remote_version_exists(
        &self,
        token: &AccessToken,
        file_name: &str,
        folder_id: &str,
        version_label: &str,
    ) -> DriveResult<bool> {
        require_token(token)?;
        require(file_name, "fileName")?;
        require(folder_id, "folderID")?;
        require(version_label, "versionLabel")?;

        let pdf_name = pdf_file_name(file_name);
        let existing = self.find_file(token, file_name, folder_id).await?;

        match existing {
            Some(file) if file.description == version_label => {
                info!(file = %pdf_name, version = %version_label, "exact version already deployed");
                Ok(true)
            }
            _ => {
                info!(file = %pdf_name, version = %version_label, "new or unmatched version");
                Ok(false)
            }
        }
    }
}

/// Name of the deployed PDF for a base file name.
pub fn pdf_file_name(file_name: &str) -> String {
    format!("{}.pdf", file_name)
}

/// Builds the Drive search expression for a file in a folder.
pub fn search_query(folder_id: &str, name: &str) -> String {
    format!(
        "'{}' in parents and name='{}' and trashed=false",
        escape_literal(folder_id),
        escape_literal(name)
    )
}

// Drive query string literals escape backslash and single quote.
fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
