//! Versioned PDF deployment.
//!
//! A deploy publishes `<file_name>.pdf` from a local directory into a final Drive
//! folder, using the file description as the version label:
//!
//! 1. search the final folder for the file;
//! 2. stop if its description already equals the version label;
//! 3. otherwise archive the old version (rename + move) when an archive folder is
//!    configured, or delete it when not;
//! 4. upload the new file into a temporary folder with the label as description;
//! 5. optionally restrict sharing on the new file (best effort);
//! 6. move the new file from the temporary folder into the final folder.
//!
//! Steps run strictly in order and nothing is rolled back: once the old version
//! is archived or deleted, a later failure leaves Drive without a current file.

use crate::auth::AccessToken;
use crate::client::RequestExecutor;
use crate::errors::{DeployStage, DriveError, DriveResult};
use crate::services::mover::{archived_file_name, MoverService};
use crate::services::{
    check_local_file, pdf_file_name, require, require_token, QueryService, UploadService,
};
use crate::types::FileMetadata;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Parameters of a single deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    /// Base name of the PDF, without the `.pdf` extension.
    pub file_name: String,

    /// Version label stored in the Drive description.
    pub version_label: String,

    /// Folder the new file is uploaded into before the final move.
    pub temp_folder_id: String,

    /// Folder the deployed file lives in.
    pub final_folder_id: String,

    /// Folder old versions are moved to; `None` or empty deletes them instead.
    pub archive_folder_id: Option<String>,

    /// Local directory holding `<file_name>.pdf`.
    pub source_dir: PathBuf,
}

impl DeployRequest {
    /// Creates a request without an archive folder.
    pub fn new(
        file_name: impl Into<String>,
        version_label: impl Into<String>,
        temp_folder_id: impl Into<String>,
        final_folder_id: impl Into<String>,
        source_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            version_label: version_label.into(),
            temp_folder_id: temp_folder_id.into(),
            final_folder_id: final_folder_id.into(),
            archive_folder_id: None,
            source_dir: source_dir.into(),
        }
    }

    /// Sets the archive folder.
    pub fn with_archive_folder(mut self, folder_id: impl Into<String>) -> Self {
        self.archive_folder_id = Some(folder_id.into());
        self
    }

    /// Name of the PDF on Drive.
    pub fn pdf_file_name(&self) -> String {
        pdf_file_name(&self.file_name)
    }

    /// Local path of the PDF.
    pub fn pdf_path(&self) -> PathBuf {
        self.source_dir.join(self.pdf_file_name())
    }

    /// Archive folder, if configured and non-empty.
    pub fn archive_folder(&self) -> Option<&str> {
        self.archive_folder_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Checks required fields. Does not touch the file system.
    pub fn validate(&self) -> DriveResult<()> {
        require(&self.file_name, "fileName")?;
        require(&self.temp_folder_id, "tempFolderID")?;
        require(&self.final_folder_id, "finalFolderID")?;
        require(&self.version_label, "versionLabel")?;
        Ok(())
    }
}

/// Result of a step whose failure does not abort the deploy.
#[derive(Debug)]
pub enum BestEffort<T> {
    /// The step succeeded.
    Applied(T),
    /// The step was disabled by configuration.
    Skipped,
    /// The step failed; the error is kept for inspection.
    Failed(DriveError),
}

impl<T> BestEffort<T> {
    /// Returns true if the step succeeded.
    pub fn is_applied(&self) -> bool {
        matches!(self, BestEffort::Applied(_))
    }

    /// Returns the error if the step failed.
    pub fn error(&self) -> Option<&DriveError> {
        match self {
            BestEffort::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// What happened to the version that was live before the deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviousVersion {
    /// No file with that name was in the final folder.
    None,
    /// Renamed and moved into the archive folder.
    Archived {
        /// ID of the archived file.
        file_id: String,
        /// Its new name.
        archived_name: String,
    },
    /// Deleted because no archive folder was configured.
    Deleted {
        /// ID of the deleted file.
        file_id: String,
    },
}

/// Outcome of a successful deploy.
#[derive(Debug)]
pub enum DeployOutcome {
    /// The final folder already holds this version; nothing was changed.
    AlreadyDeployed {
        /// ID of the existing file.
        file_id: String,
    },
    /// A new file was uploaded and moved into the final folder.
    Deployed {
        /// ID of the new file.
        file_id: String,
        /// Fate of the previous version.
        previous: PreviousVersion,
        /// Result of the sharing-restriction patch.
        sharing: BestEffort<()>,
    },
}

impl DeployOutcome {
    /// ID of the file now live in the final folder.
    pub fn file_id(&self) -> &str {
        match self {
            DeployOutcome::AlreadyDeployed { file_id } | DeployOutcome::Deployed { file_id, .. } => {
                file_id
            }
        }
    }

    /// Returns true if nothing was uploaded.
    pub fn is_skipped(&self) -> bool {
        matches!(self, DeployOutcome::AlreadyDeployed { .. })
    }
}

/// Orchestrates query, archive-or-delete, upload, sharing restriction and move.
pub struct DeployWorkflow {
    query: QueryService,
    upload: UploadService,
    mover: MoverService,
    restrict_sharing: bool,
}

impl DeployWorkflow {
    /// Creates a new workflow.
    pub(crate) fn new(executor: Arc<RequestExecutor>) -> Self {
        let restrict_sharing = executor.config().restrict_sharing;
        Self {
            query: QueryService::new(executor.clone()),
            upload: UploadService::new(executor.clone()),
            mover: MoverService::new(executor),
            restrict_sharing,
        }
    }

    /// Overrides the configured sharing-restriction switch.
    pub fn with_restrict_sharing(mut self, enabled: bool) -> Self {
        self.restrict_sharing = enabled;
        self
    }

    /// Deploys `<file_name>.pdf` from `request.source_dir`.
    ///
    /// Fails before any request if a required field is empty or the PDF is
    /// missing. If the final move fails, the uploaded file stays in the
    /// temporary folder and [`DriveError::Orphaned`] names it.
    pub async fn deploy_pdf(
        &self,
        token: &AccessToken,
        request: &DeployRequest,
    ) -> DriveResult<DeployOutcome> {
        require_token(token)?;
        request.validate()?;

        let pdf_name = request.pdf_file_name();
        let pdf_path = request.pdf_path();
        check_local_file(&pdf_path).await?;

        let existing = self
            .query
            .find_file(token, &request.file_name, &request.final_folder_id)
            .await
            .map_err(|e| e.at(DeployStage::Query))?;

        if let Some(file) = &existing {
            if file.description == request.version_label {
                info!(file = %pdf_name, version = %request.version_label, "skipped: version already deployed");
                return Ok(DeployOutcome::AlreadyDeployed {
                    file_id: file.id.clone(),
                });
            }
        }

        let previous = match (existing, request.archive_folder()) {
            (Some(file), Some(archive_folder_id)) => {
                let archived_name = archived_file_name(&request.file_name, &file.description);

                self.mover
                    .rename(token, &file.id, &archived_name)
                    .await
                    .map_err(|e| e.at(DeployStage::Rename))?;
                self.mover
                    .move_parents(token, &file.id, archive_folder_id, &request.final_folder_id)
                    .await
                    .map_err(|e| e.at(DeployStage::Archive))?;

                info!(file_id = %file.id, archived_name = %archived_name, "archived old version");
                PreviousVersion::Archived {
                    file_id: file.id,
                    archived_name,
                }
            }
            (Some(file), None) => {
                warn!(file_id = %file.id, file = %pdf_name, "no archive folder set; deleting existing file");
                self.mover
                    .delete(token, &file.id)
                    .await
                    .map_err(|e| e.at(DeployStage::Delete))?;
                PreviousVersion::Deleted { file_id: file.id }
            }
            (None, _) => {
                info!(file = %pdf_name, "no existing version found");
                PreviousVersion::None
            }
        };

        let metadata = FileMetadata::new(&pdf_name, &request.temp_folder_id)
            .with_description(&request.version_label);
        let file_id = self
            .upload
            .upload(token, metadata, &pdf_path, false)
            .await
            .map_err(|e| e.at(DeployStage::Upload))?;

        let sharing = if self.restrict_sharing {
            match self.mover.restrict_sharing(token, &file_id).await {
                Ok(()) => BestEffort::Applied(()),
                Err(e) => {
                    warn!(file_id = %file_id, error = %e, "could not restrict sharing");
                    BestEffort::Failed(e)
                }
            }
        } else {
            BestEffort::Skipped
        };

        if let Err(e) = self
            .mover
            .move_parents(token, &file_id, &request.final_folder_id, &request.temp_folder_id)
            .await
        {
            return Err(DriveError::Orphaned {
                file_id,
                temp_folder_id: request.temp_folder_id.clone(),
                source: Box::new(e),
            });
        }

        info!(file_id = %file_id, folder_id = %request.final_folder_id, "deployment successful");
        Ok(DeployOutcome::Deployed {
            file_id,
            previous,
            sharing,
        })
    }
}
