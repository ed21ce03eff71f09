//! Request and response schemas for the Drive endpoints used by the deploy flow.

use serde::{Deserialize, Deserializer, Serialize};

/// A file found by a Drive search.
///
/// The description field carries the deployed version label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriveFileRecord {
    /// File ID.
    pub id: String,

    /// File name.
    #[serde(default)]
    pub name: String,

    /// File description (the version label); empty when unset.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
}

/// Response of `files.list`.
#[derive(Debug, Clone, Deserialize)]
pub struct FileList {
    /// Matching files.
    pub files: Vec<DriveFileRecord>,
}

/// Metadata part of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMetadata {
    /// Name of the new file.
    pub name: String,

    /// Parent folder IDs.
    pub parents: Vec<String>,

    /// Description (version label).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FileMetadata {
    /// Creates metadata placing `name` into a single folder.
    pub fn new(name: impl Into<String>, folder_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: vec![folder_id.into()],
            description: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Body of a rename patch.
#[derive(Debug, Clone, Serialize)]
pub struct RenameRequest {
    /// New file name.
    pub name: String,
}

/// Body of the sharing-restriction patch.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharingRestrictions {
    /// Only writers may copy, print or download.
    pub copy_requires_writer_permission: bool,

    /// Writers may change permissions and share.
    pub writers_can_share: bool,
}

impl SharingRestrictions {
    /// Restrictions applied to deployed files: no copying by readers, no resharing by writers.
    pub fn locked() -> Self {
        Self {
            copy_requires_writer_permission: true,
            writers_can_share: false,
        }
    }
}

/// Minimal file resource returned by uploads and parent moves.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileRef {
    /// File ID; absent or empty means the call did not produce a file.
    #[serde(default)]
    pub id: Option<String>,

    /// Parent folder IDs, when requested.
    #[serde(default)]
    pub parents: Vec<String>,
}

impl FileRef {
    /// Returns the ID if present and non-empty.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
