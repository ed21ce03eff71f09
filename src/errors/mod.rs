//! Error types for the Drive deploy integration.

use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// Result type for Drive deploy operations.
pub type DriveResult<T> = Result<T, DriveError>;

/// Top-level error type for the Drive deploy integration.
#[derive(Debug, Error)]
pub enum DriveError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Authentication error.
    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    /// Local validation error, raised before any request is sent.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Network error.
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Response error (undecodable body or missing field).
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    /// Non-success HTTP status from Drive.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Local I/O error while reading the file to upload.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A deploy stage failed.
    #[error("{stage} failed: {source}")]
    Deploy {
        /// The stage that failed.
        stage: DeployStage,
        /// Underlying error.
        #[source]
        source: Box<DriveError>,
    },

    /// The new file was uploaded but could not be moved out of the temporary folder.
    #[error(
        "upload succeeded, but move failed: file {file_id} remains in folder {temp_folder_id}: {source}"
    )]
    Orphaned {
        /// ID of the uploaded file.
        file_id: String,
        /// Folder the file was left in.
        temp_folder_id: String,
        /// Underlying error.
        #[source]
        source: Box<DriveError>,
    },
}

impl DriveError {
    /// Creates a missing parameter error.
    pub fn missing(param: impl Into<String>) -> Self {
        DriveError::Validation(ValidationError::MissingParameter(param.into()))
    }

    /// Creates an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        DriveError::Validation(ValidationError::InvalidRequest(msg.into()))
    }

    /// Creates a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        DriveError::Configuration(ConfigurationError::InvalidConfiguration(msg.into()))
    }

    /// Creates a deserialization error.
    pub fn deserialization(msg: impl Into<String>) -> Self {
        DriveError::Response(ResponseError::Deserialization(msg.into()))
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>, body: impl Into<String>) -> Self {
        DriveError::Response(ResponseError::MissingField {
            field: field.into(),
            body: body.into(),
        })
    }

    /// Creates a remote error from a status code and raw body.
    pub fn remote(status: StatusCode, body: impl Into<String>) -> Self {
        DriveError::Remote(RemoteError {
            status,
            body: body.into(),
        })
    }

    /// Wraps this error with the deploy stage it happened in.
    pub fn at(self, stage: DeployStage) -> Self {
        DriveError::Deploy {
            stage,
            source: Box::new(self),
        }
    }

    /// Returns true if the error was raised locally before any request was sent.
    pub fn is_validation(&self) -> bool {
        match self {
            DriveError::Validation(_) => true,
            DriveError::Deploy { source, .. } => source.is_validation(),
            _ => false,
        }
    }

    /// Returns the deploy stage that failed, if any.
    pub fn stage(&self) -> Option<DeployStage> {
        match self {
            DriveError::Deploy { stage, .. } => Some(*stage),
            DriveError::Orphaned { .. } => Some(DeployStage::MoveToFinal),
            _ => None,
        }
    }

    /// Returns the HTTP status code if the error came from a response.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            DriveError::Remote(err) => Some(err.status),
            DriveError::Authentication(AuthenticationError::RefreshFailed { status, .. }) => {
                Some(*status)
            }
            DriveError::Deploy { source, .. } | DriveError::Orphaned { source, .. } => {
                source.status_code()
            }
            _ => None,
        }
    }
}

/// Stages of the deploy workflow, used to give errors context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployStage {
    /// Searching the final folder for an existing version.
    Query,
    /// Renaming the existing version before archiving.
    Rename,
    /// Moving the existing version into the archive folder.
    Archive,
    /// Deleting the existing version.
    Delete,
    /// Uploading the new version.
    Upload,
    /// Moving the new version into the final folder.
    MoveToFinal,
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeployStage::Query => "query for existing file",
            DeployStage::Rename => "rename existing file",
            DeployStage::Archive => "move old file to archive",
            DeployStage::Delete => "delete existing file",
            DeployStage::Upload => "upload",
            DeployStage::MoveToFinal => "move to final folder",
        };
        f.write_str(s)
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Missing credentials.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// The token endpoint rejected the refresh.
    #[error("Token refresh failed with status {status}: {message}")]
    RefreshFailed {
        /// HTTP status returned by the token endpoint.
        status: StatusCode,
        /// Error description or raw body.
        message: String,
    },
}

/// Local validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required argument was empty.
    #[error("{0} is required")]
    MissingParameter(String),

    /// The local file does not exist.
    #[error("file '{0}' not found")]
    FileNotFound(String),

    /// The local path is not a regular file.
    #[error("'{0}' is a directory")]
    NotAFile(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Network errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Timeout.
    #[error("Request timeout: {0}")]
    Timeout(String),
}

/// Response errors.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The body was not the expected JSON.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// The body was well-formed but lacked a required field.
    #[error("missing or empty '{field}' in response: {body}")]
    MissingField {
        /// Name of the missing field.
        field: String,
        /// Raw response body.
        body: String,
    },
}

/// Non-success HTTP response.
#[derive(Debug, Error)]
#[error("status {status}: {body}")]
pub struct RemoteError {
    /// HTTP status code.
    pub status: StatusCode,
    /// Raw response body.
    pub body: String,
}

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network error.
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout error.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// HTTP error.
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Network(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

impl From<TransportError> for DriveError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(msg) => DriveError::Network(NetworkError::Timeout(msg)),
            TransportError::Network(msg) | TransportError::Http(msg) => {
                DriveError::Network(NetworkError::ConnectionFailed(msg))
            }
        }
    }
}
