//! Google Drive PDF Deploy
//!
//! A thin client over the Google Drive v3 REST API and the Google OAuth2 token
//! endpoint, built for publishing versioned PDF documents into Drive folders.
//!
//! # Features
//!
//! - **Token exchange**: Trade a long-lived refresh token for an access token
//! - **Version check**: Detect whether a folder already holds a given version, using
//!   the file description as the version label
//! - **Upload**: Multipart upload of a local file into a folder
//! - **Deploy**: Archive or delete the live version, upload the new one through a
//!   temporary folder, restrict its sharing and move it into place
//!
//! # Example
//!
//! ```no_run
//! use integrations_drive_deploy::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = DriveDeployClient::from_env()?;
//!
//! let token = client
//!     .token_exchanger(OAuthCredentials::from_env()?)
//!     .exchange()
//!     .await?;
//!
//! let request = DeployRequest::new("handbook", "v2.1", "temp-id", "final-id", "./build")
//!     .with_archive_folder("archive-id");
//!
//! match client.deploy().deploy_pdf(&token, &request).await? {
//!     DeployOutcome::AlreadyDeployed { file_id } => println!("up to date: {}", file_id),
//!     DeployOutcome::Deployed { file_id, .. } => println!("deployed: {}", file_id),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod client;
pub mod config;
pub mod deploy;
pub mod errors;
pub mod services;
pub mod transport;
pub mod types;

#[cfg(test)]
mod mocks;

pub use auth::{AccessToken, OAuthCredentials, TokenExchanger};
pub use client::DriveDeployClient;
pub use config::{DriveConfig, DriveConfigBuilder};
pub use deploy::{BestEffort, DeployOutcome, DeployRequest, DeployWorkflow, PreviousVersion};
pub use errors::{DeployStage, DriveError, DriveResult};
pub use types::DriveFileRecord;

/// Prelude module with commonly used types.
///
/// ```no_run
/// use integrations_drive_deploy::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::DriveDeployClient;

    pub use crate::config::{DriveConfig, DriveConfigBuilder};

    pub use crate::auth::{AccessToken, OAuthCredentials, TokenExchanger};

    pub use crate::services::{QueryService, UploadService};

    pub use crate::deploy::{
        BestEffort, DeployOutcome, DeployRequest, DeployWorkflow, PreviousVersion,
    };

    pub use crate::types::DriveFileRecord;

    pub use crate::errors::{DeployStage, DriveError, DriveResult};
}
