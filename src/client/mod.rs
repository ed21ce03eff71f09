//! Drive deploy client.

use crate::auth::{OAuthCredentials, TokenExchanger};
use crate::config::DriveConfig;
use crate::deploy::DeployWorkflow;
use crate::errors::{DriveError, DriveResult};
use crate::services::{QueryService, UploadService};
use crate::transport::{HttpTransport, ReqwestTransport};
use std::sync::Arc;

mod executor;
pub use executor::{decode, ensure_success, RequestExecutor};

/// Entry point wiring configuration and transport into the Drive services.
///
/// # Example
///
/// ```no_run
/// use integrations_drive_deploy::{AccessToken, DeployRequest, DriveConfig, DriveDeployClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = DriveDeployClient::new(DriveConfig::default())?;
/// let token = AccessToken::bearer("ya29....");
///
/// let request = DeployRequest::new("handbook", "v1.4.0", "temp-folder", "final-folder", "./out")
///     .with_archive_folder("archive-folder");
///
/// let outcome = client.deploy().deploy_pdf(&token, &request).await?;
/// println!("{:?}", outcome);
/// # Ok(())
/// # }
/// ```
pub struct DriveDeployClient {
    executor: Arc<RequestExecutor>,
}

impl DriveDeployClient {
    /// Creates a client using a reqwest transport built from the configuration.
    pub fn new(config: DriveConfig) -> DriveResult<Self> {
        config.validate()?;

        let transport = ReqwestTransport::from_config(&config).map_err(|e| {
            DriveError::configuration(format!("Failed to create transport: {}", e))
        })?;

        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a client with an explicit transport.
    pub fn with_transport(config: DriveConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            executor: Arc::new(RequestExecutor::new(config, transport)),
        }
    }

    /// Creates a client from `DRIVE_*` environment variables.
    pub fn from_env() -> DriveResult<Self> {
        Self::new(DriveConfig::from_env()?)
    }

    /// Token exchange against the configured token endpoint.
    pub fn token_exchanger(&self, credentials: OAuthCredentials) -> TokenExchanger {
        let config = self.executor.config();
        TokenExchanger::new(
            self.executor.transport().clone(),
            config.token_url.clone(),
            credentials,
        )
        .with_timeout(config.timeout)
        .with_user_agent(config.user_agent.clone())
    }

    /// Access the query service for version lookups.
    pub fn query(&self) -> QueryService {
        QueryService::new(self.executor.clone())
    }

    /// Access the upload service.
    pub fn uploads(&self) -> UploadService {
        UploadService::new(self.executor.clone())
    }

    /// Access the deploy workflow.
    pub fn deploy(&self) -> DeployWorkflow {
        DeployWorkflow::new(self.executor.clone())
    }

    /// Gets the configuration.
    pub fn config(&self) -> &DriveConfig {
        self.executor.config()
    }
}
