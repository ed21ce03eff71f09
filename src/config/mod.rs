//! Configuration for the Drive deploy client.

use crate::errors::{ConfigurationError, DriveError, DriveResult};
use std::time::Duration;
use url::Url;

/// Default Drive API base URL.
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v3/";

/// Default Drive upload base URL.
pub const DEFAULT_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/";

/// Default Google OAuth2 token URL.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Configuration for the Drive deploy client.
#[derive(Debug, Clone)]
pub struct DriveConfig {
    /// Base URL for metadata calls (search, patch, delete).
    pub base_url: Url,

    /// Base URL for media uploads.
    pub upload_url: Url,

    /// OAuth2 token endpoint.
    pub token_url: Url,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// User agent string.
    pub user_agent: String,

    /// Whether deploys restrict copying and resharing of the uploaded file.
    pub restrict_sharing: bool,
}

impl DriveConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> DriveConfigBuilder {
        DriveConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DRIVE_BASE_URL` (optional): Drive metadata endpoint
    /// - `DRIVE_UPLOAD_URL` (optional): Drive upload endpoint
    /// - `DRIVE_TOKEN_URL` (optional): OAuth2 token endpoint
    /// - `DRIVE_TIMEOUT` (optional): Request timeout in seconds
    /// - `DRIVE_RESTRICT_SHARING` (optional): `false` or `0` disables sharing restrictions
    pub fn from_env() -> DriveResult<Self> {
        let mut builder = DriveConfigBuilder::new();

        if let Ok(url) = std::env::var("DRIVE_BASE_URL") {
            builder = builder.base_url(url);
        }
        if let Ok(url) = std::env::var("DRIVE_UPLOAD_URL") {
            builder = builder.upload_url(url);
        }
        if let Ok(url) = std::env::var("DRIVE_TOKEN_URL") {
            builder = builder.token_url(url);
        }
        if let Ok(timeout_str) = std::env::var("DRIVE_TIMEOUT") {
            let secs = timeout_str.parse::<u64>().map_err(|_| {
                DriveError::configuration(format!("DRIVE_TIMEOUT is not a number: {}", timeout_str))
            })?;
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Ok(flag) = std::env::var("DRIVE_RESTRICT_SHARING") {
            let disabled = matches!(flag.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no");
            builder = builder.restrict_sharing(!disabled);
        }

        builder.build()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> DriveResult<()> {
        for (name, url) in [
            ("Base URL", &self.base_url),
            ("Upload URL", &self.upload_url),
            ("Token URL", &self.token_url),
        ] {
            validate_scheme(name, url)?;
        }

        if self.timeout.is_zero() {
            return Err(DriveError::configuration("Timeout must be non-zero"));
        }

        Ok(())
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("valid default base URL"),
            upload_url: Url::parse(DEFAULT_UPLOAD_URL).expect("valid default upload URL"),
            token_url: Url::parse(DEFAULT_TOKEN_URL).expect("valid default token URL"),
            timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(30),
            user_agent: default_user_agent(),
            restrict_sharing: true,
        }
    }
}

fn default_user_agent() -> String {
    format!("integrations-drive-deploy/{}", env!("CARGO_PKG_VERSION"))
}

// Plain http is only accepted for loopback hosts (local mock servers).
fn validate_scheme(name: &str, url: &Url) -> DriveResult<()> {
    match url.scheme() {
        "https" => Ok(()),
        "http" if matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]")) => Ok(()),
        _ => Err(DriveError::Configuration(
            ConfigurationError::InvalidConfiguration(format!("{} must use HTTPS: {}", name, url)),
        )),
    }
}

fn parse_url(name: &str, raw: &str, as_base: bool) -> DriveResult<Url> {
    let mut url = Url::parse(raw)
        .map_err(|e| DriveError::configuration(format!("Invalid {} '{}': {}", name, raw, e)))?;

    // Url::join replaces the last path segment unless the base ends with '/'.
    if as_base && !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Builder for DriveConfig.
pub struct DriveConfigBuilder {
    base_url: Option<String>,
    upload_url: Option<String>,
    token_url: Option<String>,
    timeout: Duration,
    connect_timeout: Duration,
    user_agent: Option<String>,
    restrict_sharing: bool,
}

impl DriveConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            upload_url: None,
            token_url: None,
            timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(30),
            user_agent: None,
            restrict_sharing: true,
        }
    }

    /// Sets the Drive metadata base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the Drive upload base URL.
    pub fn upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = Some(url.into());
        self
    }

    /// Sets the OAuth2 token URL.
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Enables or disables the sharing-restriction patch after upload.
    pub fn restrict_sharing(mut self, enabled: bool) -> Self {
        self.restrict_sharing = enabled;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> DriveResult<DriveConfig> {
        let base_url = parse_url(
            "base URL",
            self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
            true,
        )?;
        let upload_url = parse_url(
            "upload URL",
            self.upload_url.as_deref().unwrap_or(DEFAULT_UPLOAD_URL),
            true,
        )?;
        let token_url = parse_url(
            "token URL",
            self.token_url.as_deref().unwrap_or(DEFAULT_TOKEN_URL),
            false,
        )?;

        let config = DriveConfig {
            base_url,
            upload_url,
            token_url,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
            restrict_sharing: self.restrict_sharing,
        };

        config.validate()?;

        Ok(config)
    }
}

impl Default for DriveConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
