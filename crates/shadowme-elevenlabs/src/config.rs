//! Public configuration for the ElevenLabs client.

use std::time::Duration;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io/v1";

/// Configuration for the ElevenLabs client.
///
/// # Example
///
/// ```
/// use shadowme_elevenlabs::ElevenLabsConfig;
/// use std::time::Duration;
///
/// let config = ElevenLabsConfig::new()
///     .with_api_key("sk_test")
///     .with_timeout(Duration::from_secs(15));
/// assert!(config.has_api_key());
/// ```
#[derive(Clone)]
pub struct ElevenLabsConfig {
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
    pub(crate) user_agent: String,
    pub(crate) timeout: Duration,
}

impl std::fmt::Debug for ElevenLabsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.masked_api_key())
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            user_agent: concat!("shadowme-elevenlabs/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ElevenLabsConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API root. Defaults to [`DEFAULT_BASE_URL`].
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set an optional API key. Blank keys count as absent.
    #[must_use]
    pub fn with_optional_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the HTTP request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The first eight characters of the key followed by `...`.
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_ref().map(|key| {
            let prefix: String = key.chars().take(8).collect();
            format!("{prefix}...")
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
