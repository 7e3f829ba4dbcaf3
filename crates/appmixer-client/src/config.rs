//! Client configuration.

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for an Appmixer API.
///
/// The [`Debug`] impl redacts the password so configs can be logged safely.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g. `https://api.appmixer.example`).
    pub api_url: String,

    /// Email used for authentication.
    pub email: String,

    /// Password used for authentication.
    pub password: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    /// Create a config with the default timeout.
    pub fn new(
        api_url: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            email: email.into(),
            password: password.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `APPMIXER_API_URL`, `APPMIXER_EMAIL`, `APPMIXER_PASSWORD` and
    /// the optional `APPMIXER_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// Lets tests supply variables without touching the process environment.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let api_url = reader("APPMIXER_API_URL")
            .map_err(|_| ConfigError::MissingVar("APPMIXER_API_URL".into()))?;
        let email =
            reader("APPMIXER_EMAIL").map_err(|_| ConfigError::MissingVar("APPMIXER_EMAIL".into()))?;
        let password = reader("APPMIXER_PASSWORD")
            .map_err(|_| ConfigError::MissingVar("APPMIXER_PASSWORD".into()))?;

        let timeout_secs = match reader("APPMIXER_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidValue("APPMIXER_TIMEOUT_SECS".into(), e.to_string())
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let config = Self {
            api_url,
            email,
            password,
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that all required values are present and well formed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::MissingVar("APPMIXER_API_URL".into()));
        }
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "APPMIXER_API_URL".into(),
                format!("'{}' is not an http(s) URL", self.api_url),
            ));
        }
        if self.email.trim().is_empty() {
            return Err(ConfigError::MissingVar("APPMIXER_EMAIL".into()));
        }
        if self.password.is_empty() {
            return Err(ConfigError::MissingVar("APPMIXER_PASSWORD".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "APPMIXER_TIMEOUT_SECS".into(),
                "must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required configuration value: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
