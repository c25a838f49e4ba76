//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Session token configuration.
    pub jwt: JwtConfig,
    /// Email configuration.
    #[serde(default)]
    pub email: EmailConfig,
    /// Tier to module entitlement overrides.
    #[serde(default)]
    pub entitlement: EntitlementConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Session token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Session token lifetime in minutes.
    #[serde(default = "default_session_expiry")]
    pub session_expires_minutes: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            session_expires_minutes: default_session_expiry(),
        }
    }
}

fn default_session_expiry() -> i64 {
    480 // 8 hours
}

/// SMTP configuration for outgoing notifications.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// When false, notifications are only logged.
    #[serde(default = "default_email_enabled")]
    pub enabled: bool,
    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: String,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: String,
    /// Sender address.
    #[serde(default = "default_from_email")]
    pub from_email: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Frontend base URL used in links.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: default_email_enabled(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
            frontend_url: default_frontend_url(),
        }
    }
}

fn default_email_enabled() -> bool {
    true
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    1025
}

fn default_from_email() -> String {
    "no-reply@backoffice.local".to_string()
}

fn default_from_name() -> String {
    "Backoffice".to_string()
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

/// Overrides for the tier to module-type map.
///
/// Empty lists mean the built-in defaults apply.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntitlementConfig {
    /// Module types granted regardless of tier.
    #[serde(default)]
    pub required_modules: Vec<String>,
    /// Module types introduced at each tier, in ascending tier order.
    #[serde(default)]
    pub tiers: Vec<TierModulesConfig>,
}

impl EntitlementConfig {
    /// Returns true when no override is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required_modules.is_empty() && self.tiers.is_empty()
    }
}

/// Module types introduced by a single tier.
#[derive(Debug, Clone, Deserialize)]
pub struct TierModulesConfig {
    /// Tier name (`free`, `seed`, `grow`, `pro`, `enterprise`).
    pub tier: String,
    /// Module types first granted at this tier.
    #[serde(default)]
    pub modules: Vec<String>,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("BACKOFFICE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
