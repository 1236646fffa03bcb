use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Gateway profile with endpoint, region and optional credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Gateway base URL, e.g. https://abc123.execute-api.us-east-1.amazonaws.com
    pub endpoint: String,

    /// AWS region (default: us-east-1)
    #[serde(default = "default_region")]
    pub region: String,

    /// AWS access key ID. Requests are unsigned when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    /// Session token for temporary credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,

    /// Usage-plan API key sent as x-api-key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// HTTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// TCP keepalive in seconds
    #[serde(default = "default_keepalive")]
    pub keepalive: u64,

    /// Idle pooled connection timeout in seconds
    #[serde(default = "default_pool_idle_timeout")]
    pub pool_idle_timeout: u64,

    /// Maximum idle connections kept per host
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    /// Disable certificate verification
    #[serde(default)]
    pub insecure_tls: bool,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    50
}

fn default_keepalive() -> u64 {
    90
}

fn default_pool_idle_timeout() -> u64 {
    90
}

fn default_pool_max_idle_per_host() -> usize {
    32
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive)
    }

    pub fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            keepalive: default_keepalive(),
            pool_idle_timeout: default_pool_idle_timeout(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            insecure_tls: false,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Named gateway profiles
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,

    /// Transport settings shared by all profiles
    #[serde(default)]
    pub http: HttpConfig,

    /// Profile used when none is named
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a profile by name, or the default profile if not specified
    pub fn get_profile(&self, name: Option<&str>) -> Option<&Profile> {
        if let Some(name) = name {
            self.profiles.get(name)
        } else if let Some(default) = &self.default_profile {
            self.profiles.get(default)
        } else {
            self.profiles.values().next()
        }
    }
}

/// Load configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = std::fs::read_to_string(path.as_ref())
        .context(format!("Failed to read config file: {:?}", path.as_ref()))?;

    let config: Config =
        serde_yaml::from_str(&content).context("Failed to parse YAML configuration")?;

    Ok(config)
}

/// Load configuration from environment variables
///
/// - APIGW_ENDPOINT (required)
/// - AWS_REGION (optional, defaults to us-east-1)
/// - AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY (optional, both or neither)
/// - AWS_SESSION_TOKEN (optional)
/// - APIGW_API_KEY (optional)
/// - APIGW_REQUEST_TIMEOUT, APIGW_INSECURE_TLS (optional)
pub fn load_from_env() -> Result<Config> {
    // Try to load .env file if it exists (don't fail if it doesn't)
    let _ = dotenvy::dotenv();

    let endpoint =
        std::env::var("APIGW_ENDPOINT").context("APIGW_ENDPOINT environment variable not set")?;
    let endpoint = endpoint.trim().to_string();
    if endpoint.is_empty() {
        anyhow::bail!("APIGW_ENDPOINT is empty");
    }

    let region = std::env::var("AWS_REGION").unwrap_or_else(|_| default_region());

    let access_key = std::env::var("AWS_ACCESS_KEY_ID").ok();
    let secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").ok();
    if access_key.is_some() != secret_key.is_some() {
        anyhow::bail!("AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together");
    }

    let profile = Profile {
        endpoint,
        region,
        access_key,
        secret_key,
        session_token: std::env::var("AWS_SESSION_TOKEN").ok(),
        api_key: std::env::var("APIGW_API_KEY").ok(),
    };

    let mut config = Config::new();
    config.profiles.insert("default".to_string(), profile);
    config.default_profile = Some("default".to_string());

    if let Ok(timeout) = std::env::var("APIGW_REQUEST_TIMEOUT") {
        if let Ok(val) = timeout.parse() {
            config.http.request_timeout = val;
        }
    }

    if let Ok(insecure) = std::env::var("APIGW_INSECURE_TLS") {
        config.http.insecure_tls = insecure == "true" || insecure == "1";
    }

    Ok(config)
}

/// Load configuration from file or environment
///
/// Reads the YAML file when a path is given, otherwise falls back to
/// environment variables. A named profile becomes the default profile.
pub fn load_config(config_path: Option<&str>, profile_name: Option<&str>) -> Result<Config> {
    if let Some(path) = config_path {
        let mut config = load_from_yaml(path)?;

        if let Some(name) = profile_name {
            if !config.profiles.contains_key(name) {
                anyhow::bail!("Profile '{}' not found in config file", name);
            }
            config.default_profile = Some(name.to_string());
        }

        Ok(config)
    } else {
        load_from_env()
    }
}
