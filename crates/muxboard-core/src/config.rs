//! Configuration module
//!
//! Configuration is read from the environment (and a `.env` file when present)
//! once at startup. Provider credentials and the webhook signing secret are
//! optional here: the receiver fails closed per request when the secret is
//! missing, and provider calls report a configuration error.

use std::env;
use std::str::FromStr;

// Common constants
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MUX_API_BASE_URL: &str = "https://api.mux.com";
const DEFAULT_ASSET_LIST_LIMIT: u32 = 10;
const DEFAULT_MAX_WEBHOOK_BODY_BYTES: usize = 1024 * 1024;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_STATUS_UPDATE_TIMEOUT_MS: u64 = 2000;
const DEFAULT_STATUS_UPDATE_MAX_RETRIES: u32 = 5;
const DEFAULT_STATUS_UPDATE_RETRY_BASE_MS: u64 = 500;
const DEFAULT_STATUS_UPDATE_QUEUE_CAPACITY: usize = 1024;

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub request_timeout_secs: u64,
    pub max_webhook_body_bytes: usize,
    pub asset_list_limit: u32,
    /// "compact" (default) or "json"
    pub log_format: String,
}

/// Video provider credentials and webhook verification settings
#[derive(Clone, Debug)]
pub struct MuxConfig {
    pub token_id: Option<String>,
    pub token_secret: Option<String>,
    pub webhook_secret: Option<String>,
    pub api_base_url: String,
    pub upload_cors_origin: String,
    /// Maximum age of a signature timestamp; `None` accepts any timestamp.
    pub webhook_tolerance_secs: Option<u64>,
    pub timeout_secs: u64,
}

/// Status persistence timeout and retry settings
#[derive(Clone, Debug)]
pub struct StatusUpdateConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_base_ms: u64,
    pub queue_capacity: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub mux: MuxConfig,
    pub status_updates: StatusUpdateConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base: BaseConfig {
                server_port: DEFAULT_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                max_webhook_body_bytes: DEFAULT_MAX_WEBHOOK_BODY_BYTES,
                asset_list_limit: DEFAULT_ASSET_LIST_LIMIT,
                log_format: "compact".to_string(),
            },
            mux: MuxConfig {
                token_id: None,
                token_secret: None,
                webhook_secret: None,
                api_base_url: DEFAULT_MUX_API_BASE_URL.to_string(),
                upload_cors_origin: "*".to_string(),
                webhook_tolerance_secs: None,
                timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
            },
            status_updates: StatusUpdateConfig {
                timeout_ms: DEFAULT_STATUS_UPDATE_TIMEOUT_MS,
                max_retries: DEFAULT_STATUS_UPDATE_MAX_RETRIES,
                retry_base_ms: DEFAULT_STATUS_UPDATE_RETRY_BASE_MS,
                queue_capacity: DEFAULT_STATUS_UPDATE_QUEUE_CAPACITY,
            },
        }
    }
}

/// Read an optional, non-empty environment variable.
fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, anyhow::Error> {
    match env_opt(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let environment = env_opt("ENVIRONMENT")
            .or_else(|| env_opt("APP_ENV"))
            .unwrap_or(defaults.base.environment);

        let cors_origins = env_opt("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: env_parse("PORT", defaults.base.server_port)?,
            cors_origins,
            environment,
            request_timeout_secs: env_parse(
                "REQUEST_TIMEOUT_SECS",
                defaults.base.request_timeout_secs,
            )?,
            max_webhook_body_bytes: env_parse(
                "MAX_WEBHOOK_BODY_BYTES",
                defaults.base.max_webhook_body_bytes,
            )?,
            asset_list_limit: env_parse("ASSET_LIST_LIMIT", defaults.base.asset_list_limit)?,
            log_format: env_opt("LOG_FORMAT")
                .map(|f| f.to_lowercase())
                .unwrap_or(defaults.base.log_format),
        };

        let webhook_tolerance_secs = match env_opt("MUX_WEBHOOK_TOLERANCE_SECS") {
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
                anyhow::anyhow!("MUX_WEBHOOK_TOLERANCE_SECS has an invalid value: {}", raw)
            })?),
            None => None,
        };

        let mux = MuxConfig {
            token_id: env_opt("MUX_TOKEN_ID"),
            token_secret: env_opt("MUX_TOKEN_SECRET"),
            webhook_secret: env_opt("MUX_WEBHOOK_SECRET").or_else(|| env_opt("MUX_SIGNING_SECRET")),
            api_base_url: env_opt("MUX_API_BASE_URL")
                .unwrap_or(defaults.mux.api_base_url)
                .trim_end_matches('/')
                .to_string(),
            upload_cors_origin: env_opt("MUX_UPLOAD_CORS_ORIGIN")
                .unwrap_or(defaults.mux.upload_cors_origin),
            webhook_tolerance_secs,
            timeout_secs: env_parse("PROVIDER_TIMEOUT_SECS", defaults.mux.timeout_secs)?,
        };

        let status_updates = StatusUpdateConfig {
            timeout_ms: env_parse(
                "STATUS_UPDATE_TIMEOUT_MS",
                defaults.status_updates.timeout_ms,
            )?,
            max_retries: env_parse(
                "STATUS_UPDATE_MAX_RETRIES",
                defaults.status_updates.max_retries,
            )?,
            retry_base_ms: env_parse(
                "STATUS_UPDATE_RETRY_BASE_MS",
                defaults.status_updates.retry_base_ms,
            )?,
            queue_capacity: env_parse(
                "STATUS_UPDATE_QUEUE_CAPACITY",
                defaults.status_updates.queue_capacity,
            )?,
        };

        Ok(Config {
            base,
            mux,
            status_updates,
        })
    }

    /// Fail fast on values that would make the server unusable.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.max_webhook_body_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_WEBHOOK_BODY_BYTES must be greater than 0"));
        }
        if self.base.asset_list_limit == 0 || self.base.asset_list_limit > 100 {
            return Err(anyhow::anyhow!("ASSET_LIST_LIMIT must be between 1 and 100"));
        }
        if self.base.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be greater than 0"));
        }
        if !self.mux.api_base_url.starts_with("http://")
            && !self.mux.api_base_url.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "MUX_API_BASE_URL must be an http(s) URL, got: {}",
                self.mux.api_base_url
            ));
        }
        if self.mux.timeout_secs == 0 {
            return Err(anyhow::anyhow!("PROVIDER_TIMEOUT_SECS must be greater than 0"));
        }
        if self.status_updates.timeout_ms == 0 {
            return Err(anyhow::anyhow!("STATUS_UPDATE_TIMEOUT_MS must be greater than 0"));
        }
        if self.status_updates.queue_capacity == 0 {
            return Err(anyhow::anyhow!(
                "STATUS_UPDATE_QUEUE_CAPACITY must be greater than 0"
            ));
        }
        if self.base.log_format != "compact" && self.base.log_format != "json" {
            return Err(anyhow::anyhow!(
                "LOG_FORMAT must be 'compact' or 'json', got: {}",
                self.base.log_format
            ));
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn has_provider_credentials(&self) -> bool {
        self.mux.token_id.is_some() && self.mux.token_secret.is_some()
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        self.mux.webhook_secret.as_deref()
    }
}
