use std::env;

/// Application-level constants
pub const APP_NAME: &str = "GlowMetrics";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_ASSISTANT_ID: &str = "asst_Ghy8XTQEhfpjV7eWoTP1WXKw";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Dev frontends always allowed by CORS.
const DEV_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

/// Default `tracing` filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,glowmetrics=debug"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Runtime settings read from the environment.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// `None` is allowed at startup; analysis requests then fail.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub assistant_id: String,
    pub frontend_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub http_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            assistant_id: DEFAULT_ASSISTANT_ID.to_string(),
            frontend_url: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl ServiceConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            openai_api_key: var("open_ai_token").or_else(|| var("OPENAI_API_KEY")),
            openai_base_url: var("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_base_url),
            assistant_id: var("ASSISTANT_ID").unwrap_or(defaults.assistant_id),
            frontend_url: var("FRONTEND_URL"),
            host: var("HOST").unwrap_or(defaults.host),
            port: parse_var(var("PORT"), "PORT", defaults.port)?,
            http_timeout_secs: parse_var(
                var("HTTP_TIMEOUT_SECS"),
                "HTTP_TIMEOUT_SECS",
                defaults.http_timeout_secs,
            )?,
        })
    }

    /// Origins allowed to call the API from a browser.
    pub fn cors_origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = DEV_ORIGINS.iter().map(|o| o.to_string()).collect();
        if let Some(frontend) = &self.frontend_url {
            if !origins.contains(frontend) {
                origins.push(frontend.clone());
            }
        }
        origins
    }
}

fn parse_var<T>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: format!("{value:?}: {e}"),
        }),
        None => Ok(default),
    }
}
