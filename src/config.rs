use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_UPLOAD_DIR: &str = "data/uploads";
const DEFAULT_PROCESSING_STEP_MS: u64 = 800;

/// Runtime configuration, read from the process environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub admin_password: String,
    pub session_key: Option<String>,
    pub upload_dir: PathBuf,
    pub public_base_url: String,
    pub processing_step: Duration,
    pub topic_filter: bool,
    pub cookie_secure: bool,
}

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} must be set"),
            ConfigError::Invalid { key, value } => write!(f, "{key} has an invalid value: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    /// Load `.env` if present, then read the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                log::warn!("Could not read .env file: {e}");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let admin_password = match get("ADMIN_PASSWORD") {
            Some(p) => p,
            None => {
                log::warn!("No ADMIN_PASSWORD set, falling back to the default admin password");
                DEFAULT_ADMIN_PASSWORD.to_string()
            }
        };

        let public_base_url = get("PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{bind_addr}"))
            .trim_end_matches('/')
            .to_string();

        let processing_step = match get("PROCESSING_STEP_MS") {
            Some(raw) => {
                let ms = raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                    key: "PROCESSING_STEP_MS",
                    value: raw.clone(),
                })?;
                Duration::from_millis(ms)
            }
            None => Duration::from_millis(DEFAULT_PROCESSING_STEP_MS),
        };

        Ok(AppConfig {
            database_url,
            bind_addr,
            admin_password,
            session_key: get("SESSION_KEY"),
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            public_base_url,
            processing_step,
            topic_filter: parse_flag("CAREER_TOPIC_FILTER", get("CAREER_TOPIC_FILTER"))?,
            cookie_secure: parse_flag("COOKIE_SECURE", get("COOKIE_SECURE"))?,
        })
    }
}

fn parse_flag(key: &'static str, raw: Option<String>) -> Result<bool, ConfigError> {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(ConfigError::Invalid { key, value: v }),
    }
}
