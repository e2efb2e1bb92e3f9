use std::{env, fmt::Display, fs::read_to_string, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("{0} is required when SUPABASE_URL is set")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct Supabase {
    pub url: String,
    pub service_key: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub supabase: Option<Supabase>,
    pub items_table: String,
    pub images_bucket: String,
    pub admin_username: String,
    pub admin_password: String,
    pub static_dir: PathBuf,
    pub upstream_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let supabase = match var("SUPABASE_URL") {
            Ok(url) => Some(Supabase {
                url: url.trim_end_matches('/').to_string(),
                service_key: read_secret("SUPABASE_SERVICE_ROLE_KEY")
                    .ok_or(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?,
            }),
            Err(_) => None,
        };

        Ok(Self {
            port: try_load("PORT", "3000")?,
            supabase,
            items_table: try_load("ITEMS_TABLE", "Mhanna-items")?,
            images_bucket: try_load("IMAGES_BUCKET", "mhanna-images")?,
            admin_username: read_secret("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string()),
            admin_password: read_secret("ADMIN_PASSWORD").unwrap_or_else(|| {
                warn!("ADMIN_PASSWORD not set, admin login is disabled");
                String::new()
            }),
            static_dir: try_load("STATIC_DIR", "public")?,
            upstream_timeout: Duration::from_millis(try_load("UPSTREAM_TIMEOUT_MS", "5000")?),
            max_upload_bytes: try_load("MAX_UPLOAD_BYTES", "10485760")?,
        })
    }

    /// In-memory stores, no upstream, fixed credentials.
    pub fn local(admin_username: &str, admin_password: &str) -> Self {
        Self {
            port: 0,
            supabase: None,
            items_table: "Mhanna-items".to_string(),
            images_bucket: "mhanna-images".to_string(),
            admin_username: admin_username.to_string(),
            admin_password: admin_password.to_string(),
            static_dir: PathBuf::from("public"),
            upstream_timeout: Duration::from_secs(5),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key)
        .map(|value| value.trim().to_string())
        .ok()
        .filter(|value| !value.is_empty())
        .ok_or(())
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| {
            warn!("Invalid {key} value: {e}");
            ConfigError::Invalid {
                key,
                reason: e.to_string(),
            }
        })
}

/// Environment first, then the mounted secret file.
fn read_secret(secret_name: &str) -> Option<String> {
    if let Ok(value) = var(secret_name) {
        return Some(value);
    }

    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
        })
        .ok()
        .filter(|s| !s.is_empty())
}
