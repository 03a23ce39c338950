use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use log::{info, warn};
use url::Url;

use crate::error::{PortalError, Result};

/// Option lists the filter and form selects offer.
#[derive(Debug, Clone)]
pub struct OptionLists {
    pub sort_orders: Vec<&'static str>,
    pub enrollment_statuses: Vec<&'static str>,
    pub course_types: Vec<&'static str>,
    pub review_statuses: Vec<&'static str>,
}

impl Default for OptionLists {
    fn default() -> Self {
        Self {
            sort_orders: vec!["asc", "desc"],
            enrollment_statuses: vec!["pending", "approved", "rejected", "cancelled"],
            course_types: vec!["online", "offline", "recorded"],
            review_statuses: vec!["pending", "published", "hidden"],
        }
    }
}

impl OptionLists {
    pub fn get(&self, name: &str) -> Option<&[&'static str]> {
        match name {
            "sort_orders" => Some(&self.sort_orders),
            "enrollment_statuses" => Some(&self.enrollment_statuses),
            "course_types" => Some(&self.course_types),
            "review_statuses" => Some(&self.review_statuses),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Always ends with `/` so relative endpoint paths join under it.
    pub api_base_url: Url,
    pub request_timeout: Duration,
    pub filter_debounce: Duration,
    pub default_per_page: u32,
    pub cache_ttl: Duration,
    pub session_path: PathBuf,
    pub options: OptionLists,
}

impl AppConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn load() -> Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            info!(".env not loaded: {err}");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_base = lookup("API_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| PortalError::Config("API_BASE_URL is not set".into()))?;

        Ok(Self {
            api_base_url: normalize_base_url(&raw_base)?,
            request_timeout: Duration::from_secs(try_load(&lookup, "REQUEST_TIMEOUT_SECS", 30)?),
            filter_debounce: Duration::from_millis(try_load(&lookup, "FILTER_DEBOUNCE_MS", 500)?),
            default_per_page: try_load(&lookup, "DEFAULT_PER_PAGE", 10)?,
            cache_ttl: Duration::from_secs(try_load(&lookup, "CACHE_TTL_SECS", 60)?),
            session_path: lookup("SESSION_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("session/session.json")),
            options: OptionLists::default(),
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Ok(Url::parse(&with_slash)?)
}

fn try_load<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match lookup(key) {
        None => {
            info!("{key} not set, using default: {default}");
            Ok(default)
        }
        Some(raw) => raw.trim().parse().map_err(|e| {
            warn!("Invalid {key} value: {e}");
            PortalError::Config(format!("invalid {key}: {e}"))
        }),
    }
}
