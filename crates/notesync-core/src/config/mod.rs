//! Service endpoint configuration.
//!
//! Provides a `ServiceConfig` describing where the note service lives and how
//! payloads are encoded. Defaults target the public service; any value can be
//! overridden from `NOTESYNC_*` environment variables.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::non_blank;

const ENV_SCHEME: &str = "NOTESYNC_SCHEME";
const ENV_HOST: &str = "NOTESYNC_HOST";
const ENV_LOGIN_PATH: &str = "NOTESYNC_LOGIN_PATH";
const ENV_NOTE_PATH: &str = "NOTESYNC_NOTE_PATH";
const ENV_INDEX_PATH: &str = "NOTESYNC_INDEX_PATH";
const ENV_DELETE_PATH: &str = "NOTESYNC_DELETE_PATH";
const ENV_SEARCH_PATH: &str = "NOTESYNC_SEARCH_PATH";
const ENV_ENCODING: &str = "NOTESYNC_ENCODING";
const ENV_TIMEOUT_SECS: &str = "NOTESYNC_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How note payloads travel over the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireEncoding {
    /// Plain JSON bodies and content.
    #[default]
    Json,
    /// Legacy contract: POST bodies are base64-wrapped and fetched content is
    /// base64-encoded.
    Base64,
}

impl std::str::FromStr for WireEncoding {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "base64" => Ok(Self::Base64),
            other => Err(Error::Config(format!(
                "{ENV_ENCODING} must be 'json' or 'base64', got '{other}'"
            ))),
        }
    }
}

/// Endpoints and transport settings for the note service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub scheme: String,
    pub host: String,
    pub login_path: String,
    pub note_path: String,
    pub index_path: String,
    pub delete_path: String,
    pub search_path: String,
    pub encoding: WireEncoding,
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            host: "app.simplenote.com".to_string(),
            login_path: "/api/login".to_string(),
            note_path: "/api2/data".to_string(),
            index_path: "/api2/index".to_string(),
            delete_path: "/api2/data".to_string(),
            search_path: "/api/search".to_string(),
            encoding: WireEncoding::Json,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables over the defaults.
    pub fn from_env() -> Result<Self> {
        parse_config(|key| env::var(key).ok())
    }

    /// Base URL without path, e.g. `https://app.simplenote.com`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// Check scheme, host, and paths; paths are normalized to start with `/`.
    pub fn validated(mut self) -> Result<Self> {
        self.scheme = self.scheme.trim().to_ascii_lowercase();
        if self.scheme != "http" && self.scheme != "https" {
            return Err(Error::Config(format!(
                "scheme must be http or https, got '{}'",
                self.scheme
            )));
        }

        self.host = self.host.trim().trim_end_matches('/').to_string();
        if self.host.is_empty() {
            return Err(Error::Config("host must not be empty".to_string()));
        }
        if self.host.contains("://") {
            return Err(Error::Config(
                "host must not include a scheme; set it separately".to_string(),
            ));
        }

        for (name, path) in [
            ("login_path", &mut self.login_path),
            ("note_path", &mut self.note_path),
            ("index_path", &mut self.index_path),
            ("delete_path", &mut self.delete_path),
            ("search_path", &mut self.search_path),
        ] {
            *path = normalize_path(name, path)?;
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }

        Ok(self)
    }
}

fn parse_config(lookup: impl Fn(&str) -> Option<String>) -> Result<ServiceConfig> {
    let read = |key: &str| non_blank(lookup(key));
    let mut config = ServiceConfig::default();

    if let Some(scheme) = read(ENV_SCHEME) {
        config.scheme = scheme;
    }
    if let Some(host) = read(ENV_HOST) {
        config.host = host;
    }
    if let Some(path) = read(ENV_LOGIN_PATH) {
        config.login_path = path;
    }
    if let Some(path) = read(ENV_NOTE_PATH) {
        config.note_path = path;
    }
    if let Some(path) = read(ENV_INDEX_PATH) {
        config.index_path = path;
    }
    if let Some(path) = read(ENV_DELETE_PATH) {
        config.delete_path = path;
    }
    if let Some(path) = read(ENV_SEARCH_PATH) {
        config.search_path = path;
    }
    if let Some(encoding) = read(ENV_ENCODING) {
        config.encoding = encoding.parse()?;
    }
    if let Some(raw) = read(ENV_TIMEOUT_SECS) {
        let secs = raw.parse::<u64>().map_err(|_| {
            Error::Config(format!(
                "{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"
            ))
        })?;
        config.request_timeout = Duration::from_secs(secs);
    }

    config.validated()
}

fn normalize_path(name: &str, raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Config(format!("{name} must not be empty")));
    }
    if trimmed.starts_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("/{trimmed}"))
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
