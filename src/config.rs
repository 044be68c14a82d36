// src/config.rs

use anyhow::{bail, Context, Result};
use chrono::Duration;
use serde::Deserialize;
use std::{
    env, fs,
    io::ErrorKind,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
};

pub const CONFIG_PATH_VAR: &str = "COURSECAST_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "coursecast.yaml";
/// Longest session lifetime accepted, one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Service configuration: YAML file first, then environment overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Directory holding the master dataset and raw uploads.
    pub data_dir: PathBuf,
    pub master_file: String,
    pub users_file: PathBuf,
    pub session_ttl_hours: i64,
    pub log_level: String,
    /// Largest accepted upload body, in bytes.
    pub max_upload_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            data_dir: PathBuf::from("data"),
            master_file: "master_dataset.csv".to_string(),
            users_file: PathBuf::from("users.json"),
            session_ttl_hours: 12,
            log_level: "info".to_string(),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load from `$COURSECAST_CONFIG` (or `coursecast.yaml`) and the process environment.
    pub fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = Self::from_file(Path::new(&path))?;
        cfg.apply_overrides(|key| env::var(key).ok())?;
        Ok(cfg)
    }

    /// Parse a YAML file; a missing file gives the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_yaml(&text).with_context(|| format!("parsing {}", path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Self = serde_yaml::from_str(text)?;
        cfg.session_ttl()?;
        Ok(cfg)
    }

    /// Apply `HOST`, `PORT`, `DATA_DIR`, `USERS_FILE`, `LOG_LEVEL`, `SESSION_TTL_HOURS`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("HOST") {
            self.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.port = v.parse().with_context(|| format!("PORT `{}` is not a port number", v))?;
        }
        if let Some(v) = lookup("DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("USERS_FILE") {
            self.users_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = lookup("SESSION_TTL_HOURS") {
            self.session_ttl_hours = v
                .parse()
                .with_context(|| format!("SESSION_TTL_HOURS `{}` is not an integer", v))?;
            self.session_ttl()?;
        }
        Ok(())
    }

    /// Session lifetime; must be between 1 hour and `MAX_SESSION_TTL_HOURS`.
    pub fn session_ttl(&self) -> Result<Duration> {
        let hours = self.session_ttl_hours;
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
            bail!(
                "session_ttl_hours {} is outside 1..={}",
                hours,
                MAX_SESSION_TTL_HOURS
            );
        }
        Duration::try_hours(hours).with_context(|| format!("session_ttl_hours {} overflows", hours))
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("HOST `{}` is not an IP address", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
