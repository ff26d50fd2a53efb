use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_DESIGN_PATH: &str = "./design";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost:3000,http://localhost:3002,http://design-viewer:3000";

/// Runtime settings, read from the environment (and a `.env` file if present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    pub design_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            design_path: PathBuf::from(DEFAULT_DESIGN_PATH),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: split_origins(DEFAULT_CORS_ORIGINS),
        }
    }
}

impl ViewerConfig {
    /// Loads `.env` (if any), then reads `DESIGN_PATH`, `HOST`, `PORT` and
    /// `CORS_ORIGINS`.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e).context("reading .env");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ViewerConfig::from_env`] but with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got {raw:?}"))?,
            None => defaults.port,
        };
        Ok(Self {
            design_path: lookup("DESIGN_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.design_path),
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            cors_origins: lookup("CORS_ORIGINS")
                .map(|raw| split_origins(&raw))
                .unwrap_or(defaults.cors_origins),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
