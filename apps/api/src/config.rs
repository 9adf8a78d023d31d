use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub hospital: HospitalInfo,
}

/// Hospital identity printed in the leaflet header and footer. All parts optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalInfo {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl HospitalInfo {
    /// True when any identity field is set; the header only shows the pharmacy block then.
    pub fn is_configured(&self) -> bool {
        self.name.is_some() || self.phone.is_some() || self.email.is_some()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            hospital: HospitalInfo {
                name: optional_env("HOSPITAL_NAME"),
                phone: optional_env("HOSPITAL_PHONE"),
                email: optional_env("HOSPITAL_EMAIL"),
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    non_blank(std::env::var(key).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
