//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

pub const DEFAULT_PDF_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";
pub const DEFAULT_PDF_BOLD_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Outgoing mail server settings.
#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

/// TrueType faces embedded into exported PDFs. They must cover every script
/// that summaries are written in.
#[derive(Clone, Debug)]
pub struct PdfFontConfig {
    pub regular: PathBuf,
    pub bold: PathBuf,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub openai_api_key: String,
    pub summary_model: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub smtp: SmtpConfig,
    pub cors_origin: String,
    pub pdf_fonts: PdfFontConfig,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));
        let with_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Load Server and Database Settings ---
        let bind_address_str = with_default("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = required("DATABASE_URL")?;

        let log_level_str = with_default("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- AI provider ---
        let openai_api_key = required("OPENAI_API_KEY")?;
        let summary_model = with_default("SUMMARY_MODEL", "gpt-4o-mini");

        // --- Credentials ---
        let jwt_secret = required("JWT_SECRET")?;
        let ttl_str = with_default("TOKEN_TTL_HOURS", "168");
        let token_ttl_hours = ttl_str
            .parse::<i64>()
            .ok()
            .filter(|h| *h > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "TOKEN_TTL_HOURS".to_string(),
                    format!("'{}' is not a positive number of hours", ttl_str),
                )
            })?;

        // --- SMTP ---
        let port_str = with_default("SMTP_PORT", "587");
        let port = port_str.parse::<u16>().map_err(|e| {
            ConfigError::InvalidValue("SMTP_PORT".to_string(), e.to_string())
        })?;
        let username = required("SMTP_USERNAME")?;
        let smtp = SmtpConfig {
            host: required("SMTP_HOST")?,
            port,
            password: required("SMTP_PASSWORD")?,
            from: lookup("SMTP_FROM").unwrap_or_else(|| username.clone()),
            username,
        };

        let cors_origin = with_default("CORS_ORIGIN", "http://localhost:5173");

        // --- Export ---
        let pdf_fonts = PdfFontConfig {
            regular: PathBuf::from(with_default("PDF_FONT_PATH", DEFAULT_PDF_FONT)),
            bold: PathBuf::from(with_default("PDF_BOLD_FONT_PATH", DEFAULT_PDF_BOLD_FONT)),
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            openai_api_key,
            summary_model,
            jwt_secret,
            token_ttl_hours,
            smtp,
            cors_origin,
            pdf_fonts,
        })
    }
}
