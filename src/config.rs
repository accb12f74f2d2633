//! # Configuration Management
//!
//! Configuration is read from environment variables, with a `.env` file
//! picked up for local development.
//!
//! ## Environment Variables
//! - `HOST`: Server bind address (default: 127.0.0.1)
//! - `PORT`: Server port (default: 3000)
//! - `RP_ID`: WebAuthn Relying Party ID (usually your domain)
//! - `RP_ORIGIN`: WebAuthn Relying Party Origin (full URL)
//! - `RP_NAME`: Human-readable name for your service
//! - `CHALLENGE_TTL_SECS`: How long an issued challenge stays valid
//! - `SESSION_STORE`: `memory` or a `sqlite:` connection string
//! - `SESSION_SECURE_COOKIE`: Set the `Secure` flag on the session cookie
//! - `STATIC_DIR`: Directory holding the browser frontend

use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Where session data (challenges, credentials) is kept between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionBackend {
    /// Process memory. Everything is lost on restart.
    Memory,
    /// SQLite database, e.g. `sqlite:sessions.db?mode=rwc`.
    Sqlite(String),
}

impl FromStr for SessionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("memory") {
            Ok(SessionBackend::Memory)
        } else if s.starts_with("sqlite:") {
            Ok(SessionBackend::Sqlite(s.to_string()))
        } else {
            bail!("unsupported SESSION_STORE '{}': expected 'memory' or a sqlite: URL", s)
        }
    }
}

/// Application configuration
///
/// ## WebAuthn Terminology
/// - **RP (Relying Party)**: This service, which relies on the authenticator
/// - **RP ID**: Your domain name (e.g., "example.com" or "localhost")
/// - **RP Origin**: Full URL of the frontend (e.g., "https://example.com")
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host/IP address to bind to
    pub host: String,

    /// Server port number
    pub port: u16,

    /// WebAuthn Relying Party ID, without protocol or port
    pub rp_id: String,

    /// WebAuthn Relying Party Origin, including the protocol
    pub rp_origin: String,

    /// Shown to users during passkey creation
    pub rp_name: String,

    /// Validity window of an issued challenge. Also sent to the browser as
    /// the ceremony timeout.
    pub challenge_ttl: Duration,

    pub session_backend: SessionBackend,

    /// Mark the session cookie `Secure`. Needs HTTPS.
    pub secure_cookie: bool,

    pub static_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            rp_id: "localhost".to_string(),
            rp_origin: "http://localhost:3000".to_string(),
            rp_name: "Anonymous Service".to_string(),
            challenge_ttl: Duration::from_secs(60),
            session_backend: SessionBackend::Memory,
            secure_cookie: false,
            static_dir: "public".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to [`Config::default`]. Values that are set
    /// but fail to parse are reported as errors rather than ignored.
    ///
    /// ## Example .env file
    /// ```text
    /// HOST=127.0.0.1
    /// PORT=3000
    /// RP_ID=localhost
    /// RP_ORIGIN=http://localhost:3000
    /// RP_NAME=Anonymous Service
    /// CHALLENGE_TTL_SECS=60
    /// SESSION_STORE=sqlite:sessions.db?mode=rwc
    /// ```
    pub fn from_env() -> Result<Self> {
        // dotenvy doesn't error if the file is missing
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let port = match env::var("PORT") {
            Ok(v) => v.parse().with_context(|| format!("invalid PORT '{}'", v))?,
            Err(_) => defaults.port,
        };

        let challenge_ttl = match env::var("CHALLENGE_TTL_SECS") {
            Ok(v) => Duration::from_secs(
                v.parse()
                    .with_context(|| format!("invalid CHALLENGE_TTL_SECS '{}'", v))?,
            ),
            Err(_) => defaults.challenge_ttl,
        };

        let session_backend = match env::var("SESSION_STORE") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.session_backend,
        };

        let secure_cookie = match env::var("SESSION_SECURE_COOKIE") {
            Ok(v) => parse_flag(&v)
                .with_context(|| format!("invalid SESSION_SECURE_COOKIE '{}'", v))?,
            Err(_) => defaults.secure_cookie,
        };

        let config = Config {
            host: env::var("HOST").unwrap_or(defaults.host),
            port,
            rp_id: env::var("RP_ID").unwrap_or(defaults.rp_id),
            rp_origin: env::var("RP_ORIGIN").unwrap_or(defaults.rp_origin),
            rp_name: env::var("RP_NAME").unwrap_or(defaults.rp_name),
            challenge_ttl,
            session_backend,
            secure_cookie,
            static_dir: env::var("STATIC_DIR").unwrap_or(defaults.static_dir),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but can't be used
    ///
    /// The challenge TTL is sent to the browser as a `u32` millisecond
    /// timeout, so it must fit in one.
    pub fn validate(&self) -> Result<()> {
        if u32::try_from(self.challenge_ttl.as_millis()).is_err() {
            bail!(
                "CHALLENGE_TTL_SECS {} is too large: at most {} seconds",
                self.challenge_ttl.as_secs(),
                u32::MAX / 1000
            );
        }
        Ok(())
    }

    /// Combines host and port for `tokio::net::TcpListener::bind()`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got '{}'", other),
    }
}
