//! Configuration module for the meme game backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key guarding the content admin routes
    pub admin_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Optional JSON file with memes, captions and associations to load at startup
    pub seed_path: Option<PathBuf>,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Minutes of inactivity before a session expires
    pub session_ttl_minutes: i64,
    /// Whether the session cookie carries the `Secure` attribute
    pub cookie_secure: bool,
    /// Origin allowed to make credentialed cross-origin requests
    pub cors_origin: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let admin_psk = env::var("MEME_ADMIN_PSK").ok();

        let db_path = env::var("MEME_DB_PATH")
            .unwrap_or_else(|_| "./data/meme.sqlite".to_string())
            .into();

        let seed_path = env::var("MEME_SEED_PATH").ok().map(PathBuf::from);

        let bind_addr = env::var("MEME_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3001".to_string())
            .parse()
            .expect("Invalid MEME_BIND_ADDR format");

        let log_level = env::var("MEME_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let session_ttl_minutes = env::var("MEME_SESSION_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|m: &i64| *m > 0)
            .unwrap_or(60);

        let cookie_secure = env::var("MEME_COOKIE_SECURE")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let cors_origin = env::var("MEME_CORS_ORIGIN").ok();

        Self {
            admin_psk,
            db_path,
            seed_path,
            bind_addr,
            log_level,
            session_ttl_minutes,
            cookie_secure,
            cors_origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("MEME_ADMIN_PSK");
        env::remove_var("MEME_DB_PATH");
        env::remove_var("MEME_SEED_PATH");
        env::remove_var("MEME_BIND_ADDR");
        env::remove_var("MEME_LOG_LEVEL");
        env::remove_var("MEME_SESSION_TTL_MINUTES");
        env::remove_var("MEME_COOKIE_SECURE");
        env::remove_var("MEME_CORS_ORIGIN");

        let config = Config::from_env();

        assert!(config.admin_psk.is_none());
        assert!(config.seed_path.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/meme.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3001");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.session_ttl_minutes, 60);
        assert!(!config.cookie_secure);
        assert!(config.cors_origin.is_none());
    }
}
