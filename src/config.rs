//! Runtime configuration
//!
//! Every setting is a flag with an environment fallback, so `.env` files and
//! container env both work without code changes.

use crate::auth::jwt::DEFAULT_TTL_SECS;
use crate::payments::stripe::DEFAULT_API_BASE;
use clap::Parser;

/// Signing key used when `ACCESS_TOKEN_SECRET` is unset. Local development only.
pub const DEV_TOKEN_SECRET: &str = "dev-secret-change-in-production-minimum-32-characters";

#[derive(Parser, Debug, Clone)]
#[command(name = "bistro")]
#[command(about = "Bistro Boss restaurant backend - menu, carts, checkout and admin reports")]
pub struct Config {
    /// HTTP listen port
    #[arg(long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Path to the SQLite document store
    #[arg(long, env = "DB_PATH", default_value = "bistro.db")]
    pub db_path: String,

    /// HMAC secret for access tokens
    #[arg(long, env = "ACCESS_TOKEN_SECRET", default_value = DEV_TOKEN_SECRET, hide_default_value = true)]
    pub access_token_secret: String,

    /// Access token lifetime in seconds
    #[arg(long, env = "TOKEN_TTL_SECS", default_value_t = DEFAULT_TTL_SECS)]
    pub token_ttl_secs: i64,

    /// Payment processor secret key; intents fail until it is set
    #[arg(long, env = "PAYMENT_SECRET_KEY", hide_env_values = true)]
    pub payment_secret_key: Option<String>,

    /// Payment processor API base URL
    #[arg(long, env = "PAYMENT_API_BASE", default_value = DEFAULT_API_BASE)]
    pub payment_api_base: String,

    /// Promote (or create) this user as admin at startup when no admin exists
    #[arg(long, env = "BOOTSTRAP_ADMIN_EMAIL")]
    pub bootstrap_admin_email: Option<String>,
}

impl Config {
    pub fn uses_dev_secret(&self) -> bool {
        self.access_token_secret == DEV_TOKEN_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["bistro"]).unwrap();
        assert_eq!(config.token_ttl_secs, DEFAULT_TTL_SECS);
        assert_eq!(config.payment_api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_flags_override() {
        let config = Config::try_parse_from([
            "bistro",
            "--port",
            "8080",
            "--access-token-secret",
            "s3cret",
            "--bootstrap-admin-email",
            "owner@bistro.test",
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert!(!config.uses_dev_secret());
        assert_eq!(
            config.bootstrap_admin_email.as_deref(),
            Some("owner@bistro.test")
        );
    }
}
