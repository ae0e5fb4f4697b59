//! Portal Configuration
//! Mission: Read server settings from flags or environment and refuse unsafe ones at startup

use crate::{
    auth::password::{BCRYPT_MAX_COST, BCRYPT_MIN_COST},
    db::PoolConfig,
    middleware::RateLimitConfig,
};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser};
use std::{net::SocketAddr, path::PathBuf, time::Duration};

/// Minimum signing-secret length accepted without `--allow-weak-secret`
pub const MIN_SECRET_LEN: usize = 32;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";

#[derive(Args, Debug, Clone)]
pub struct PortalConfig {
    /// SQLite credential store
    #[arg(long, env = "DATABASE_PATH", default_value = "./campus_portal.db")]
    pub database_path: PathBuf,

    /// Maximum pooled database connections
    #[arg(long, env = "DB_POOL_SIZE", default_value = "10")]
    pub db_pool_size: usize,

    /// How long a request waits for a free connection
    #[arg(long, env = "DB_POOL_TIMEOUT_MS", default_value = "5000")]
    pub db_pool_timeout_ms: u64,

    /// Token signing secret
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Accept a signing secret shorter than 32 characters (local development)
    #[arg(long)]
    pub allow_weak_secret: bool,

    /// Allowed cross-origin caller; cross-origin requests are refused when unset
    #[arg(long, env = "CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// bcrypt cost for newly hashed passwords
    #[arg(long, env = "BCRYPT_COST", default_value = "10")]
    pub bcrypt_cost: u32,

    /// Login attempts allowed per client IP per minute
    #[arg(long, env = "LOGIN_RATE_LIMIT_PER_MIN", default_value = "20")]
    pub login_rate_limit_per_min: u32,

    /// Take the login client IP from X-Forwarded-For. Enable only behind a
    /// reverse proxy that sets it; otherwise all proxied callers share one bucket.
    #[arg(long, env = "TRUST_FORWARDED_FOR")]
    pub trust_forwarded_for: bool,
}

#[derive(Parser)]
struct EnvOnly {
    #[command(flatten)]
    config: PortalConfig,
}

impl PortalConfig {
    /// Settings from the environment alone, with defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        let parsed = EnvOnly::try_parse_from(["campus-portal"])
            .context("Invalid portal configuration in environment")?;
        Ok(parsed.config)
    }

    /// Fail fast on settings the server must not start with.
    pub fn validate(&self) -> Result<()> {
        self.jwt_secret()?;

        if self.db_pool_size == 0 {
            bail!("DB_POOL_SIZE must be at least 1");
        }
        if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&self.bcrypt_cost) {
            bail!(
                "BCRYPT_COST must be between {} and {}",
                BCRYPT_MIN_COST,
                BCRYPT_MAX_COST
            );
        }
        if self.login_rate_limit_per_min == 0 {
            bail!("LOGIN_RATE_LIMIT_PER_MIN must be at least 1");
        }

        self.listen_addr()?;
        Ok(())
    }

    /// The signing secret, if present and long enough.
    pub fn jwt_secret(&self) -> Result<&str> {
        let secret = self
            .jwt_secret
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .context("JWT_SECRET must be set (try `campus-portal generate-secret`)")?;

        if secret.len() < MIN_SECRET_LEN && !self.allow_weak_secret {
            bail!(
                "JWT_SECRET is {} characters; at least {} are required",
                secret.len(),
                MIN_SECRET_LEN
            );
        }

        Ok(secret)
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            max_size: self.db_pool_size,
            acquire_timeout: Duration::from_millis(self.db_pool_timeout_ms),
        }
    }

    pub fn database_path(&self) -> Result<&str> {
        self.database_path
            .to_str()
            .context("DATABASE_PATH is not valid UTF-8")
    }

    pub fn login_rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig::per_minute(self.login_rate_limit_per_min)
            .trusting_forwarded_for(self.trust_forwarded_for)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

/// Base URL a client uses to reach the portal API (`API_BASE_URL`).
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: PortalConfig,
    }

    fn parse(args: &[&str]) -> PortalConfig {
        let mut argv = vec!["campus-portal"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).unwrap().config
    }

    const STRONG: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_secret_required() {
        let mut config = parse(&["--jwt-secret", STRONG]);
        assert!(config.validate().is_ok());

        config.jwt_secret = None;
        assert!(config.validate().is_err());

        config.jwt_secret = Some("   ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_short_secret_rejected_unless_allowed() {
        let config = parse(&["--jwt-secret", "short"]);
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("at least 32"));

        let config = parse(&["--jwt-secret", "short", "--allow-weak-secret"]);
        assert_eq!(config.jwt_secret().unwrap(), "short");
    }

    #[test]
    fn test_pool_settings() {
        let config = parse(&[
            "--jwt-secret",
            STRONG,
            "--db-pool-size",
            "3",
            "--db-pool-timeout-ms",
            "250",
        ]);
        let pool = config.pool_config();
        assert_eq!(pool.max_size, 3);
        assert_eq!(pool.acquire_timeout, Duration::from_millis(250));

        let config = parse(&["--jwt-secret", STRONG, "--db-pool-size", "0"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        let config = parse(&["--jwt-secret", STRONG, "--bcrypt-cost", "2"]);
        assert!(config.validate().is_err());

        let config = parse(&["--jwt-secret", STRONG, "--bcrypt-cost", "32"]);
        assert!(config.validate().is_err());

        for cost in [BCRYPT_MIN_COST, 10, BCRYPT_MAX_COST] {
            let config = parse(&["--jwt-secret", STRONG, "--bcrypt-cost", &cost.to_string()]);
            assert!(config.validate().is_ok(), "cost {}", cost);
        }
    }

    #[test]
    fn test_login_rate_limit_settings() {
        let config = parse(&["--jwt-secret", STRONG]);
        let limit = config.login_rate_limit();
        assert_eq!(limit.max_requests, 20);
        assert!(!limit.trust_forwarded_for);

        let config = parse(&[
            "--jwt-secret",
            STRONG,
            "--login-rate-limit-per-min",
            "5",
            "--trust-forwarded-for",
        ]);
        let limit = config.login_rate_limit();
        assert_eq!(limit.max_requests, 5);
        assert!(limit.trust_forwarded_for);
    }

    #[test]
    fn test_listen_addr() {
        let config = parse(&["--jwt-secret", STRONG, "--host", "127.0.0.1", "--port", "8080"]);
        assert_eq!(config.listen_addr().unwrap().port(), 8080);
    }
}
