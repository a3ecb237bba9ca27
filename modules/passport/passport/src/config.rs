//! Configuration for the passport module.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Smallest accepted session signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("session.secret must be at least {MIN_SECRET_LEN} bytes")]
    WeakSessionSecret,
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PassportConfig {
    pub magic_link: MagicLinkConfig,
    pub session: SessionConfig,
    pub rate_limit: RateLimitConfig,
    pub tenancy: TenancyConfig,
    pub cleanup: CleanupConfig,
}

impl PassportConfig {
    /// # Errors
    /// Returns `ConfigError` when a value would make the module unsafe or unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.secret.expose_secret().len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakSessionSecret);
        }
        if self.magic_link.max_generation_attempts == 0 {
            return Err(ConfigError::Zero {
                field: "magic_link.max_generation_attempts",
            });
        }
        if self.magic_link.ttl.is_zero() {
            return Err(ConfigError::Zero {
                field: "magic_link.ttl",
            });
        }
        if self.rate_limit.max_attempts == 0 {
            return Err(ConfigError::Zero {
                field: "rate_limit.max_attempts",
            });
        }
        if self.rate_limit.window.is_zero() {
            return Err(ConfigError::Zero {
                field: "rate_limit.window",
            });
        }
        if self.tenancy.default_seat_limit <= 0 {
            return Err(ConfigError::Zero {
                field: "tenancy.default_seat_limit",
            });
        }
        if self.cleanup.interval.is_zero() {
            return Err(ConfigError::Zero {
                field: "cleanup.interval",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct MagicLinkConfig {
    /// How long an issued code stays redeemable.
    #[serde(with = "humantime_duration")]
    pub ttl: Duration,
    /// Upper bound on candidate draws before issuance gives up.
    pub max_generation_attempts: u32,
    /// Echo issued codes in issuance responses. Development only.
    pub reveal_codes: bool,
}

impl Default for MagicLinkConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(15 * 60),
            max_generation_attempts: 10,
            reveal_codes: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SessionConfig {
    /// HMAC key for session tokens.
    pub secret: SecretString,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub user_agent_max_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: SecretString::from(String::new()),
            cookie_name: "session_token".to_owned(),
            cookie_secure: true,
            user_agent_max_len: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RateLimitConfig {
    /// Attempts allowed per client key and endpoint within one window.
    pub max_attempts: u32,
    #[serde(with = "humantime_duration")]
    pub window: Duration,
    /// Take the client key from the first `X-Forwarded-For` hop.
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            window: Duration::from_secs(3 * 60),
            trust_forwarded_for: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TenancyConfig {
    #[serde(with = "humantime_duration")]
    pub trial_period: Duration,
    pub default_seat_limit: i32,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            trial_period: Duration::from_secs(14 * 24 * 60 * 60),
            default_seat_limit: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CleanupConfig {
    /// Period of the in-process sweep; external schedulers may call it too.
    #[serde(with = "humantime_duration")]
    pub interval: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
        }
    }
}

/// Serde adapter reading durations as humantime strings (`"15m"`, `"14days"`).
pub mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, de};

    /// # Errors
    /// Fails when the value is not a string humantime can parse.
    pub fn deserialize<'de, D>(d: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw).map_err(de::Error::custom)
    }
}
