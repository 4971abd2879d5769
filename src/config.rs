//! Environment configuration, read once at cold start.

use anyhow::{Context, Result};

/// Default HTTP path prefix in front of procedure paths (`/trpc/hello.greet`)
pub const DEFAULT_PATH_PREFIX: &str = "/trpc/";

/// Default clock skew tolerated on the token `exp` claim, in seconds
pub const DEFAULT_JWT_LEEWAY_SECS: u64 = 60;

/// Token verification settings for the interceptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// HS256 secret. Without one, claims are decoded unverified and the
    /// gateway authorizer is trusted to have checked the signature.
    pub jwt_secret: Option<String>,
    pub jwt_audience: Option<String>,
    pub jwt_leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_audience: None,
            jwt_leeway_secs: DEFAULT_JWT_LEEWAY_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub auth: AuthConfig,
    pub path_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if `AUTH_JWT_LEEWAY_SECS` is not an unsigned integer.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let jwt_leeway_secs = get("AUTH_JWT_LEEWAY_SECS")
            .map(|raw| {
                raw.parse::<u64>().with_context(|| {
                    format!("AUTH_JWT_LEEWAY_SECS must be a number of seconds, got {raw:?}")
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_JWT_LEEWAY_SECS);

        Ok(Self {
            auth: AuthConfig {
                jwt_secret: get("AUTH_JWT_SECRET"),
                jwt_audience: get("AUTH_JWT_AUDIENCE"),
                jwt_leeway_secs,
            },
            path_prefix: get("PROCEDURE_PATH_PREFIX")
                .unwrap_or_else(|| DEFAULT_PATH_PREFIX.to_string()),
        })
    }
}
