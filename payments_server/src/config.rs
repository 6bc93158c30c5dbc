use std::{env, fmt::Display, str::FromStr};

use chrono::Duration;
use log::*;
use payments_common::{
    helpers::{parse_boolean_flag, parse_optional},
    Secret,
};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::errors::ServerError;

const DEFAULT_PAY_HOST: &str = "127.0.0.1";
const DEFAULT_PAY_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/payments.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_TOKEN_LIFETIME_HRS: i64 = 12;
const RANDOM_SECRET_LENGTH: usize = 64;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The maximum number of connections in the database pool.
    pub max_connections: u32,
    pub auth: AuthConfig,
    /// If true, requests to `/v1/payments` are not checked for a bearer token. **DANGER**
    pub disable_auth: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PAY_HOST.to_string(),
            port: DEFAULT_PAY_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            auth: AuthConfig::default(),
            disable_auth: false,
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Invalid values are logged and replaced with their
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String> {
        let host = lookup("PAY_HOST").unwrap_or_else(|| DEFAULT_PAY_HOST.into());
        let port = parse_or_default("PAY_PORT", lookup("PAY_PORT"), DEFAULT_PAY_PORT);
        let database_url = lookup("PAY_DATABASE_URL").unwrap_or_else(|| {
            info!("🪛️ PAY_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_connections =
            parse_or_default("PAY_DB_MAX_CONNECTIONS", lookup("PAY_DB_MAX_CONNECTIONS"), DEFAULT_MAX_CONNECTIONS);
        let max_connections = if max_connections > 0 {
            max_connections
        } else {
            warn!("🪛️ PAY_DB_MAX_CONNECTIONS must be at least 1. Using a single connection.");
            1
        };
        let auth = AuthConfig::try_from_lookup(&lookup).unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let disable_auth = parse_boolean_flag(lookup("PAY_DISABLE_AUTH"), false);
        if disable_auth {
            warn!("🚨️ PAY_DISABLE_AUTH is set. Payment routes are open to anyone. DO NOT run production like this.");
        }
        Self { host, port, database_url, max_connections, auth, disable_auth }
    }
}

fn parse_or_default<T>(name: &str, value: Option<String>, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match parse_optional::<T>(value) {
        Ok(Some(v)) => v,
        Ok(None) => default,
        Err(e) => {
            error!("🪛️ Invalid value for {name}. {e} Using the default, {default}, instead.");
            default
        },
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The shared secret used to sign and verify HS256 access tokens.
    pub jwt_secret: Secret<String>,
    /// How long an access token stays valid after it is issued.
    pub token_lifetime: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session. Every token \
             issued will be invalid after a restart. DO NOT operate on production like this. Set PAY_JWT_SECRET \
             instead. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(RANDOM_SECRET_LENGTH).map(char::from).collect();
        Self { jwt_secret: Secret::new(secret), token_lifetime: Duration::hours(DEFAULT_TOKEN_LIFETIME_HRS) }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S, token_lifetime: Duration) -> Self {
        Self { jwt_secret: Secret::new(secret.into()), token_lifetime }
    }

    fn try_from_lookup<F>(lookup: &F) -> Result<Self, ServerError>
    where F: Fn(&str) -> Option<String> {
        let secret = lookup("PAY_JWT_SECRET")
            .ok_or_else(|| ServerError::ConfigurationError("PAY_JWT_SECRET is not set".into()))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("PAY_JWT_SECRET is empty".into()));
        }
        let hours =
            parse_or_default("PAY_TOKEN_LIFETIME_HRS", lookup("PAY_TOKEN_LIFETIME_HRS"), DEFAULT_TOKEN_LIFETIME_HRS);
        let hours = if hours > 0 {
            hours
        } else {
            warn!("🪛️ PAY_TOKEN_LIFETIME_HRS must be positive. Using {DEFAULT_TOKEN_LIFETIME_HRS} hrs.");
            DEFAULT_TOKEN_LIFETIME_HRS
        };
        Ok(Self::new(secret, Duration::hours(hours)))
    }
}
