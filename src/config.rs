use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing::Level;

const DEV_JWT_SECRET: &str = "accupay-dev-secret-change-me";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub jwt_secret: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,
    /// When false, token payloads are trusted without checking the signature.
    pub verify_token_signature: bool,
    pub auth_cookie: String,
    pub cookie_secure: bool,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub data_dir: Option<PathBuf>,
    pub log_dir: String,
    pub log_level: Level,

    pub demo_password: String,
    pub simulated_latency_ms: u64,

    /// Overrides the default always-public paths of the access gate.
    pub public_routes: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8080".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            access_token_ttl: 86_400, // 24h
            refresh_token_ttl: 604_800, // 7 days
            verify_token_signature: true,
            auth_cookie: "accupay_token".to_string(),
            cookie_secure: false,
            rate_login_per_min: 60,
            rate_refresh_per_min: 30,
            rate_protected_per_min: 1000,
            data_dir: None,
            log_dir: "logs".to_string(),
            log_level: Level::DEBUG,
            demo_password: "password123".to_string(),
            simulated_latency_ms: 0,
            public_routes: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let defaults = Self::default();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, falling back to the development secret");
            defaults.jwt_secret.clone()
        });

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or(defaults.server_addr),
            jwt_secret,
            access_token_ttl: env_or("ACCESS_TOKEN_TTL", defaults.access_token_ttl)?,
            refresh_token_ttl: env_or("REFRESH_TOKEN_TTL", defaults.refresh_token_ttl)?,
            verify_token_signature: env_or(
                "VERIFY_TOKEN_SIGNATURE",
                defaults.verify_token_signature,
            )?,
            auth_cookie: env::var("AUTH_COOKIE").unwrap_or(defaults.auth_cookie),
            cookie_secure: env_or("COOKIE_SECURE", defaults.cookie_secure)?,

            rate_login_per_min: env_or("RATE_LOGIN_PER_MIN", defaults.rate_login_per_min)?,
            rate_refresh_per_min: env_or("RATE_REFRESH_PER_MIN", defaults.rate_refresh_per_min)?,
            rate_protected_per_min: env_or(
                "RATE_PROTECTED_PER_MIN",
                defaults.rate_protected_per_min,
            )?,

            data_dir: env::var("DATA_DIR")
                .ok()
                .filter(|d| !d.trim().is_empty())
                .map(PathBuf::from),
            log_dir: env::var("LOG_DIR").unwrap_or(defaults.log_dir),
            log_level: env_or("LOG_LEVEL", defaults.log_level)?,

            demo_password: env::var("DEMO_PASSWORD").unwrap_or(defaults.demo_password),
            simulated_latency_ms: env_or("SIMULATED_LATENCY_MS", defaults.simulated_latency_ms)?,

            public_routes: env::var("PUBLIC_ROUTES").ok().map(|raw| split_list(&raw)),
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
