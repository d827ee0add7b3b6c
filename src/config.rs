use std::net::SocketAddr;

use anyhow::{Context, Result};

use crate::fetch::DEFAULT_SITE_DOMAIN;
use crate::scoring::{DEFAULT_API_URL, DEFAULT_MODEL};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Service configuration loaded from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct Config {
    /// Completion API credential. The server starts without it, but `/score` refuses to run.
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub site_domain: String,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let bind_addr = non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(Config {
            api_key: non_empty("DEEPSEEK_API_KEY"),
            api_url: non_empty("DEEPSEEK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            model: non_empty("DEEPSEEK_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            site_domain: non_empty("HH_SITE_DOMAIN")
                .unwrap_or_else(|| DEFAULT_SITE_DOMAIN.to_string()),
            bind_addr: bind_addr
                .parse()
                .with_context(|| format!("BIND_ADDR must be a socket address, got '{bind_addr}'"))?,
        })
    }
}
