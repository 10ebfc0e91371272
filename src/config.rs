use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_INTERPRETER: &str = "python3";
pub const DEFAULT_SCRIPT: &str = "query.py";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub resolver: ResolverConfig,
}

/// Where the link resolver lives and how to run it.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub interpreter: PathBuf,
    /// Directory holding the script. Also the working directory of the process.
    pub script_dir: PathBuf,
    pub script: String,
    /// `None` waits for the resolver forever.
    pub timeout: Option<Duration>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            interpreter: PathBuf::from(DEFAULT_INTERPRETER),
            script_dir: PathBuf::from("."),
            script: DEFAULT_SCRIPT.to_string(),
            timeout: None,
        }
    }
}

impl ResolverConfig {
    pub fn script_path(&self) -> PathBuf {
        self.script_dir.join(&self.script)
    }
}

impl Config {
    /// Reads the process environment, loading `.env` first if present.
    pub fn from_env() -> Result<Config> {
        dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_or_default =
            |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let port = match var("DELVE_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("DELVE_PORT is not a valid port: {raw}"))?,
            None => DEFAULT_PORT,
        };

        let timeout = match var("RESOLVER_TIMEOUT_SECS") {
            Some(raw) => parse_timeout_secs(&raw)
                .with_context(|| format!("RESOLVER_TIMEOUT_SECS is not a number: {raw}"))?,
            None => None,
        };

        let config = Config {
            host: get_or_default("DELVE_HOST", DEFAULT_HOST),
            port,
            resolver: ResolverConfig {
                interpreter: PathBuf::from(get_or_default(
                    "RESOLVER_INTERPRETER",
                    DEFAULT_INTERPRETER,
                )),
                script_dir: PathBuf::from(get_or_default("RESOLVER_SCRIPT_DIR", ".")),
                script: get_or_default("RESOLVER_SCRIPT", DEFAULT_SCRIPT),
                timeout,
            },
        };

        if !config.resolver.script_path().exists() {
            log::warn!(
                "resolver script not found at {}, queries will fail until it exists",
                config.resolver.script_path().display()
            );
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

/// `0` disables the timeout.
pub fn parse_timeout_secs(raw: &str) -> Result<Option<Duration>, std::num::ParseIntError> {
    let secs = raw.trim().parse::<u64>()?;
    Ok((secs > 0).then_some(Duration::from_secs(secs)))
}
