//! Client configuration: server address, auth and retry backoff.

use std::time::Duration;

use sectorwars_logic::constants::STATS_REFRESH_SECS;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/api/v1/admin";
pub const SERVER_ENV: &str = "SECTORWARS_SERVER";
pub const TOKEN_ENV: &str = "SECTORWARS_TOKEN";

/// Connection settings plus the doubling backoff state used for read retries.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Admin API base URL; endpoint paths are appended to it.
    pub server_url: String,
    /// Sent as a bearer token when set.
    pub token: Option<String>,
    pub timeout_secs: u64,
    /// Interval between `GET /galaxy` statistics refreshes.
    pub refresh_secs: u64,
    /// Current delay before the next retry (seconds).
    pub retry_delay: f32,
    pub retry_attempts: u32,
    pub max_retry_delay: f32,
    /// Retries per read before falling back.
    pub max_retries: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            token: None,
            timeout_secs: 30,
            refresh_secs: STATS_REFRESH_SECS,
            retry_delay: 1.0,
            retry_attempts: 0,
            max_retry_delay: 30.0,
            max_retries: 3,
        }
    }
}

impl ClientConfig {
    /// Parse from the environment and process arguments.
    /// Usage: `--server <url>` / `-s <url>`, `--token <t>`, `--timeout <secs>`, `--refresh <secs>`
    pub fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::parse(&args, |key| std::env::var(key).ok())
    }

    /// Environment values first, then arguments override them.
    /// `args[0]` is the program name and is skipped.
    pub fn parse(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = env(SERVER_ENV) {
            config.server_url = url;
        }
        if let Some(token) = env(TOKEN_ENV) {
            config.token = Some(token);
        }

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--server" | "-s" if i + 1 < args.len() => {
                    config.server_url = args[i + 1].clone();
                    i += 1;
                }
                "--token" if i + 1 < args.len() => {
                    config.token = Some(args[i + 1].clone());
                    i += 1;
                }
                "--timeout" if i + 1 < args.len() => {
                    match args[i + 1].parse() {
                        Ok(secs) => config.timeout_secs = secs,
                        Err(_) => log::warn!("ignoring invalid --timeout '{}'", args[i + 1]),
                    }
                    i += 1;
                }
                "--refresh" if i + 1 < args.len() => {
                    match args[i + 1].parse() {
                        Ok(secs) => config.refresh_secs = secs,
                        Err(_) => log::warn!("ignoring invalid --refresh '{}'", args[i + 1]),
                    }
                    i += 1;
                }
                _ => {}
            }
            i += 1;
        }
        config.server_url = config.server_url.trim_end_matches('/').to_string();
        config
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(1))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs_f32(self.retry_delay)
    }

    pub fn retries_exhausted(&self) -> bool {
        self.retry_attempts >= self.max_retries
    }

    /// Reset backoff after a successful request.
    pub fn reset_backoff(&mut self) {
        self.retry_delay = 1.0;
        self.retry_attempts = 0;
    }

    /// Advance backoff after a failed attempt (doubles delay, capped at max).
    pub fn advance_backoff(&mut self) {
        self.retry_attempts += 1;
        self.retry_delay = (self.retry_delay * 2.0).min(self.max_retry_delay);
    }
}
