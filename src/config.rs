// src/config.rs

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use dotenvy::dotenv;

/// Which `KvStore` implementation the server runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "sqlite" => Ok(StoreBackend::Sqlite),
            other => Err(format!("unknown STORE_BACKEND '{}', expected memory or sqlite", other)),
        }
    }
}

/// Timing knobs of the sync sessions.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    /// How often clients poll the store.
    pub poll_interval: Duration,
    /// Time allotted to each question.
    pub question_timeout: Duration,
    /// Resolution of the countdown timer.
    pub countdown_tick: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2000),
            question_timeout: Duration::from_secs(20),
            countdown_tick: Duration::from_secs(1),
        }
    }
}

impl Timing {
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            poll_interval: env_parse("POLL_INTERVAL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            question_timeout: env_parse("QUESTION_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.question_timeout),
            countdown_tick: defaults.countdown_tick,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub rust_log: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub lectures_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let bind_addr = env_parse("BIND_ADDR")
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let store_backend = env::var("STORE_BACKEND")
            .ok()
            .and_then(|raw| match raw.parse() {
                Ok(backend) => Some(backend),
                Err(e) => {
                    eprintln!("{}; falling back to memory", e);
                    None
                }
            })
            .unwrap_or(StoreBackend::Memory);

        let database_url = env::var("DATABASE_URL").ok();

        let lectures_dir = env::var("LECTURES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("lectures"));

        Self {
            bind_addr,
            rust_log,
            store_backend,
            database_url,
            lectures_dir,
        }
    }
}

/// Configuration of a teacher or student sync session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Store endpoint, e.g. `http://127.0.0.1:3000/api/quiz`.
    pub endpoint: String,
    /// Directory holding the local durable fallback.
    pub fallback_dir: PathBuf,
    pub timing: Timing,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        dotenv().ok();

        let endpoint = env::var("QUIZ_SYNC_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:3000/api/quiz".to_string());
        let fallback_dir = env::var("QUIZ_FALLBACK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".quizroom"));

        Self {
            endpoint,
            fallback_dir,
            timing: Timing::from_env(),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|raw| raw.parse().ok())
}
