//! Application-level configuration loading, including gameplay timings.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "KEY_QUEST_BACK_CONFIG_PATH";

/// Default content service base URL.
const DEFAULT_CONTENT_BASE_URL: &str = "http://localhost:4000";
/// Seconds a disconnected host may return before a temporary host takes over.
const DEFAULT_GRACE_PERIOD_SECS: u64 = 120;
/// Seconds allotted to timed challenges (trivia, riddle, charade).
const DEFAULT_TIMED_CHALLENGE_SECS: u64 = 60;
/// Seconds allotted to plain dares.
const DEFAULT_PLAIN_CHALLENGE_SECS: u64 = 10;
/// Seconds between a trivia answer and the outcome reveal.
const DEFAULT_TRIVIA_REVEAL_DELAY_SECS: u64 = 3;
/// Room capacity applied when a room is created without one.
const DEFAULT_MAX_PLAYERS: usize = 6;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    content_base_url: String,
    grace_period: Duration,
    timed_challenge: Duration,
    plain_challenge: Duration,
    trivia_reveal_delay: Duration,
    default_max_players: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration from file");
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Base URL of the challenge content service.
    pub fn content_base_url(&self) -> &str {
        &self.content_base_url
    }

    /// How long a disconnected host may return before promotion.
    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Deadline applied to trivia, riddle and charade challenges.
    pub fn timed_challenge(&self) -> Duration {
        self.timed_challenge
    }

    /// Deadline applied to plain dares.
    pub fn plain_challenge(&self) -> Duration {
        self.plain_challenge
    }

    /// Delay between a trivia answer and the outcome reveal.
    pub fn trivia_reveal_delay(&self) -> Duration {
        self.trivia_reveal_delay
    }

    /// Room capacity applied when a creation request omits one.
    pub fn default_max_players(&self) -> usize {
        self.default_max_players
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            content_base_url: DEFAULT_CONTENT_BASE_URL.to_owned(),
            grace_period: Duration::from_secs(DEFAULT_GRACE_PERIOD_SECS),
            timed_challenge: Duration::from_secs(DEFAULT_TIMED_CHALLENGE_SECS),
            plain_challenge: Duration::from_secs(DEFAULT_PLAIN_CHALLENGE_SECS),
            trivia_reveal_delay: Duration::from_secs(DEFAULT_TRIVIA_REVEAL_DELAY_SECS),
            default_max_players: DEFAULT_MAX_PLAYERS,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    content_base_url: Option<String>,
    grace_period_secs: Option<u64>,
    timed_challenge_secs: Option<u64>,
    plain_challenge_secs: Option<u64>,
    trivia_reveal_delay_secs: Option<u64>,
    default_max_players: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            content_base_url: value
                .content_base_url
                .unwrap_or(defaults.content_base_url),
            grace_period: value
                .grace_period_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.grace_period),
            timed_challenge: value
                .timed_challenge_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timed_challenge),
            plain_challenge: value
                .plain_challenge_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.plain_challenge),
            trivia_reveal_delay: value
                .trivia_reveal_delay_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.trivia_reveal_delay),
            default_max_players: value
                .default_max_players
                .unwrap_or(defaults.default_max_players),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
