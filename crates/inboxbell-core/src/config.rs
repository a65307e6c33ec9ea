//! Runtime configuration.
//!
//! Everything is read once at startup into an immutable [`Config`] that is
//! passed to the components that need it. Values come from the process
//! environment, optionally seeded from a dotenv-style file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::credentials::{self, CredentialResult};
use crate::notify::{DEFAULT_DEEP_LINK_BASE, DEFAULT_MAX_BODY_CHARS, NotificationStyle};
use crate::{Error, Result};

/// Environment variable naming the dotenv file to load.
pub const CONFIG_FILE_ENV: &str = "INBOXBELL_CONFIG";

/// Dotenv file loaded when [`CONFIG_FILE_ENV`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "config/notify.config";

/// Default polling interval.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Variables that may be resolved from the system keyring.
pub const SECRET_KEYS: [&str; 2] = ["REDDIT_PASSWORD", "HOMEASSISTANT_API_KEY"];

/// Reddit account and app credentials.
#[derive(Clone)]
pub struct RedditConfig {
    /// Script app client ID.
    pub client_id: String,
    /// Script app client secret.
    pub client_secret: String,
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
    /// Base32 TOTP secret when the account uses two-factor auth.
    pub totp_secret: Option<String>,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl std::fmt::Debug for RedditConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedditConfig")
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("two_factor", &self.totp_secret.is_some())
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

/// Home Assistant hub connection.
#[derive(Clone)]
pub struct HubConfig {
    /// Base URL, e.g. `http://homeassistant.local:8123`.
    pub base_url: Url,
    /// Long-lived access token.
    pub token: String,
    /// Notify service name, e.g. `mobile_app_pixel`.
    pub target: String,
}

impl std::fmt::Debug for HubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubConfig")
            .field("base_url", &self.base_url.as_str())
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl HubConfig {
    /// URL of the notify service for the configured target.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL is invalid.
    pub fn service_url(&self) -> Result<Url> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(&format!("api/services/notify/{}", self.target))
            .map_err(|e| Error::Config(format!("invalid hub URL: {e}")))
    }
}

/// Retry policy for authentication failures within one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per cycle, including the first.
    pub max_attempts: u32,
    /// Fixed delay between attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

/// Poll loop settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Sleep between cycles.
    pub refresh_interval: Duration,
    /// Auth retry policy.
    pub retry: RetryPolicy,
    /// Notification presentation.
    pub style: NotificationStyle,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            retry: RetryPolicy::default(),
            style: NotificationStyle::default(),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Reddit credentials.
    pub reddit: RedditConfig,
    /// Notification hub.
    pub hub: HubConfig,
    /// Poll loop settings.
    pub poll: PollConfig,
    /// Seen ledger file.
    pub ledger_path: PathBuf,
}

impl Config {
    /// Loads configuration from the environment.
    ///
    /// The dotenv file named by `INBOXBELL_CONFIG` (default
    /// `config/notify.config`) is loaded first if it exists; variables
    /// already set in the environment take precedence. Missing secrets fall
    /// back to the system keyring.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the file is malformed or a required
    /// variable is missing or invalid, and [`Error::Credential`] if the
    /// keyring has to be consulted and cannot be read.
    pub fn from_env() -> Result<Self> {
        let file = std::env::var(CONFIG_FILE_ENV)
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from);
        load_env_file(&file)?;

        Self::from_sources(|key| std::env::var(key).ok(), credentials::get_secret)
    }

    /// Builds configuration from a key lookup, resolving secrets the lookup
    /// lacks through `keyring`.
    ///
    /// The keyring is only consulted for [`SECRET_KEYS`] that are missing or
    /// blank.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Credential`] if a keyring read fails, otherwise as
    /// [`Config::from_lookup`].
    pub fn from_sources<F, K>(lookup: F, keyring: K) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
        K: Fn(&str) -> CredentialResult<Option<String>>,
    {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut secrets = HashMap::new();
        for key in SECRET_KEYS {
            if present(key).is_some() {
                continue;
            }
            if let Some(secret) = keyring(key)? {
                debug!("Using {key} from keyring");
                secrets.insert(key, secret);
            }
        }

        Self::from_lookup(|key| present(key).or_else(|| secrets.get(key).cloned()))
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required key is missing or a value is
    /// invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &str| get(key).ok_or_else(|| Error::Config(format!("{key} is not set")));

        let username = require("REDDIT_USERNAME")?;
        let reddit = RedditConfig {
            client_id: require("REDDIT_CLIENT_ID")?,
            client_secret: require("REDDIT_CLIENT_SECRET")?,
            password: require("REDDIT_PASSWORD")?,
            totp_secret: get("REDDIT_2FA_KEY"),
            user_agent: get("REDDIT_USER_AGENT").unwrap_or_else(|| default_user_agent(&username)),
            username,
        };

        let base_url = require("HOMEASSISTANT_URL")?;
        let hub = HubConfig {
            base_url: Url::parse(&base_url)
                .map_err(|e| Error::Config(format!("HOMEASSISTANT_URL is invalid: {e}")))?,
            token: require("HOMEASSISTANT_API_KEY")?,
            target: require("NOTIFICATION_TARGET")?,
        };

        let refresh_interval = match get("REFRESH_INTERVAL") {
            Some(raw) => parse_interval(&raw)?,
            None => DEFAULT_REFRESH_INTERVAL,
        };

        let poll = PollConfig {
            refresh_interval,
            retry: RetryPolicy::default(),
            style: NotificationStyle {
                icon_url: get("APOLLO_ICON_URL"),
                deep_link_base: get("DEEP_LINK_BASE")
                    .unwrap_or_else(|| DEFAULT_DEEP_LINK_BASE.to_string()),
                max_body_chars: DEFAULT_MAX_BODY_CHARS,
            },
        };

        let ledger_path = get("SEEN_LEDGER_PATH").map_or_else(default_ledger_path, PathBuf::from);

        Ok(Self {
            reddit,
            hub,
            poll,
            ledger_path,
        })
    }
}

/// Loads a dotenv file into the process environment if it exists.
fn load_env_file(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => {
            debug!("Loaded environment from {}", path.display());
            Ok(())
        }
        Err(e) if e.not_found() => {
            debug!("No config file at {}", path.display());
            Ok(())
        }
        Err(e) => Err(Error::Config(format!(
            "failed to read {}: {e}",
            path.display()
        ))),
    }
}

fn parse_interval(raw: &str) -> Result<Duration> {
    match raw.parse::<u64>() {
        Ok(0) => Err(Error::Config("REFRESH_INTERVAL must be greater than 0".into())),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(Error::Config(format!(
            "REFRESH_INTERVAL must be a number of seconds: {e}"
        ))),
    }
}

fn default_user_agent(username: &str) -> String {
    format!(
        "{}:inboxbell:{} (by /u/{username})",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    )
}

fn default_ledger_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("inboxbell")
        .join("reddit_seen")
}
