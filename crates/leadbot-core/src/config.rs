use crate::error::{LeadbotError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "leadbot.yaml";

pub const DEFAULT_PASSWORD: &str = "faiz2025";
pub const DEFAULT_STORE_PATH: &str = "leads.csv";
pub const DEFAULT_WEBHOOK_URL: &str = "https://hooks.zapier.com/hooks/catch/23665833/u2b4m2h/";

pub const ENV_PASSWORD: &str = "APP_PASSWORD";
pub const ENV_COMPLETION_KEY: &str = "OPENAI_API_KEY";
pub const ENV_WEBHOOK_URL: &str = "LEADBOT_WEBHOOK_URL";

// ---------------------------------------------------------------------------
// WebhookConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebhookConfig {
    #[serde(default = "default_webhook_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_webhook_url() -> String {
    DEFAULT_WEBHOOK_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: default_webhook_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// When true, "Start New Inquiry" also drops the login and the visitor
    /// has to enter the password again.
    #[serde(default)]
    pub reset_requires_login: bool,
    #[serde(default = "default_idle_ttl")]
    pub idle_ttl_minutes: u64,
    /// Upper bound on live sessions. The least recently seen session is
    /// evicted to make room for a new one.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_idle_ttl() -> u64 {
    120
}

fn default_max_sessions() -> usize {
    10_000
}

/// One year.
pub const MAX_IDLE_TTL_MINUTES: u64 = 525_600;

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reset_requires_login: false,
            idle_ttl_minutes: default_idle_ttl(),
            max_sessions: default_max_sessions(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    #[serde(default)]
    pub webhook: WebhookConfig,
    /// Credential for the completion service. Held for the collaborator
    /// library only; no questionnaire step calls it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_api_key: Option<String>,
    #[serde(default)]
    pub session: SessionConfig,
}

fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            password: default_password(),
            store_path: default_store_path(),
            webhook: WebhookConfig::default(),
            completion_api_key: None,
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    pub fn path(root: &Path) -> PathBuf {
        root.join(CONFIG_FILE)
    }

    /// Load `leadbot.yaml` from `root`. A missing file yields the defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = Self::path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load from disk, apply process environment overrides and validate.
    pub fn load_with_env(root: &Path) -> Result<Self> {
        let mut cfg = Self::load(root)?;
        cfg.apply_overrides(|key| std::env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = Self::path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Apply environment overrides through `lookup`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(password) = non_empty(ENV_PASSWORD) {
            self.password = password;
        }
        if let Some(key) = non_empty(ENV_COMPLETION_KEY) {
            self.completion_api_key = Some(key);
        }
        if let Some(url) = non_empty(ENV_WEBHOOK_URL) {
            self.webhook.url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.password.is_empty() {
            return Err(LeadbotError::InvalidConfig(
                "password must not be empty".into(),
            ));
        }
        if self.webhook.url.trim().is_empty() {
            return Err(LeadbotError::InvalidConfig(
                "webhook.url must not be empty".into(),
            ));
        }
        if self.webhook.timeout_secs == 0 {
            return Err(LeadbotError::InvalidConfig(
                "webhook.timeout_secs must be greater than zero".into(),
            ));
        }
        if !(1..=MAX_IDLE_TTL_MINUTES).contains(&self.session.idle_ttl_minutes) {
            return Err(LeadbotError::InvalidConfig(format!(
                "session.idle_ttl_minutes must be between 1 and {MAX_IDLE_TTL_MINUTES}"
            )));
        }
        if self.session.max_sessions == 0 {
            return Err(LeadbotError::InvalidConfig(
                "session.max_sessions must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn uses_default_password(&self) -> bool {
        self.password == DEFAULT_PASSWORD
    }

    /// Store path with relative paths anchored at `root`.
    pub fn store_path_in(&self, root: &Path) -> PathBuf {
        if self.store_path.is_absolute() {
            self.store_path.clone()
        } else {
            root.join(&self.store_path)
        }
    }
}
