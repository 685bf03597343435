use std::env;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

const TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
const API_BASE_VAR: &str = "TELEGRAM_API_BASE";
const TIMEOUT_VAR: &str = "TELEGRAM_TIMEOUT_SECS";
const PROXY_VAR: &str = "TELEGRAM_PROXY";

/// Connection settings for a bot.
#[derive(Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Token issued by @BotFather.
    pub token: String,
    /// Base URL of the Bot API server, without a trailing slash.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Whole-request timeout. Must exceed the long polling timeout.
    #[serde(default = "default_timeout", with = "secs")]
    pub timeout: Duration,
    /// Optional HTTP or SOCKS proxy URL.
    #[serde(default)]
    pub proxy: Option<String>,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &self.masked_token())
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .field("proxy", &self.proxy)
            .finish()
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: default_api_base(),
            timeout: default_timeout(),
            proxy: None,
        }
    }
}

impl BotConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Default::default()
        }
    }

    /// Reads `TELEGRAM_BOT_TOKEN` and the optional `TELEGRAM_API_BASE`,
    /// `TELEGRAM_TIMEOUT_SECS` and `TELEGRAM_PROXY` variables.
    pub fn from_env() -> Result<Self> {
        let token =
            env::var(TOKEN_VAR).map_err(|_| Error::Config(format!("{TOKEN_VAR} is not set")))?;
        let mut config = Self::new(token);

        if let Ok(base) = env::var(API_BASE_VAR) {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Ok(secs) = env::var(TIMEOUT_VAR) {
            let secs: u64 = secs
                .parse()
                .map_err(|_| Error::Config(format!("{TIMEOUT_VAR} must be a number of seconds")))?;
            config.timeout = Duration::from_secs(secs);
        }
        config.proxy = env::var(PROXY_VAR).ok().filter(|proxy| !proxy.is_empty());

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(Error::Config("bot token must not be empty".into()));
        }
        if self.api_base.is_empty() {
            return Err(Error::Config("api base url must not be empty".into()));
        }
        Ok(())
    }

    pub fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    /// Download URL for a `file_path` returned by `getFile`.
    pub fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_base, self.token, file_path)
    }

    /// Token form that is safe to put in logs.
    pub fn masked_token(&self) -> String {
        match self.token.split_once(':') {
            Some((bot_id, _)) => format!("{bot_id}:***"),
            None => "***".to_string(),
        }
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
