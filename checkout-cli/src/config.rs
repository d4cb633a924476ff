//! Configuration loading from environment.

use std::env;
use std::time::Duration;

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub session_token: Option<String>,
    pub request_timeout: Duration,
    pub challenge_timeout: Duration,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,
    /// Browser-style language tag reported in device data.
    pub language: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_url =
            lookup("CHECKOUT_API_URL").unwrap_or_else(|| "http://localhost:3000".to_string());

        let session_token = lookup("CHECKOUT_SESSION_TOKEN").filter(|t| !t.trim().is_empty());

        let request_timeout = secs(&lookup, "CHECKOUT_TIMEOUT_SECS", 30)?;
        let challenge_timeout = secs(&lookup, "CHECKOUT_CHALLENGE_TIMEOUT_SECS", 300)?;

        let log_json = match lookup("CHECKOUT_LOG_JSON").as_deref() {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => anyhow::bail!("CHECKOUT_LOG_JSON must be true or false, got {other:?}"),
        };

        let language = lookup("LANG")
            .and_then(|lang| language_tag(&lang))
            .unwrap_or_else(|| "en-US".to_string());

        Ok(Self {
            api_url,
            session_token,
            request_timeout,
            challenge_timeout,
            log_json,
            language,
        })
    }
}

fn secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> anyhow::Result<Duration> {
    let secs = match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{key} must be a whole number of seconds, got {raw:?}"))?,
        None => default,
    };
    Ok(Duration::from_secs(secs))
}

/// `en_US.UTF-8` -> `en-US`. POSIX locales `C` and `POSIX` carry no language.
fn language_tag(locale: &str) -> Option<String> {
    let base = locale.split(['.', '@']).next()?.trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}
