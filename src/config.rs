use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_TEMPERATURE: f32 = 0.1;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
const COMPLETIONS_PATH: &str = "/chat/completions";

/// Provider settings, built once at startup and handed to the request builder
/// and the parsing service.
#[derive(Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl ProviderConfig {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads every option through `lookup`, so callers other than `from_env`
    /// never touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let config = Self {
            api_key: read("GROQ_API_KEY").unwrap_or_default(),
            base_url: read("GROQ_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: read("GROQ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(
                parse_option::<u64>(read("GROQ_TIMEOUT"), "GROQ_TIMEOUT")?
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            temperature: parse_option::<f32>(read("GROQ_TEMPERATURE"), "GROQ_TEMPERATURE")?
                .unwrap_or(DEFAULT_TEMPERATURE),
            max_retries: parse_option::<u32>(read("GROQ_MAX_RETRIES"), "GROQ_MAX_RETRIES")?
                .unwrap_or(DEFAULT_MAX_RETRIES),
            retry_delay: Duration::from_millis(
                parse_option::<u64>(read("GROQ_RETRY_DELAY_MS"), "GROQ_RETRY_DELAY_MS")?
                    .unwrap_or(DEFAULT_RETRY_DELAY_MS),
            ),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            self.model = model.trim().to_string();
        }
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> AppResult<Self> {
        if let Some(temperature) = temperature {
            self.temperature = temperature;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn endpoint(&self) -> String {
        format!("{}{COMPLETIONS_PATH}", self.base_url.trim_end_matches('/'))
    }

    fn validate(&self) -> AppResult<()> {
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(AppError::Configuration(format!(
                "temperature must be within [0, 1], got {}",
                self.temperature
            )));
        }
        if self.timeout.is_zero() {
            return Err(AppError::Configuration(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &mask_secret(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .field("max_retries", &self.max_retries)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

/// Keeps the first and last three characters of long secrets.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    match chars.len() {
        0 => "<not set>".to_string(),
        len if len > 6 => {
            let prefix: String = chars[..3].iter().collect();
            let suffix: String = chars[len - 3..].iter().collect();
            format!("{prefix}***{suffix}")
        }
        _ => "***".to_string(),
    }
}

fn parse_option<T: FromStr>(value: Option<String>, key: &str) -> AppResult<Option<T>> {
    value
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| AppError::Configuration(format!("invalid value for {key}: {raw}")))
        })
        .transpose()
}
