use super::serde_helpers::{
    load_env_list, load_env_path_opt, load_env_string_opt, load_env_var, split_list,
};
use super::{ConfigError, LogLevel};
use crate::command::CommandGate;
use crate::reliability::RetryConfig;
use crate::sender::{ClientConfig, WebhookTarget};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(author, version, about, long_about = None)]
#[serde(default)]
pub struct Config {
    /// Webhook URL batches are posted to (must be https)
    #[arg(long, env = "WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Display name attached to every webhook message
    #[arg(long, env = "CONSOLE_USERNAME")]
    pub console_username: Option<String>,

    /// Avatar image URL attached to every webhook message
    #[arg(long, env = "CONSOLE_AVATAR_URL")]
    pub console_avatar_url: Option<String>,

    /// Channel whose messages are treated as console commands
    #[arg(long, env = "CHAT_ID")]
    pub chat_id: Option<String>,

    /// Role ids allowed to issue console commands (comma separated)
    #[arg(long, env = "CMD_ROLE_WHITELIST", value_delimiter = ',')]
    pub cmd_role_whitelist: Vec<String>,

    /// Minimum spacing between webhook requests in milliseconds
    #[arg(long, env = "RATE_LIMIT_INTERVAL_MS", default_value = "2000")]
    pub rate_limit_interval_ms: u64,

    /// How long the aggregator waits for a line before re-checking the window
    #[arg(long, env = "POLL_INTERVAL_MS", default_value = "100")]
    pub poll_interval_ms: u64,

    /// Maximum characters per webhook message
    #[arg(long, env = "MAX_MESSAGE_LENGTH", default_value = "2000")]
    pub max_message_length: usize,

    /// Sealed batches allowed to wait for the dispatch worker
    #[arg(long, env = "DISPATCH_QUEUE_CAPACITY", default_value = "16")]
    pub dispatch_queue_capacity: usize,

    /// Upper bound on shutdown in milliseconds
    #[arg(long, env = "SHUTDOWN_GRACE_MS", default_value = "1000")]
    pub shutdown_grace_ms: u64,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,

    /// Re-send attempts for a rate-limited batch (0 drops it)
    #[arg(long, env = "RATE_LIMIT_RETRIES", default_value = "0")]
    pub rate_limit_retries: u32,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Emit diagnostics as JSON
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,

    /// Configuration file path (optional)
    #[arg(long, env = "CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Derived fields (not CLI arguments)
    #[serde(skip)]
    #[arg(skip)]
    pub rate_limit_interval: Duration,

    #[serde(skip)]
    #[arg(skip)]
    pub poll_interval: Duration,

    #[serde(skip)]
    #[arg(skip)]
    pub shutdown_grace: Duration,

    #[serde(skip)]
    #[arg(skip)]
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_url: None,
            console_username: None,
            console_avatar_url: None,
            chat_id: None,
            cmd_role_whitelist: Vec::new(),
            rate_limit_interval_ms: 2000,
            poll_interval_ms: 100,
            max_message_length: crate::parser::DEFAULT_MAX_MESSAGE_LENGTH,
            dispatch_queue_capacity: 16,
            shutdown_grace_ms: 1000,
            request_timeout_secs: 10,
            rate_limit_retries: 0,
            log_level: LogLevel::Info,
            log_json: false,
            config_file: None,
            rate_limit_interval: Duration::from_millis(2000),
            poll_interval: Duration::from_millis(100),
            shutdown_grace: Duration::from_millis(1000),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_args<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut config = Config::parse_from(args);
        config.post_process()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        load_env_string_opt("WEBHOOK_URL", &mut config.webhook_url);
        load_env_string_opt("CONSOLE_USERNAME", &mut config.console_username);
        load_env_string_opt("CONSOLE_AVATAR_URL", &mut config.console_avatar_url);
        load_env_string_opt("CHAT_ID", &mut config.chat_id);
        load_env_list("CMD_ROLE_WHITELIST", &mut config.cmd_role_whitelist);
        load_env_var("RATE_LIMIT_INTERVAL_MS", &mut config.rate_limit_interval_ms)?;
        load_env_var("POLL_INTERVAL_MS", &mut config.poll_interval_ms)?;
        load_env_var("MAX_MESSAGE_LENGTH", &mut config.max_message_length)?;
        load_env_var("DISPATCH_QUEUE_CAPACITY", &mut config.dispatch_queue_capacity)?;
        load_env_var("SHUTDOWN_GRACE_MS", &mut config.shutdown_grace_ms)?;
        load_env_var("REQUEST_TIMEOUT_SECS", &mut config.request_timeout_secs)?;
        load_env_var("RATE_LIMIT_RETRIES", &mut config.rate_limit_retries)?;
        load_env_var("LOG_LEVEL", &mut config.log_level)?;
        load_env_var("LOG_JSON", &mut config.log_json)?;
        load_env_path_opt("CONFIG_FILE", &mut config.config_file);

        config.post_process()?;
        config.validate()?;
        Ok(config)
    }

    /// CLI arguments (with their env fallbacks) first; a `--config-file` then
    /// fills every field the command line left at its default.
    pub fn from_args_and_env<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let mut config = Config::parse_from(args);

        if let Some(path) = config.config_file.clone() {
            let file_config = Self::load_file(&path)?;
            config.merge_defaults_from(file_config);
        }

        config.post_process()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_file(path.as_ref())?;
        config.post_process()?;
        config.validate()?;
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    fn merge_defaults_from(&mut self, file: Config) {
        let defaults = Config::default();

        if self.webhook_url.is_none() {
            self.webhook_url = file.webhook_url;
        }
        if self.console_username.is_none() {
            self.console_username = file.console_username;
        }
        if self.console_avatar_url.is_none() {
            self.console_avatar_url = file.console_avatar_url;
        }
        if self.chat_id.is_none() {
            self.chat_id = file.chat_id;
        }
        if self.cmd_role_whitelist.is_empty() {
            self.cmd_role_whitelist = file.cmd_role_whitelist;
        }
        if self.rate_limit_interval_ms == defaults.rate_limit_interval_ms {
            self.rate_limit_interval_ms = file.rate_limit_interval_ms;
        }
        if self.poll_interval_ms == defaults.poll_interval_ms {
            self.poll_interval_ms = file.poll_interval_ms;
        }
        if self.max_message_length == defaults.max_message_length {
            self.max_message_length = file.max_message_length;
        }
        if self.dispatch_queue_capacity == defaults.dispatch_queue_capacity {
            self.dispatch_queue_capacity = file.dispatch_queue_capacity;
        }
        if self.shutdown_grace_ms == defaults.shutdown_grace_ms {
            self.shutdown_grace_ms = file.shutdown_grace_ms;
        }
        if self.request_timeout_secs == defaults.request_timeout_secs {
            self.request_timeout_secs = file.request_timeout_secs;
        }
        if self.rate_limit_retries == defaults.rate_limit_retries {
            self.rate_limit_retries = file.rate_limit_retries;
        }
        if self.log_level == defaults.log_level {
            self.log_level = file.log_level;
        }
        self.log_json |= file.log_json;
    }

    pub fn post_process(&mut self) -> Result<(), ConfigError> {
        self.rate_limit_interval = Duration::from_millis(self.rate_limit_interval_ms);
        self.poll_interval = Duration::from_millis(self.poll_interval_ms);
        self.shutdown_grace = Duration::from_millis(self.shutdown_grace_ms);
        self.request_timeout = Duration::from_secs(self.request_timeout_secs);

        for field in [
            &mut self.webhook_url,
            &mut self.console_username,
            &mut self.console_avatar_url,
            &mut self.chat_id,
        ] {
            if field.as_deref().is_some_and(|value| value.trim().is_empty()) {
                *field = None;
            }
        }

        self.cmd_role_whitelist = split_list(&self.cmd_role_whitelist.join(","));

        Ok(())
    }

    pub fn webhook_target(&self) -> WebhookTarget {
        WebhookTarget {
            url: self.webhook_url.clone(),
            username: self.console_username.clone(),
            avatar_url: self.console_avatar_url.clone(),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: self.request_timeout,
            ..ClientConfig::default()
        }
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.rate_limit_retries,
            max_delay: Duration::from_secs(60).max(self.rate_limit_interval),
            ..RetryConfig::default()
        }
    }

    pub fn command_gate(&self) -> CommandGate {
        CommandGate::new(self.chat_id.clone(), self.cmd_role_whitelist.clone())
    }
}
