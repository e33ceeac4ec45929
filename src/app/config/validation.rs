use super::{Config, ConfigError};

impl Config {
    /// Checks the timing and sizing knobs only. Webhook target problems are
    /// left to the dispatcher, which disables itself instead of refusing to start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit_interval_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "Rate limit interval must be greater than 0".to_string(),
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "Poll interval must be greater than 0".to_string(),
            ));
        }

        if self.poll_interval_ms > self.rate_limit_interval_ms {
            return Err(ConfigError::InvalidConfig(format!(
                "Poll interval ({}ms) must not exceed the rate limit interval ({}ms)",
                self.poll_interval_ms, self.rate_limit_interval_ms
            )));
        }

        if self.max_message_length == 0 {
            return Err(ConfigError::InvalidConfig(
                "Max message length must be greater than 0".to_string(),
            ));
        }

        if self.dispatch_queue_capacity == 0 {
            return Err(ConfigError::InvalidConfig(
                "Dispatch queue capacity must be greater than 0".to_string(),
            ));
        }

        if self.shutdown_grace_ms == 0 {
            return Err(ConfigError::InvalidConfig(
                "Shutdown grace must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
