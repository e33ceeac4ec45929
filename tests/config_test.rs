use serial_test::serial;
use std::io::Write;
use std::{env, time::Duration};
use tempfile::NamedTempFile;
use webhook_log_forwarder::app::{Config, ConfigError, LogLevel};
use webhook_log_forwarder::command::{CommandAuthor, CommandDecision, InboundCommand};
use webhook_log_forwarder::sender::WebhookDispatcher;

const ENV_VARS: [&str; 15] = [
    "WEBHOOK_URL",
    "CONSOLE_USERNAME",
    "CONSOLE_AVATAR_URL",
    "CHAT_ID",
    "CMD_ROLE_WHITELIST",
    "RATE_LIMIT_INTERVAL_MS",
    "POLL_INTERVAL_MS",
    "MAX_MESSAGE_LENGTH",
    "DISPATCH_QUEUE_CAPACITY",
    "SHUTDOWN_GRACE_MS",
    "REQUEST_TIMEOUT_SECS",
    "RATE_LIMIT_RETRIES",
    "LOG_LEVEL",
    "LOG_JSON",
    "CONFIG_FILE",
];

fn clean_all_env_vars() {
    unsafe {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }
}

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_from_partial_file() {
    let file = write_config(
        r#"
webhook_url = "https://discord.com/api/webhooks/1/token"
console_username = "Console"
console_avatar_url = "https://cdn.example.com/avatar.png"
chat_id = "42"
cmd_role_whitelist = ["111", "222"]
rate_limit_interval_ms = 3000
rate_limit_retries = 2
log_level = "debug"
"#,
    );

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(
        config.webhook_url.as_deref(),
        Some("https://discord.com/api/webhooks/1/token")
    );
    assert_eq!(config.rate_limit_interval, Duration::from_secs(3));
    assert_eq!(config.poll_interval, Duration::from_millis(100));
    assert_eq!(config.max_message_length, 2000);
    assert_eq!(config.rate_limit_retries, 2);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert!(config.webhook_target().validate(true).is_ok());
}

#[test]
fn test_config_file_errors() {
    let malformed = write_config("rate_limit_interval_ms = \"soon\"");
    assert!(matches!(
        Config::from_file(malformed.path()),
        Err(ConfigError::ParseError(_))
    ));

    assert!(matches!(
        Config::from_file("/nonexistent/forwarder.toml"),
        Err(ConfigError::FileError(_))
    ));

    let invalid = write_config("rate_limit_interval_ms = 100\npoll_interval_ms = 500");
    assert!(matches!(
        Config::from_file(invalid.path()),
        Err(ConfigError::InvalidConfig(_))
    ));
}

#[test]
#[serial]
fn test_config_from_env() {
    clean_all_env_vars();
    unsafe {
        env::set_var("WEBHOOK_URL", "https://discord.com/api/webhooks/1/token");
        env::set_var("CONSOLE_USERNAME", "Console");
        env::set_var("CHAT_ID", "42");
        env::set_var("CMD_ROLE_WHITELIST", "111, 222");
        env::set_var("MAX_MESSAGE_LENGTH", "1500");
        env::set_var("LOG_LEVEL", "WARN");
    }

    let config = Config::from_env().unwrap();
    clean_all_env_vars();

    assert_eq!(config.console_username.as_deref(), Some("Console"));
    assert_eq!(config.cmd_role_whitelist, vec!["111", "222"]);
    assert_eq!(config.max_message_length, 1500);
    assert_eq!(config.log_level, LogLevel::Warn);
    assert!(config.console_avatar_url.is_none());
}

#[test]
#[serial]
fn test_config_from_env_rejects_bad_values() {
    clean_all_env_vars();

    unsafe { env::set_var("RATE_LIMIT_INTERVAL_MS", "abc") };
    assert!(matches!(Config::from_env(), Err(ConfigError::EnvError(_))));
    clean_all_env_vars();

    unsafe { env::set_var("LOG_LEVEL", "loud") };
    assert!(matches!(Config::from_env(), Err(ConfigError::EnvError(_))));
    clean_all_env_vars();

    unsafe { env::set_var("DISPATCH_QUEUE_CAPACITY", "0") };
    assert!(matches!(
        Config::from_env(),
        Err(ConfigError::InvalidConfig(_))
    ));
    clean_all_env_vars();
}

#[test]
#[serial]
fn test_cli_overrides_config_file() {
    clean_all_env_vars();
    let file = write_config(
        r#"
webhook_url = "https://discord.com/api/webhooks/1/token"
console_username = "From file"
max_message_length = 1000
"#,
    );

    let config = Config::from_args_and_env([
        "webhook-log-forwarder",
        "--config-file",
        file.path().to_str().unwrap(),
        "--console-username",
        "From cli",
    ])
    .unwrap();

    assert_eq!(config.console_username.as_deref(), Some("From cli"));
    assert_eq!(config.max_message_length, 1000);
    assert!(config.webhook_url.is_some());
}

#[test]
#[serial]
fn test_command_gate_from_config() {
    clean_all_env_vars();
    let config = Config::from_args([
        "webhook-log-forwarder",
        "--chat-id",
        "42",
        "--cmd-role-whitelist",
        "mods",
    ])
    .unwrap();

    let gate = config.command_gate();
    let command = InboundCommand {
        channel_id: "42".to_string(),
        author: Some(CommandAuthor {
            role_ids: vec!["mods".to_string()],
            is_administrator: false,
        }),
        content: "servermsg hello".to_string(),
    };
    assert_eq!(gate.evaluate(&command), CommandDecision::Accepted);
}

#[test]
#[serial]
fn test_malformed_target_starts_with_dispatch_disabled() {
    clean_all_env_vars();
    let config = Config::from_args([
        "webhook-log-forwarder",
        "--webhook-url",
        "https://",
        "--console-username",
        "Console",
        "--console-avatar-url",
        "avatar.png",
    ])
    .unwrap();

    let dispatcher =
        WebhookDispatcher::new(config.webhook_target(), config.client_config()).unwrap();
    assert!(!dispatcher.is_enabled());
}
