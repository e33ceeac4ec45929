use webhook_log_forwarder::app::{App, Config, ShutdownOutcome};

fn fast_config() -> Config {
    let mut config = Config {
        // Not https, so the dispatcher stays disabled and nothing leaves the test.
        webhook_url: Some("http://127.0.0.1:9/hook".to_string()),
        console_username: Some("Console".to_string()),
        console_avatar_url: Some("https://cdn.example.com/avatar.png".to_string()),
        rate_limit_interval_ms: 50,
        poll_interval_ms: 10,
        ..Config::default()
    };
    config.post_process().unwrap();
    config
}

#[tokio::test]
async fn test_app_forwards_input_until_eof() {
    let app = App::from_config(fast_config()).unwrap();
    let input: &[u8] = b"ERROR db > connection lost\n\n[!] disk full\n";

    let outcome = app.run_with_input(input).await.unwrap();
    assert_eq!(outcome, ShutdownOutcome::Drained);
}

#[tokio::test]
async fn test_app_counts_refused_batches() {
    let app = App::from_config(fast_config()).unwrap();
    let stats_before = app.pipeline().stats();
    assert_eq!(stats_before.lines_submitted, 0);

    let submitter = app.pipeline().submitter();
    submitter.submit("WARN net > slow client");
    tokio::time::sleep(std::time::Duration::from_millis(150)).await;

    let stats = app.pipeline().stats();
    assert_eq!(stats.lines_submitted, 1);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.delivered, 0);

    let outcome = app.run_with_input(&b""[..]).await.unwrap();
    assert_eq!(outcome, ShutdownOutcome::Drained);
}

#[tokio::test]
async fn test_app_keeps_forwarding_past_invalid_utf8() {
    let app = App::from_config(fast_config()).unwrap();
    let stats = app.pipeline().stats_handle();
    let input: &[u8] = b"a\n\xff\nb\n";

    let outcome = app.run_with_input(input).await.unwrap();
    assert_eq!(outcome, ShutdownOutcome::Drained);
    assert_eq!(stats.snapshot().lines_submitted, 3);
}
