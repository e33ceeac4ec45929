use anyhow::Context;
use webhook_log_forwarder::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app = App::from_args(std::env::args_os()).context("failed to start forwarder")?;
    app.run().await.context("forwarder did not shut down cleanly")?;
    Ok(())
}
