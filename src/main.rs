use rask_log_core::app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::main().await
}
