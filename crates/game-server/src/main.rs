#[tokio::main]
async fn main() -> anyhow::Result<()> {
    game_server::run_server().await
}
