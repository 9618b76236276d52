#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cartage_lib::main().await
}
