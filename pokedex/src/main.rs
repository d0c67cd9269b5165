#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pokedex::run_cli().await
}
