#[tokio::main]
async fn main() -> anyhow::Result<()> {
    when_to_pair_lib::run().await
}
