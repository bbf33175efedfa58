#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vocab_tester_backend::run().await
}
