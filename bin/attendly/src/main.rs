use eyre::Report;

#[tokio::main]
async fn main() -> Result<(), Report> {
    attendly::run().await
}
