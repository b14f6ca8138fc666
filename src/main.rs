#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = classroom_attempts::run().await {
        eprintln!("classroom-attempts fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
