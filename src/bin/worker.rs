#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = classroom_attempts::run_worker().await {
        eprintln!("classroom-attempts-worker fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
