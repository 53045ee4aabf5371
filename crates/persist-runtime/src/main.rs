//! persist-runtime — process entry point. See SPEC_FULL.md §4.G.

mod bootstrap;
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "./config.json".to_string());

    if let Err(err) = bootstrap::run(&config_path).await {
        eprintln!("persist-runtime: fatal startup error: {err}");
        std::process::exit(1);
    }

    Ok(())
}
