//! Link a Nexus Mods account from the terminal.
//!
//! ```text
//! cargo run --example link_account -- [credentials.json] [config.toml]
//! ```
//!
//! Set `RUST_LOG=nexus_sso=debug` to watch the exchange. Press Ctrl+C to
//! abandon the attempt; the request id stays saved so the next run resumes.

use nexus_sso::{CancelSignal, JsonFileStore, LinkConfig, LinkPhase, SsoLinker};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nexus_sso=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let store_path = args.next().unwrap_or_else(|| "nexus-credentials.json".to_string());
    let config = match args.next() {
        Some(path) => LinkConfig::load(path)?,
        None => LinkConfig::default(),
    }
    .with_env_overrides()
    .into_valid()?;

    let store = Arc::new(JsonFileStore::new(&store_path));
    let mut credentials = store.load()?;
    println!("Account status: {}", credentials.status());

    let linker = SsoLinker::new(config, store);

    let cancel = CancelSignal::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();
    let printer = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            println!("  {line}");
        }
    });

    let outcome = linker.run(&mut credentials, Some(&tx), &cancel).await;
    drop(tx);
    printer.await?;

    println!("Result: {}", outcome.result);
    println!("Account status: {}", credentials.status());
    println!(
        "Phases: {}",
        outcome
            .history
            .get_path()
            .iter()
            .map(|phase| format!("{phase:?}"))
            .collect::<Vec<_>>()
            .join(" -> ")
    );

    if !outcome.history.reached(&LinkPhase::AwaitingMessage) {
        println!("The approval page was never opened.");
    }
    if let Some(elapsed) = outcome.history.duration() {
        println!("Took {:.1}s", elapsed.as_secs_f64());
    }

    Ok(())
}
