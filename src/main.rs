//! blockview
//!
//! Main entry point that delegates to the app module.

mod app;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting blockview...");
    if let Err(err) = app::run_game() {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
}
