use anyhow::Context;
use convopro::ai::OllamaClient;
use convopro::config::AppConfig;
use convopro::session::{ChatSession, Services};
use convopro::store::JsonFileStore;
use convopro::ui::{App, SharedSession};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[cfg(not(any(feature = "desktop", feature = "web", feature = "mobile")))]
compile_error!("the convopro binary needs a renderer: enable `desktop`, `web` or `mobile`");

fn report_dotenv(result: Result<PathBuf, dotenvy::Error>) {
    match result {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!(error = %err, "ignoring unreadable .env"),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,convopro=debug")),
        )
        .init();
}

fn build_session(config: &AppConfig) -> anyhow::Result<SharedSession> {
    let store = JsonFileStore::open(&config.data_dir).with_context(|| {
        format!(
            "failed to open conversation store at {}",
            config.data_dir.display()
        )
    })?;
    let ollama = OllamaClient::new(&config.ollama_host, config.request_timeout)
        .context("failed to build Ollama client")?;

    let session = ChatSession::new(Arc::new(store), Services::from_backend(Arc::new(ollama)))
        .with_preferred_model(config.preferred_model.clone());
    Ok(Arc::new(Mutex::new(session)))
}

fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    init_tracing();
    report_dotenv(dotenv);

    let config = AppConfig::from_env()?;
    tracing::info!(
        ollama = %config.ollama_host,
        data_dir = %config.data_dir.display(),
        "starting ConvoPro"
    );
    let session = build_session(&config)?;

    dioxus::LaunchBuilder::new()
        .with_context(session)
        .launch(App);
    Ok(())
}
