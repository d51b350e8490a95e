use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use law_digest::channels::{EmailNotifier, LogNotifier, Notifier};
use law_digest::config::{DigestConfig, LogConfig, RunArgs};
use law_digest::llm::create_provider;
use law_digest::logging;
use law_digest::pipeline::{ActPipeline, DispatchOutcome};
use law_digest::registry::RegistryClient;
use law_digest::summarizer::LlmSummarizer;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    let _ = rustls::crypto::ring::default_provider().install_default();

    // A missing .env file is fine; real env vars still apply.
    let _ = dotenvy::dotenv();

    let args = RunArgs::parse();
    let log_guard = logging::init(&LogConfig {
        dir: args.log_dir.clone(),
    })?;
    if let Some(path) = &log_guard.file_path {
        tracing::info!(path = %path.display(), "Writing run log");
    }

    let today = chrono::Local::now().date_naive();
    let period = args.period()?;
    let filter = args.filter(today)?;
    let config = DigestConfig::from_env(args.dry_run)?;

    tracing::info!(
        "Law Digest v{} (model: {}, registry: {})",
        env!("CARGO_PKG_VERSION"),
        config.llm.model,
        config.registry_url
    );

    let http = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("law-digest/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("building HTTP client")?;

    let registry = RegistryClient::with_client(http.clone(), &config.registry_url)
        .with_publisher(&config.publisher);
    let llm = create_provider(&config.llm)?;
    let summarizer = LlmSummarizer::new(http, llm, config.summarizer.clone());

    let notifier: Arc<dyn Notifier> = match config.email {
        Some(email) => Arc::new(EmailNotifier::new(email)),
        None => Arc::new(LogNotifier::new()),
    };

    let pipeline = ActPipeline::new(Arc::new(registry), Arc::new(summarizer), notifier);
    let state = pipeline.run(filter, period).await?;

    let summary = state.summary();
    match &state.dispatch {
        DispatchOutcome::Delivered(status) => {
            tracing::info!(?status, acts = summary.total, "Digest delivered");
        }
        DispatchOutcome::Failed(reason) => {
            tracing::error!(%reason, acts = summary.total, "Digest could not be delivered");
        }
        DispatchOutcome::NotAttempted => {
            tracing::warn!("Run finished without dispatching");
        }
    }

    Ok(())
}
