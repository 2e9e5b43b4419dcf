use media_summarizer::config::Config;
use media_summarizer::gemini::{GeminiAgent, GeminiClient};
use media_summarizer::search::DuckDuckGoSearch;
use media_summarizer::workflow::Workflow;
use media_summarizer::{create_app, AppState};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "media_summarizer=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(300))
        .build()?;

    // One agent for the whole process, shared by every request.
    let gemini = GeminiClient::new(http.clone(), config.api_key.clone(), config.base_url.clone());
    let mut agent = GeminiAgent::new(gemini.clone(), config.model.clone())
        .with_max_tool_rounds(config.max_tool_rounds);
    if config.web_search {
        agent = agent.with_search(
            Arc::new(DuckDuckGoSearch::new(http)),
            config.search_max_results,
        );
    }

    let workflow = Workflow::new(
        Arc::new(gemini),
        Arc::new(agent),
        config.poll.clone(),
        config.scratch_dir.clone(),
    );

    let shutdown = CancellationToken::new();
    let state = AppState {
        workflow: Arc::new(workflow),
        shutdown: shutdown.clone(),
        max_upload_bytes: config.max_upload_bytes,
    };

    let app = create_app(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;

    info!("🚀 Server running on http://{}", config.bind_addr);
    info!(
        model = %config.model,
        web_search = config.web_search,
        scratch_dir = %config.scratch_dir.display(),
        "🎥 Open in your browser to start analyzing media"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down, cancelling in-flight requests");
    shutdown.cancel();
}
