use std::{process::ExitCode, sync::Arc};

use coffee_llm::openai::{OpenAIChatModel, OpenAIChatModelOptions};
use coffee_recipes::{
    config::{AppConfig, RunMode},
    router, telemetry, AppState, CoffeeGateway,
};
use tracing::{error, info};

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            telemetry::init(RunMode::Debug);
            error!(error = %err, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    telemetry::init(config.mode);
    info!(
        mode = ?config.mode,
        storage = ?config.storage,
        model = %config.openai.model,
        "configuration loaded"
    );

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "server stopped with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), BoxedError> {
    let model = OpenAIChatModel::new(
        config.openai.model.clone(),
        OpenAIChatModelOptions {
            base_url: config.openai.base_url.clone(),
            api_key: config.openai.api_key.clone(),
            structured_outputs: config.openai.structured_outputs,
            timeout: config.openai.timeout,
            client: None,
        },
    );
    let gateway = CoffeeGateway::new(Arc::new(model));
    let state = AppState::new(gateway, config.storage.build());

    let app = router(state);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!(address = %listener.local_addr()?, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}
