use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;

use crate::{
    classifier::build_classifier,
    config::AppConfig,
    infrastructure::shutdown,
    web::{self, AppState},
};

pub struct DetectorApp {
    config: AppConfig,
    classifier: &'static str,
    router: Router,
}

impl DetectorApp {
    pub fn initialize(config: AppConfig) -> Result<Self> {
        let classifier = build_classifier(&config)?;
        let name = classifier.name();
        let router = web::router(AppState { classifier }, config.server.max_body_bytes);

        Ok(Self {
            config,
            classifier: name,
            router,
        })
    }

    pub async fn run(self) -> Result<()> {
        let DetectorApp {
            config,
            classifier,
            router,
        } = self;

        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;

        tracing::info!(
            target: "server",
            addr = %listener.local_addr()?,
            classifier,
            "spam detector listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown::wait_for_signal())
            .await
            .context("HTTP server terminated with an error")?;

        tracing::info!(target: "server", "spam detector stopped");
        Ok(())
    }
}
