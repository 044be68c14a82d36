use anyhow::Result;
use coursecast::{config::Config, server};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) configuration ────────────────────────────────────────────
    let cfg = Config::load()?;

    // ─── 2) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!(?cfg, "startup");

    // ─── 3) serve ────────────────────────────────────────────────────
    server::serve(&cfg).await
}
