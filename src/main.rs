use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use delve::api::create_router;
use delve::config::Config;
use delve::gateway::QueryGateway;
use delve::resolver::LinkResolver;

/// HTTP gateway that answers link queries by running an external resolver script.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Address to bind [env: DELVE_HOST]
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on [env: DELVE_PORT]
    #[arg(long)]
    port: Option<u16>,

    /// Interpreter used to run the resolver script [env: RESOLVER_INTERPRETER]
    #[arg(long)]
    interpreter: Option<PathBuf>,

    /// Directory containing the resolver script [env: RESOLVER_SCRIPT_DIR]
    #[arg(long)]
    script_dir: Option<PathBuf>,

    /// Resolver script file name [env: RESOLVER_SCRIPT]
    #[arg(long)]
    script: Option<String>,

    /// Kill the resolver after this many seconds, 0 disables [env: RESOLVER_TIMEOUT_SECS]
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(interpreter) = self.interpreter {
            config.resolver.interpreter = interpreter;
        }
        if let Some(script_dir) = self.script_dir {
            config.resolver.script_dir = script_dir;
        }
        if let Some(script) = self.script {
            config.resolver.script = script;
        }
        if let Some(secs) = self.timeout_secs {
            config.resolver.timeout = (secs > 0).then_some(Duration::from_secs(secs));
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Bridge log crate -> tracing (so log::warn! etc. work)
    tracing_log::LogTracer::init()?;

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    cli.apply(&mut config);

    tracing::info!(
        interpreter = %config.resolver.interpreter.display(),
        script = %config.resolver.script_path().display(),
        timeout = ?config.resolver.timeout,
        "resolver configured"
    );

    let gateway = Arc::new(QueryGateway::new(LinkResolver::new(config.resolver.clone())));
    let app = create_router(gateway);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {:#}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
