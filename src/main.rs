use std::sync::Arc;

use anyhow::Context;
use campus_assist::channels::CliChannel;
use campus_assist::config::{AssistConfig, RunMode};
use campus_assist::dialogue::{DialogueMachine, SystemClock};
use campus_assist::gateway::HttpGateway;
use campus_assist::widget::{SessionStore, WidgetState, spawn_expiry_task, widget_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AssistConfig::from_env().context("invalid configuration")?;

    let gateway = HttpGateway::new(config.api_base.clone(), config.http_timeout)
        .context("failed to build backend client")?;
    let machine = Arc::new(
        DialogueMachine::from_config(&config, Arc::new(gateway), Arc::new(SystemClock))
            .context("invalid dialogue settings")?,
    );

    eprintln!("🎓 Campus Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.api_base);
    eprintln!(
        "   OTP validity: {}s, attempts: {}",
        config.otp_ttl.as_secs(),
        config.max_attempts
    );

    match config.mode {
        RunMode::Serve => {
            let sessions = SessionStore::new(config.session_idle);
            let _expiry_handle = spawn_expiry_task(Arc::clone(&sessions));
            let state = WidgetState { machine, sessions };
            let app = widget_routes(state, &config.cors_origins);
            let addr = format!("0.0.0.0:{}", config.port);

            eprintln!("   Widget API: http://{}/api/widget/sessions", addr);
            eprintln!("   Health: http://{}/health\n", addr);

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            tracing::info!("Widget API listening on {}", addr);
            axum::serve(listener, app).await?;
        }
        RunMode::Cli => {
            eprintln!("   Type a message and press Enter. /quit to exit.\n");
            let cli = CliChannel::new();
            let input = cli.stdin_lines();
            let mut stdout = std::io::stdout();
            cli.drive(&machine, input, &mut stdout).await?;
        }
    }

    Ok(())
}
