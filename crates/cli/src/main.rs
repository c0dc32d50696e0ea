mod config_commands;

use std::sync::Arc;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    smsgate_gateway::{Gateway, GatewayState},
    smsgate_sms::{LogSender, MessageSender, ReportBus},
};

#[derive(Parser)]
#[command(name = "smsgate", about = "SMSGate — local HTTP to SMS gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the gateway server.
    Serve {
        /// Override the configured bind address.
        #[arg(long)]
        bind: Option<String>,
        /// Override the configured port.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

async fn serve(bind: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let mut config = smsgate_config::discover_and_load().gateway;
    if let Some(bind) = bind {
        config.bind = bind;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let bus = ReportBus::new();
    let sender: Arc<dyn MessageSender> = Arc::new(LogSender::new(Some(bus.publisher())));
    let state = GatewayState::new(config, sender);

    let gateway = Gateway::start(state, &bus).await?;
    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    gateway.stop().await;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "smsgate starting");

    match cli.command {
        Commands::Serve { bind, port } => serve(bind, port).await,
        Commands::Config { action } => config_commands::handle_config(action),
    }
}
