use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tokio::io::BufReader;
use tracing::{debug, info};

use directline_console::args::ClientArgs;
use directline_console::chat::{ChatSession, SessionEnd};
use directline_console::config::ClientConfig;
use directline_console::console::Console;
use directline_console::logging::{self, LogConfig, LogFormat};
use directline_console::outbound::OutboundChannel;
use directline_console::render::ActivityRenderer;
use directline_console::session;
use directline_console::stream::{InboundStream, StreamListener};
use directline_console::viewer::SystemViewer;

/// EX_USAGE from sysexits.h
const EX_USAGE: i32 = 64;

#[derive(Debug, Parser)]
#[command(
    name = "directline-console",
    version,
    about = "Chat with a Bot Framework bot from the terminal over Direct Line"
)]
struct Cli {
    #[command(flatten)]
    client: ClientArgs,

    /// Log output format (logs go to stderr)
    #[arg(long, value_enum, value_name = "FORMAT")]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env();
    if let Some(format) = cli.log_format {
        log_config = log_config.with_format(format);
    }
    logging::init(log_config);

    let mut config =
        ClientConfig::load(cli.client.config.as_deref()).context("Failed to load configuration")?;
    cli.client.apply_overrides(&mut config);

    if config.secret().is_err() {
        println!(
            "{}\nDLSecret=XXXX directline-console",
            "Run with your bot's DirectLine secret".yellow()
        );
        std::process::exit(EX_USAGE);
    }

    let (client, session) = session::bootstrap(reqwest::Client::new(), &config)
        .await
        .context("Error initializing DirectLine client")?;

    info!(
        conversation_id = %session.conversation_id,
        "Starting WebSocket client for message streaming"
    );
    let events = StreamListener::new(session.stream_url.clone()).spawn();

    let outbound = OutboundChannel::new(
        Arc::new(client),
        Arc::clone(&session.conversation_id),
        Arc::from(config.user_id.as_str()),
    );
    let renderer = if config.open_images {
        ActivityRenderer::with_viewer(Arc::new(SystemViewer))
    } else {
        ActivityRenderer::new()
    };
    let mut chat = ChatSession::new(
        outbound,
        InboundStream::new(config.user_id.clone()),
        renderer,
        Console::new(io::stdout(), config.prompt.clone()),
    );

    let end = chat
        .run(BufReader::new(tokio::io::stdin()), events)
        .await
        .context("Terminal I/O failed")?;
    debug!(?end, stream = ?chat.stream_state(), "Session ended");

    if end == SessionEnd::InputClosed {
        println!();
    }
    // Exit right away: in-flight sends are abandoned and the blocking stdin
    // reader must not hold up runtime shutdown.
    std::process::exit(0);
}
