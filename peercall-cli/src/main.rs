use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use peercall_client::{
    ClientConfig, ClientHandle, ClientNotice, SignalingClient, WebRtcEngineConfig,
    WebRtcEngineFactory, WsRelayConnector,
};
use peercall_core::IceServerConfig;
use peercall_relay::{RelayConfig, RelayServer};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "peercall")]
#[command(about = "Peer-to-peer call signaling: run a relay or join a call")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reference signaling relay.
    Relay {
        #[arg(long, env = "PEERCALL_BIND", default_value = "0.0.0.0:8080")]
        bind: SocketAddr,

        #[arg(long, default_value = "/ws")]
        path: String,
    },

    /// Join a room and take or place a call.
    Call {
        #[arg(long, env = "PEERCALL_URL", default_value = "ws://127.0.0.1:8080/ws")]
        url: String,

        #[arg(long)]
        room: Option<String>,

        #[arg(long)]
        username: Option<String>,

        /// Place the call as soon as the room is joined.
        #[arg(long)]
        dial: bool,

        /// STUN/TURN urls; the public STUN servers are used when omitted.
        #[arg(long = "ice-server")]
        ice_servers: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Relay { bind, path } => run_relay(bind, path).await,
        Commands::Call {
            url,
            room,
            username,
            dial,
            ice_servers,
        } => {
            let room = prompt_if_missing(room, "Room")?;
            let username = prompt_if_missing(username, "Username")?;
            run_call(url, room, username, dial, ice_servers).await
        }
    }
}

async fn run_relay(bind: SocketAddr, path: String) -> Result<()> {
    let config = RelayConfig {
        bind_addr: bind,
        ws_path: path,
    };
    let server = RelayServer::bind(config).await?;

    println!(
        "{} {}",
        "📡 Relay listening on".green().bold(),
        server.ws_url()?
    );

    tokio::select! {
        res = server.run() => res,
        _ = tokio::signal::ctrl_c() => {
            println!("{}", "Relay stopped".yellow());
            Ok(())
        }
    }
}

async fn run_call(
    url: String,
    room: String,
    username: String,
    dial: bool,
    ice_urls: Vec<String>,
) -> Result<()> {
    let mut config = ClientConfig::new(url);
    if !ice_urls.is_empty() {
        config.ice_servers = ice_urls.into_iter().map(IceServerConfig::stun).collect();
    }

    let engines = WebRtcEngineFactory::new(WebRtcEngineConfig {
        ice_servers: config.ice_servers.clone(),
    });

    println!("{} {}", "🔌 Connecting to".cyan(), config.relay_url);
    let (client, handle, notices) =
        SignalingClient::new(config, Arc::new(WsRelayConnector::new()), Arc::new(engines));
    let client_task = tokio::spawn(client.run());

    handle
        .join(&room, &username)
        .await
        .context("Signaling client stopped")?;

    tokio::select! {
        _ = print_notices(notices, handle.clone(), dial) => {}
        _ = tokio::signal::ctrl_c() => {
            println!("{}", "Hanging up...".yellow());
        }
    }

    // the client may already be gone if the notice stream ended
    let _ = handle.shutdown().await;
    client_task.await.context("Signaling client panicked")?;

    println!("{}", "👋 Bye".green().bold());
    Ok(())
}

async fn print_notices(
    mut notices: mpsc::UnboundedReceiver<ClientNotice>,
    handle: ClientHandle,
    dial: bool,
) {
    while let Some(notice) = notices.recv().await {
        match notice {
            ClientNotice::RelayConnected => println!("{}", "Relay connected".green()),
            ClientNotice::RelayDisconnected => {
                println!("{}", "Relay lost, reconnecting...".yellow())
            }
            ClientNotice::Joined { room } => {
                println!("{} {}", "✅ Joined room".green().bold(), room.bold());
                if dial && handle.start_call().await.is_err() {
                    return;
                }
            }
            ClientNotice::CallState(state) => println!("   call: {}", state.to_string().cyan()),
            ClientNotice::CallFailed(reason) => {
                println!("{} {}", "❌ Call failed:".red().bold(), reason)
            }
            ClientNotice::RemoteStream(stream) => println!(
                "{} {} ({})",
                "🎥 Remote stream".green(),
                stream.stream_id,
                stream.kind
            ),
            ClientNotice::ResourceFailure(reason) => {
                println!("{} {}", "❌ Media unavailable:".red().bold(), reason)
            }
            ClientNotice::Left => {
                println!("{}", "Left room".yellow());
                return;
            }
        }
    }
}

fn prompt_if_missing(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .with_context(|| format!("Failed to read {}", prompt.to_lowercase())),
    }
}
