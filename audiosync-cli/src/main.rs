mod playback;

use anyhow::{Context, Result};
use audiosync_client::{
    ClientCommand, ClientEvent, ClientRuntime, JoinMode, LinkConfig, NoCapture, RtcLinkFactory,
};
use audiosync_core::RoomCode;
use audiosync_server::{ServerConfig, serve};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::playback::LoggingPlayback;

#[derive(Parser)]
#[command(name = "audiosync")]
#[command(about = "Room coordinator and headless listener for LAN audio sharing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the coordinator and serve the web client.
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,

        #[arg(short, long, default_value_t = 3000)]
        port: u16,

        #[arg(long, default_value = "./public")]
        static_dir: PathBuf,

        /// Reject requests from outside the local network.
        #[arg(long)]
        lan_only: bool,
    },

    /// Join a room as a listener and log the received audio.
    Listen(ListenArgs),
}

#[derive(Args)]
struct ListenArgs {
    /// Coordinator WebSocket URL, e.g. ws://192.168.1.10:3000/ws
    #[arg(long)]
    server: String,

    #[arg(long, default_value = "listener")]
    name: String,

    #[arg(long, conflicts_with = "create", required_unless_present = "create")]
    room: Option<String>,

    #[arg(long)]
    create: bool,

    /// STUN/TURN URLs; defaults to public STUN servers.
    #[arg(long = "ice-server")]
    ice_servers: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Commands::Serve {
            host,
            port,
            static_dir,
            lan_only,
        } => {
            let config = ServerConfig {
                host,
                port,
                static_dir,
                lan_only,
                ..ServerConfig::default()
            };

            println!("{}", "🎧 AudioSync coordinator".green().bold());
            println!("   🌐 http://{}:{}", config.host, config.port);
            println!("   📂 Static: {}", config.static_dir.display());
            if config.lan_only {
                println!("   {}", "🔒 Local network only".yellow());
            }

            serve(config).await
        }

        Commands::Listen(args) => listen(args).await,
    }
}

async fn listen(args: ListenArgs) -> Result<()> {
    let mode = match args.room {
        Some(code) => JoinMode::Join(
            RoomCode::parse(&code.to_ascii_uppercase()).context("Invalid room code")?,
        ),
        None => JoinMode::Create,
    };

    let link_config = if args.ice_servers.is_empty() {
        LinkConfig::default()
    } else {
        LinkConfig {
            ice_servers: args.ice_servers,
        }
    };
    let factory = RtcLinkFactory::new(link_config, Arc::new(LoggingPlayback))
        .context("Failed to set up WebRTC")?;

    let (runtime, mut handle) = ClientRuntime::connect(
        &args.server,
        &args.name,
        mode,
        Arc::new(factory),
        Arc::new(NoCapture),
    )
    .await?;
    let session = tokio::spawn(runtime.run());

    loop {
        tokio::select! {
            event = handle.next_event() => {
                match event {
                    Some(ClientEvent::Joined { room_code, is_admin, .. }) => {
                        println!("{} {}", "✅ Joined room".green().bold(), room_code.as_str().bold());
                        if is_admin {
                            println!("   Share this code with the other devices.");
                        }
                    }
                    Some(ClientEvent::Roster(peers)) => {
                        println!("👥 {}/7 in room", peers.len());
                        for peer in peers {
                            let role = if peer.is_broadcaster {
                                "broadcaster"
                            } else if peer.is_admin {
                                "admin"
                            } else {
                                "listener"
                            };
                            println!("   {} ({})", peer.name, role);
                        }
                    }
                    Some(ClientEvent::BroadcasterChanged(Some(id))) => {
                        info!("Broadcaster is now {}", id);
                    }
                    Some(ClientEvent::BroadcasterChanged(None)) => {
                        println!("{}", "📴 Broadcast stopped".yellow());
                    }
                    Some(ClientEvent::Rejected(message)) => {
                        println!("{} {}", "❌".red(), message.red());
                    }
                    Some(ClientEvent::Disconnected) | None => break,
                    Some(other) => info!("{:?}", other),
                }
            }

            _ = tokio::signal::ctrl_c() => {
                handle.send(ClientCommand::Leave);
            }
        }
    }

    session.await.context("Listener task panicked")?
}
