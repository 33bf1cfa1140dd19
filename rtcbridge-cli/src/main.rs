use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use rtcbridge::convert::{HostValue, ToHost};
use rtcbridge::host::webrtc_rs::{EngineConfig, WebRtcEngine};
use rtcbridge::host::{PeerConnectionFactory, RtcDataChannel, RtcPeerConnection};
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::LocalSet;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rtcbridge")]
#[command(about = "Drives WebRTC connections through the rtcbridge event bridge")]
struct Cli {
    /// Log bridge internals at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connects two in-process peers and exchanges a message over a data channel.
    Loopback {
        #[arg(long, default_value = "chat")]
        label: String,

        #[arg(short, long, default_value = "hello through the bridge")]
        message: String,

        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,

        /// Gather host candidates only.
        #[arg(long)]
        no_stun: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start host runtime")?;
    let local = LocalSet::new();

    match cli.command {
        Commands::Loopback {
            label,
            message,
            timeout_secs,
            no_stun,
        } => local.block_on(
            &runtime,
            run_loopback(label, message, Duration::from_secs(timeout_secs), no_stun),
        ),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "rtcbridge_host=debug,warn"
    } else {
        "rtcbridge_host=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn run_loopback(label: String, message: String, timeout: Duration, no_stun: bool) -> Result<()> {
    println!("{}", "🚀 Starting loopback through the bridge...".green().bold());

    let engine = WebRtcEngine::new(EngineConfig::default())?;
    let factory = PeerConnectionFactory::with_teardown(engine, || {
        println!("{}", "🧹 Engine released".dimmed());
    });

    let configuration = if no_stun {
        json!({ "iceServers": [] })
    } else {
        HostValue::Null
    };
    let offerer = RtcPeerConnection::new(&factory, Some(&configuration))?;
    let answerer = RtcPeerConnection::new(&factory, Some(&configuration))?;
    println!(
        "   🔌 {} connections on one factory",
        factory.live_connections().to_string().bold()
    );

    watch_states("offerer", &offerer);
    watch_states("answerer", &answerer);
    trickle_candidates(&offerer, &answerer);
    trickle_candidates(&answerer, &offerer);

    let (received_tx, mut received_rx) = mpsc::unbounded_channel::<String>();
    answerer.on_data_channel(|channel: &RtcDataChannel| {
        println!("{} remote channel '{}'", "[answerer]".magenta(), channel.label().bold());
        let echo = channel.clone();
        channel.on_message(move |event| {
            let text = event["data"].as_str().unwrap_or_default();
            if let Err(e) = echo.send_text(&format!("echo: {text}")) {
                warn!("Echo failed: {}", e);
            }
        });
    });

    offerer.spawn_dispatch();
    answerer.spawn_dispatch();

    let channel = offerer.create_data_channel(&label, None)?;
    let opened = channel.clone();
    let outgoing = message.clone();
    channel.on_open(move |_| {
        println!("{} channel '{}' open", "[offerer]".cyan(), opened.label().bold());
        if let Err(e) = opened.send_text(&outgoing) {
            warn!("Send failed: {}", e);
        }
    });
    channel.on_message(move |event| {
        let text = event["data"].as_str().unwrap_or_default().to_owned();
        let _ = received_tx.send(text);
    });

    println!("{}", "📦 Negotiating...".cyan());
    let offer = offerer.create_offer(None)?.await?;
    offerer.set_local_description(&offer.to_host())?.await?;
    answerer.set_remote_description(&offer.to_host())?.await?;
    let answer = answerer.create_answer(None)?.await?;
    answerer.set_local_description(&answer.to_host())?.await?;
    offerer.set_remote_description(&answer.to_host())?.await?;

    let reply = tokio::time::timeout(timeout, received_rx.recv())
        .await
        .context("Timed out waiting for the echo")?
        .context("Data channel closed before the echo arrived")?;
    println!("{} {}", "✨ Received:".green().bold(), reply);

    let (stats_tx, mut stats_rx) = mpsc::unbounded_channel::<HostValue>();
    offerer.get_stats(move |stats| {
        let _ = stats_tx.send(stats.clone());
    })?;
    if let Ok(Some(stats)) = tokio::time::timeout(timeout, stats_rx.recv()).await {
        let reports = stats["result"].as_array().map(Vec::len).unwrap_or_default();
        println!("   📊 {} stats reports", reports.to_string().bold());
    }

    offerer.close();
    answerer.close();
    println!(
        "{} offerer {}, answerer {}",
        "✅ Closed:".green().bold(),
        offerer.signaling_state(),
        answerer.signaling_state()
    );
    Ok(())
}

fn watch_states(name: &'static str, connection: &RtcPeerConnection) {
    let tag = format!("[{name}]");
    let tag = if name == "offerer" { tag.cyan() } else { tag.magenta() };

    let t = tag.clone();
    connection.on_signaling_state_change(move |state| {
        println!("{} signaling {}", t, state.as_str().unwrap_or_default().yellow());
    });
    let t = tag.clone();
    connection.on_ice_connection_state_change(move |state| {
        println!("{} ice {}", t, state.as_str().unwrap_or_default().yellow());
    });
    let t = tag.clone();
    connection.on_ice_gathering_state_change(move |state| {
        println!("{} gathering {}", t, state.as_str().unwrap_or_default().yellow());
    });
    connection.on_connection_state_change(move |state| {
        println!("{} connection {}", tag, state.as_str().unwrap_or_default().green());
    });
}

fn trickle_candidates(from: &RtcPeerConnection, to: &RtcPeerConnection) {
    let to = to.clone();
    from.on_ice_candidate(move |candidate| {
        let added = match to.add_ice_candidate(candidate) {
            Ok(added) => added,
            Err(e) => {
                warn!("Rejected candidate {}: {}", candidate, e);
                return;
            }
        };
        tokio::task::spawn_local(async move {
            if let Err(e) = added.await {
                warn!("Failed to add candidate: {}", e);
            }
        });
    });
}
