mod config;
mod session;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::HudConfig;
use hud_feed_core::{channel, MemoryParams, ParamStore, StateSource, UpdateTx};
use hud_feed_udp::{UdpConfig, UdpSource};
use hud_io::ReplaySource;
use session::HudSession;

/// Headless on-road HUD: renders state updates into layered draw lists.
#[derive(Parser, Debug)]
#[command(name = "onroad-hud", version)]
struct Cli {
    /// Config file (defaults to <config dir>/onroad-hud/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// UDP address to receive state updates on
    #[arg(long)]
    bind: Option<String>,

    /// Replay a recorded NDJSON update stream instead of listening on UDP
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Write every painted frame as NDJSON (file, or directory for a per-session file)
    #[arg(long)]
    dump_frames: Option<PathBuf>,

    /// Write frame timings as CSV
    #[arg(long)]
    timings: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,
}

fn spawn_source<S: StateSource + 'static>(src: S, tx: UpdateTx) {
    tokio::spawn(async move {
        if let Err(e) = src.run(tx).await {
            warn!(error = %e, "state source stopped");
        }
    });
}

fn frames_path(dump: &Path, session_id: uuid::Uuid) -> PathBuf {
    if dump.is_dir() {
        dump.join(format!("frames-{session_id}.ndjson"))
    } else {
        dump.to_path_buf()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut cfg = HudConfig::load(cli.config.as_deref())?;
    if let Some(bind) = &cli.bind {
        cfg.bind_addr = bind.clone();
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cfg.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let params = Arc::new(MemoryParams::new());
    for (k, v) in &cfg.params {
        params.put(k, v);
    }

    let fl_cfg = cfg.frame_loop();
    let period = Duration::from_secs_f64(1.0 / f64::from(fl_cfg.ui_freq));
    let (tx, rx) = channel();
    match &cli.replay {
        Some(path) => {
            let src = ReplaySource::from_path(path, fl_cfg.ui_freq)?;
            info!(path = %path.display(), updates = src.len(), "replaying");
            spawn_source(src, tx);
        }
        None => spawn_source(UdpSource::new(UdpConfig { bind_addr: cfg.bind_addr.clone(), ..Default::default() }), tx),
    }

    let session = HudSession::new(fl_cfg, params, rx, cli.dump_frames.is_some(), cli.timings.is_some());
    info!(session = %session.id, ui_freq = cfg.ui_freq_hz, "hud started");

    let mut refresh = tokio::time::interval(period);
    let mut record = tokio::time::interval(period);
    let mut painted = 0u64;
    loop {
        tokio::select! {
            _ = refresh.tick() => {
                if !session.tick(Instant::now()) {
                    info!("state feed closed");
                    break;
                }
                painted += 1;
                if cli.frames.is_some_and(|n| painted >= n) {
                    break;
                }
            }
            _ = record.tick() => session.record_tick(),
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }
    session.go_offroad();

    let inner = session.inner.lock();
    if let Some(dump) = &cli.dump_frames {
        let path = frames_path(dump, session.id);
        hud_io::export_frames_ndjson(&inner.frames, &path)
            .with_context(|| format!("dump frames to {}", path.display()))?;
    }
    if let Some(path) = &cli.timings {
        hud_io::export_timings_csv(&inner.timings, path)?;
    }
    println!("painted {} frames ({} slow)", painted, inner.slow_frames);
    Ok(())
}
