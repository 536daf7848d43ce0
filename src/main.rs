use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use tessel::blocks::{BRICK, GLASS};
use tessel::{
    DurableStore, FileStore, MemoryStore, ObserverState, OfflineRemote, Session, TesselConfig, View,
    WorldLoader,
};

#[derive(Parser)]
#[command(
    name = "tessel",
    about = "Headless voxel world driver: streams, meshes and persists chunks around a walking observer"
)]
struct Cli {
    /// TOML config file; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Frames to simulate
    #[arg(long, default_value_t = 240)]
    frames: u32,
    /// Override the worker count
    #[arg(long)]
    workers: Option<usize>,
    /// Log filter, e.g. "info" or "info,perf=trace"
    #[arg(long, default_value = "info")]
    log: String,
    /// Blocks walked toward -Z per frame
    #[arg(long, default_value_t = 0.5)]
    walk: f32,
    /// Override the terrain seed
    #[arg(long)]
    seed: Option<i32>,
    /// World file; edits and the observer pose persist across runs. In-memory when omitted
    #[arg(long)]
    db: Option<PathBuf>,
}

const FRAME: Duration = Duration::from_millis(16);
/// Frames between scripted edits.
const EDIT_EVERY: u32 = 60;

fn main() {
    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("tessel: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .parse_filters(&cli.log)
        .parse_env("RUST_LOG")
        .init();

    let mut config = match &cli.config {
        Some(path) => TesselConfig::load_from_path(path)?,
        None => TesselConfig::default(),
    };
    if let Some(n) = cli.workers {
        config.workers = n;
    }
    if let Some(seed) = cli.seed {
        config.terrain.seed = seed;
    }

    let store: Arc<dyn DurableStore> = match &cli.db {
        Some(path) => Arc::new(FileStore::open(path)?),
        None => Arc::new(MemoryStore::new()),
    };
    let loader = Arc::new(WorldLoader::new(config.terrain.clone(), store.clone()));
    let mut view = match store.load_state()? {
        Some(s) => {
            log::info!("resuming at ({:.1},{:.1},{:.1})", s.x, s.y, s.z);
            View::new(s.x, s.y, s.z).looking(s.rx, s.ry)
        }
        None => {
            let (spawn_h, _) = loader.terrain().column(0, 0);
            View::new(0.0, (spawn_h + 2) as f32, 0.0)
        }
    };
    let mut session = Session::new(config, loader, store.clone(), Arc::new(OfflineRemote))?;

    let t0 = Instant::now();
    for frame in 0..cli.frames {
        let frame_start = Instant::now();
        session.ensure(&view);
        if frame > 0 && frame % EDIT_EVERY == 0 {
            let x = view.position.x.round() as i32;
            let z = view.position.z.round() as i32 - 3;
            let y = session.highest_block(x as f32, z as f32) + 1;
            session.builder_block(x, y, z, if frame % (2 * EDIT_EVERY) == 0 { BRICK } else { GLASS });
            session.toggle_light(x, y + 1, z);
            log::info!(target: "events", "frame={} placed block at ({},{},{})", frame, x, y, z);
        }
        let pending = session.drain_queue();
        let visible = session.visible_chunks(&view);
        let faces: usize = visible.iter().map(|c| c.faces).sum();
        log::debug!(
            target: "perf",
            "frame={} ms={:.2} visible={} faces={} pending_writes={}",
            frame,
            frame_start.elapsed().as_secs_f32() * 1000.0,
            visible.len(),
            faces,
            pending
        );
        view.position.z -= cli.walk;
        let ground = session.highest_block(view.position.x, view.position.z);
        if ground >= 0 {
            view.position.y = (ground + 2) as f32;
        }
        thread::sleep(FRAME.saturating_sub(frame_start.elapsed()));
    }

    let stats = session.stats();
    log::info!(
        "ran {} frames in {:.2}s chunks={} meshed={} dirty={} faces={} busy_workers={}",
        cli.frames,
        t0.elapsed().as_secs_f32(),
        stats.chunks,
        stats.meshed,
        stats.dirty,
        stats.faces,
        stats.busy_workers
    );
    session.shutdown();
    store.save_state(ObserverState {
        x: view.position.x,
        y: view.position.y,
        z: view.position.z,
        rx: view.rx,
        ry: view.ry,
    })?;
    store.commit()?;
    if let Some(path) = &cli.db {
        log::info!(target: "persist", "saved {}", path.display());
    }
    Ok(())
}
