use drift_server::assets;
use drift_server::clock::FrameClock;
use drift_server::config::ServerConfig;
use drift_server::error::StartupError;
use drift_server::net::serve_viewers;
use drift_server::physics::SimulationWorld;
use drift_server::render::{DrawList, RenderStyle};
use drift_server::state::{FrameMessage, SharedSimState};

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::time::{MissedTickBehavior, interval};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    // -------------------------------
    // Startup (any failure is fatal)
    // -------------------------------
    let server = ServerConfig::from_env()?;
    let sim_config = server.load_simulation_config()?;
    let sprite = assets::provider_for(server.sprite_path.as_deref()).load_sprite()?;
    tracing::info!(sprite = sprite.id(), "sprite loaded");

    let listener = TcpListener::bind(server.bind_addr)
        .await
        .map_err(|source| StartupError::Bind {
            addr: server.bind_addr,
            source,
        })?;

    let state = Arc::new(Mutex::new(SharedSimState::with_arena(
        server.arena,
        server.pointer_idle,
    )));
    tokio::spawn(serve_viewers(listener, Arc::clone(&state)));

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested");
                shutdown.store(true, Ordering::Relaxed);
            }
        });
    }

    // -------------------------------
    // Frame loop
    // -------------------------------
    let mut world = SimulationWorld::new(sim_config);
    let style = RenderStyle::default();
    let mut clock = FrameClock::start(server.max_delta_time);

    // Pacing only; dt is always the measured delta.
    let mut ticker = interval(server.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        tick_ms = server.tick_interval.as_millis() as u64,
        max_dt = ?server.max_delta_time,
        capacity = world.trail.buffer().capacity(),
        "simulation running"
    );

    loop {
        ticker.tick().await;
        let dt = clock.tick();

        let mut shared = state.lock().await;
        let target = shared.pointer.target(world.vehicle.position, Instant::now());

        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        let report = world.step(target, dt);

        let mut frame = DrawList::default();
        world.render(&mut frame, &style, &sprite);

        let msg = FrameMessage::new(
            world.tick,
            &world.vehicle,
            target,
            &report,
            world.trail.buffer(),
            &frame,
        );
        shared.broadcast_frame(&msg);
    }

    tracing::info!(ticks = world.tick, "simulation stopped");
    Ok(())
}
