//! padpipe daemon: poll a gamepad at a fixed rate, render a console
//! dashboard, and republish every snapshot over the local IPC channel.

use std::io::Write as _;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{error, info, warn};

use padpipe::ipc::ChannelAddr;
use padpipe::{backends, render, BackendKind, Config, IpcServer, PollLoop, StateBus};

/// Grace period for worker threads to unwind after shutdown is requested.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(
    name = "padpipe",
    about = "Gamepad monitor with a local JSON IPC channel",
    version
)]
struct Args {
    /// Poll/refresh rate in Hz
    #[arg(long)]
    hz: Option<u32>,

    /// Channel name consumers connect to
    #[arg(long)]
    channel: Option<String>,

    /// Controller slot (0-3)
    #[arg(long)]
    device: Option<u32>,

    /// Input backend (xinput | scripted)
    #[arg(long)]
    backend: Option<BackendKind>,

    /// TOML config file
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

fn build_config(args: &Args) -> padpipe::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_file(path)?,
        None => Config::default(),
    };
    config.apply_env()?;
    if let Some(hz) = args.hz {
        config.tick_hz = hz;
    }
    if let Some(channel) = &args.channel {
        config.channel = channel.clone();
    }
    if let Some(device) = args.device {
        config.device_index = device;
    }
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    config.validate()?;
    Ok(config)
}

fn main() {
    // Logs go to stderr; stdout belongs to the dashboard.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match build_config(&args) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "invalid configuration");
            process::exit(2);
        }
    };

    let mut backend = match backends::create(&config) {
        Ok(backend) => backend,
        Err(err) => {
            error!(%err, "no usable input backend");
            process::exit(1);
        }
    };
    if let Err(err) = backend.init() {
        // Without a backend no snapshot can ever be produced.
        error!(%err, "input backend failed to start");
        process::exit(1);
    }

    let bus = Arc::new(StateBus::new());
    let shutdown = Arc::new(AtomicBool::new(false));

    {
        let bus = Arc::clone(&bus);
        let shutdown = Arc::clone(&shutdown);
        if let Err(err) = ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Relaxed);
            bus.close();
        }) {
            error!(%err, "failed to install Ctrl+C handler");
            process::exit(1);
        }
    }

    let addr = ChannelAddr::from_name(&config.channel);
    info!(channel = %addr, hz = config.tick_hz, "starting");

    let server = IpcServer::new(
        addr,
        Arc::clone(&bus),
        Arc::clone(&shutdown),
        config.bind_backoff(),
    );
    let server_thread = match std::thread::Builder::new()
        .name("ipc-server".into())
        .spawn(move || server.run())
    {
        Ok(handle) => handle,
        Err(err) => {
            error!(%err, "failed to spawn ipc server thread");
            process::exit(1);
        }
    };

    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "{}{}", render::CLEAR_SCREEN, render::CURSOR_HOME);

    let hz = config.tick_hz;
    let channel = config.channel.clone();
    let poll_loop = PollLoop::new(
        backend,
        Arc::clone(&bus),
        Arc::clone(&shutdown),
        config.tick(),
    );
    poll_loop.run(move |snapshot| {
        let frame = render::dashboard(snapshot, hz, &channel);
        let _ = write!(stdout, "{}{}", render::CURSOR_HOME, frame);
        let _ = stdout.flush();
    });

    // The poll loop exited; make sure the server unblocks too.
    bus.close();
    let deadline = Instant::now() + SHUTDOWN_GRACE;
    while !server_thread.is_finished() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    if server_thread.is_finished() {
        let _ = server_thread.join();
        info!("shutdown complete");
    } else {
        // Forced termination beats a hung unwind once the grace period is up.
        warn!("shutdown grace period expired, terminating");
        process::exit(0);
    }
}
