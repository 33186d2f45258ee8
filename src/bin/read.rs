//! padpipe-read: attach to a running padpipe daemon and print decoded
//! snapshots, one per line.
//!
//! Starts before or after the daemon; connecting retries until the
//! channel endpoint appears. A malformed frame is logged and skipped,
//! never fatal.

use std::process;

use clap::Parser;
use tracing::{error, info, warn};

use padpipe::client::decode_frame;
use padpipe::ipc::ChannelAddr;
use padpipe::{ClientTransport, Config, LocalChannelClient};

#[derive(Parser, Debug)]
#[command(
    name = "padpipe-read",
    about = "Read snapshots from a padpipe channel",
    version
)]
struct Args {
    /// Channel name the daemon publishes on
    #[arg(long)]
    channel: Option<String>,

    /// Interval between connect attempts in milliseconds
    #[arg(long)]
    retry_ms: Option<u64>,

    /// Give up connecting after this many milliseconds (0 = wait forever)
    #[arg(long)]
    timeout_ms: Option<u64>,
}

fn build_config(args: &Args) -> padpipe::Result<Config> {
    let mut config = Config::default();
    config.apply_env()?;
    if let Some(channel) = &args.channel {
        config.channel = channel.clone();
    }
    if let Some(retry_ms) = args.retry_ms {
        config.connect_retry_ms = retry_ms;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.connect_timeout_ms = timeout_ms;
    }
    config.validate()?;
    Ok(config)
}

fn main() {
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

    let addr = ChannelAddr::from_name(&config.channel);
    let mut client =
        LocalChannelClient::new(addr, config.connect_retry(), config.connect_timeout());

    info!(channel = %config.channel, "waiting for channel");
    if let Err(err) = client.connect() {
        error!(%err, "could not attach to channel");
        process::exit(1);
    }
    info!("attached");

    loop {
        match client.recv_frame() {
            Ok(Some(frame)) => match decode_frame(&frame) {
                Ok(snapshot) => println!("{snapshot:?}"),
                Err(err) => warn!(%err, "skipping malformed frame"),
            },
            Ok(None) => {
                info!("stream ended");
                break;
            }
            Err(err) => {
                error!(%err, "channel read failed");
                process::exit(1);
            }
        }
    }
    client.close();
}
