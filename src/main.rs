//! reactive-nav binary: wires the control loop to the UDP link.
//!
//! Usage: `reactive-nav [config.toml] [--left-wall | --right-wall]`
//!
//! Without a config path, `reactive-nav.toml` is used if present,
//! otherwise built-in defaults.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reactive_nav::config::NavConfig;
use reactive_nav::control_loop::ControlLoop;
use reactive_nav::error::Result;
use reactive_nav::link::{RangeListener, UdpCommandPublisher};
use reactive_nav::sensors::range_channel;
use tracing::{info, warn};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("reactive_nav=info".parse().unwrap()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    let mut config = if args.len() > 1 && !args[1].starts_with("--") {
        let config_path = Path::new(&args[1]);
        info!("Loading configuration from {:?}", config_path);
        NavConfig::load(config_path)?
    } else if Path::new("reactive-nav.toml").exists() {
        info!("Loading configuration from reactive-nav.toml");
        NavConfig::load(Path::new("reactive-nav.toml"))?
    } else {
        info!("Using default configuration");
        NavConfig::default()
    };

    // Wall-side overrides
    if args.iter().any(|a| a == "--left-wall") {
        config.controller.follow_right_wall = false;
    }
    if args.iter().any(|a| a == "--right-wall") {
        config.controller.follow_right_wall = true;
    }

    info!("reactive-nav v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Following the {} wall: clearance={:.2}m, front threshold={:.2}m, v={:.2}m/s, k_p={}, k_i={}",
        if config.controller.follow_right_wall {
            "right"
        } else {
            "left"
        },
        config.controller.desired_side_clearance_m,
        config.controller.front_threshold_m,
        config.controller.desired_linear_velocity_mps,
        config.controller.k_p,
        config.controller.k_i
    );

    // Ctrl-C sets the shutdown flag; the loops observe it on their next pass
    let shutdown = Arc::new(AtomicBool::new(false));
    let ctrlc_shutdown = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        ctrlc_shutdown.store(true, Ordering::Release);
    })
    .map_err(|e| {
        reactive_nav::error::NavError::Config(format!("Failed to set Ctrl-C handler: {}", e))
    })?;

    // Inbound range channel and UDP listener thread
    let (bus, range_rx) = range_channel();
    let mut listener = RangeListener::bind(&config.link.listen_addr, &bus)?;
    let listener_shutdown = Arc::clone(&shutdown);
    let listener_handle = std::thread::Builder::new()
        .name("range-listener".into())
        .spawn(move || {
            if let Err(e) = listener.run(listener_shutdown) {
                tracing::error!("Range listener error: {}", e);
            }
        })
        .map_err(|e| {
            reactive_nav::error::NavError::Config(format!("Failed to spawn listener: {}", e))
        })?;

    // Outbound command publisher
    let publisher = UdpCommandPublisher::connect(&config.link.command_addr)?;

    // The control loop owns all mutable state and runs on the main thread
    let mut control_loop = ControlLoop::new(config.controller, range_rx, publisher, shutdown);
    control_loop.run()?;

    if listener_handle.join().is_err() {
        warn!("Range listener thread panicked");
    }

    info!("reactive-nav finished");
    Ok(())
}
