//! Restart running containers once the interval declared in their environment has elapsed
mod cli;
mod config;
mod docker;
mod interval;
mod poller;
mod runtime;
mod tracker;

use crate::cli::configure_cli;
use crate::docker::DockerHandler;
use crate::poller::Poller;
use chrono::Local;
use env_logger::Env;
use log::{error, info};
use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + 'static>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    #[cfg(target_os = "linux")]
    set_group_id();

    let config = configure_cli();
    info!("Starting container-restarter");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping after the current check...");
        r.store(false, Ordering::SeqCst);
    })?;

    let docker = DockerHandler::new(config.stop_timeout)?;
    let mut poller = Poller::new(docker, config.call_timeout, Local::now());

    info!(
        "checking every {} seconds",
        config.poll_interval.as_secs()
    );
    poller.run(config.poll_interval, running).await;
    Ok(())
}

#[cfg(target_os = "linux")]
fn set_group_id() {
    let docker_gid = match env::var("DOCKER_GID")
        .unwrap_or_else(|_| "999".to_string())
        .parse::<u32>()
    {
        Ok(gid) => gid,
        Err(e) => {
            error!("Invalid DOCKER_GID: {e}");
            return;
        }
    };
    info!("Setting GID to {docker_gid}");
    // requires CAP_SETGID
    unsafe {
        if libc::setgid(docker_gid) != 0 {
            error!("Failed to set GID to {docker_gid}");
        }
    }
}
