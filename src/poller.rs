use crate::config::RestartConfig;
use crate::runtime::{ContainerName, ContainerRecord, ContainerRuntime, RuntimeError};
use crate::tracker::{Decision, Timestamp, TrackerState, evaluate};
use chrono::Local;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::time::{sleep, timeout};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Stats {
    pub(crate) cycles: u64,
    pub(crate) inventory_failures: u64,
    pub(crate) restarts_issued: u64,
    pub(crate) restarts_failed: u64,
    pub(crate) daily_resets: u64,
    pub(crate) tracked: usize,
}

/// Outcome of one successful cycle.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct CycleReport {
    pub(crate) restarted: Vec<ContainerName>,
    pub(crate) failed: Vec<ContainerName>,
    pub(crate) rejected: Vec<ContainerName>,
    pub(crate) reset: bool,
}

pub(crate) struct Poller<R: ContainerRuntime> {
    runtime: R,
    state: TrackerState,
    stats: Stats,
    call_timeout: Duration,
}

impl<R: ContainerRuntime> Poller<R> {
    pub(crate) fn new(runtime: R, call_timeout: Duration, now: Timestamp) -> Self {
        Self {
            runtime,
            state: TrackerState::new(now.date_naive()),
            stats: Stats::default(),
            call_timeout,
        }
    }

    pub(crate) fn stats(&self) -> &Stats {
        &self.stats
    }

    pub(crate) fn state(&self) -> &TrackerState {
        &self.state
    }

    /// Fetch the inventory, evaluate every container and restart the due ones.
    ///
    /// Only an inventory failure aborts the cycle; per-container problems are logged
    /// and show up in the returned report.
    pub(crate) async fn run_cycle(&mut self, now: Timestamp) -> Result<CycleReport, RuntimeError> {
        self.stats.cycles += 1;
        info!("checking for containers that need to be restarted");

        let containers = match self.with_timeout(self.runtime.running_containers()).await {
            Ok(containers) => containers,
            Err(e) => {
                self.stats.inventory_failures += 1;
                error!("failed to fetch running containers: {e}");
                return Err(e);
            }
        };
        info!("found {} running containers", containers.len());

        let mut report = CycleReport::default();
        for container in &containers {
            self.process(container, now, &mut report).await;
        }

        report.reset = self.state.roll_over(now.date_naive());
        if report.reset {
            self.stats.daily_resets += 1;
        }
        self.stats.tracked = self.state.len();
        debug!(
            "tracked containers: {}",
            serde_json::to_string_pretty(&self.state.snapshot()).unwrap_or_default()
        );
        Ok(report)
    }

    async fn process(&mut self, container: &ContainerRecord, now: Timestamp, report: &mut CycleReport) {
        let name = &container.name;
        let config = match RestartConfig::from_env(&container.env) {
            Ok(config) => config,
            Err(e) => {
                warn!("skipping container `{name}` this cycle: {e}");
                report.rejected.push(name.clone());
                return;
            }
        };
        debug!("container `{name}`: {config:?}");

        if evaluate(name, &config, now, &mut self.state) != Decision::RestartDue {
            return;
        }

        self.stats.restarts_issued += 1;
        match self.with_timeout(self.runtime.restart(name)).await {
            Ok(()) => {
                info!("container `{name}` has been restarted");
                report.restarted.push(name.clone());
            }
            Err(e) => {
                self.stats.restarts_failed += 1;
                error!("failed to restart container `{name}`: {e}");
                if self.state.revert_restart(name) {
                    debug!("container `{name}` stays due for the next cycle");
                }
                report.failed.push(name.clone());
            }
        }
    }

    async fn with_timeout<T>(
        &self,
        call: impl Future<Output = Result<T, RuntimeError>>,
    ) -> Result<T, RuntimeError> {
        timeout(self.call_timeout, call)
            .await
            .unwrap_or(Err(RuntimeError::Timeout(self.call_timeout)))
    }

    /// Runs cycles until `running` is cleared, sleeping `poll_interval` between them.
    pub(crate) async fn run(&mut self, poll_interval: Duration, running: Arc<AtomicBool>) {
        while running.load(Ordering::SeqCst) {
            let started = Instant::now();
            if let Ok(report) = self.run_cycle(Local::now()).await {
                info!(
                    "cycle finished: {} restarted, {} failed, {} skipped for bad config{}",
                    report.restarted.len(),
                    report.failed.len(),
                    report.rejected.len(),
                    if report.reset { ", tracking reset" } else { "" }
                );
                self.log_stats();
            }

            info!("sleeping for {} seconds", poll_interval.as_secs());
            while running.load(Ordering::SeqCst) && started.elapsed() < poll_interval {
                sleep(Duration::from_millis(500)).await;
            }
        }
        info!("stopped after {} cycles", self.stats.cycles);
    }

    pub(crate) fn log_stats(&self) {
        let stats = self.stats();
        info!(
            "cycles={} tracked={} restarts_issued={} restarts_failed={} inventory_failures={} daily_resets={} (since {})",
            stats.cycles,
            stats.tracked,
            stats.restarts_issued,
            stats.restarts_failed,
            stats.inventory_failures,
            stats.daily_resets,
            self.state().epoch_date()
        );
    }
}
