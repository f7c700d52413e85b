use crate::config::RestartConfig;
use chrono::{DateTime, Local, NaiveDate};
use log::{debug, info};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::collections::hash_map::Entry;

pub(crate) type Timestamp = DateTime<Local>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    /// Not opted in this cycle; no tracking side effects.
    Skip,
    /// Tracked, but the interval has not elapsed yet.
    TrackOnly,
    /// Interval elapsed; the baseline has already been moved to `now`.
    RestartDue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TrackedContainer {
    pub(crate) name: String,
    pub(crate) last_restart: Timestamp,
    previous_restart: Option<Timestamp>,
}

/// Per-container restart baselines, reset once per calendar day.
#[derive(Debug)]
pub(crate) struct TrackerState {
    tracked: HashMap<String, TrackedContainer>,
    epoch_date: NaiveDate,
}

impl TrackerState {
    pub(crate) fn new(today: NaiveDate) -> Self {
        Self {
            tracked: HashMap::new(),
            epoch_date: today,
        }
    }

    #[cfg(test)]
    pub(crate) fn get(&self, name: &str) -> Option<&TrackedContainer> {
        self.tracked.get(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.tracked.len()
    }

    pub(crate) fn epoch_date(&self) -> NaiveDate {
        self.epoch_date
    }

    /// Undo the baseline advance of the last `RestartDue` for `name`, so a restart
    /// that never happened is retried on the next cycle.
    pub(crate) fn revert_restart(&mut self, name: &str) -> bool {
        match self.tracked.get_mut(name) {
            Some(entry) => match entry.previous_restart.take() {
                Some(previous) => {
                    entry.last_restart = previous;
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    /// Clears every entry once the calendar date moves past `epoch_date`.
    pub(crate) fn roll_over(&mut self, today: NaiveDate) -> bool {
        if today <= self.epoch_date {
            return false;
        }
        info!(
            "date changed from {} to {today}, resetting {} tracked containers",
            self.epoch_date,
            self.tracked.len()
        );
        self.tracked.clear();
        self.epoch_date = today;
        true
    }

    pub(crate) fn snapshot(&self) -> Value {
        let mut entries: Vec<&TrackedContainer> = self.tracked.values().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        let containers: Vec<Value> = entries
            .into_iter()
            .map(|entry| {
                json!({
                    "name": entry.name,
                    "last_restart": entry.last_restart.to_rfc3339(),
                })
            })
            .collect();
        json!({
            "epoch_date": self.epoch_date.to_string(),
            "tracked": containers,
        })
    }
}

pub(crate) fn evaluate(
    container_name: &str,
    config: &RestartConfig,
    now: Timestamp,
    state: &mut TrackerState,
) -> Decision {
    let RestartConfig::Enabled(interval) = config else {
        return Decision::Skip;
    };

    let entry = match state.tracked.entry(container_name.to_string()) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(vacant) => {
            info!("tracking container `{container_name}` (interval {interval}), baseline {now}");
            vacant.insert(TrackedContainer {
                name: container_name.to_string(),
                last_restart: now,
                previous_restart: None,
            });
            return Decision::TrackOnly;
        }
    };

    // a wall clock stepping backwards yields a negative delta, which is never due
    let elapsed = now.signed_duration_since(entry.last_restart);
    match elapsed.to_std() {
        Ok(elapsed) if elapsed > interval.as_duration() => {
            info!(
                "container `{container_name}` is due: {}s elapsed, interval {interval}",
                elapsed.as_secs()
            );
            entry.previous_restart = Some(entry.last_restart);
            entry.last_restart = now;
            Decision::RestartDue
        }
        _ => {
            debug!(
                "container `{container_name}` has not reached its interval {interval} yet ({}s elapsed)",
                elapsed.num_seconds()
            );
            Decision::TrackOnly
        }
    }
}
