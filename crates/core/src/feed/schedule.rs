use std::{sync::Arc, time::Duration};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::debug;

use super::{FeedEvent, RefreshKind};
use crate::{config::PollConfig, dates::DateKey, gateway::ScoreSource};

/// The two refresh timers.
///
/// Both share the same fetch/merge entry point on the UI loop. When their
/// ticks coincide, both fetches run and their results merge last-writer-wins
/// per date.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    active: Duration,
    full: Duration,
}

impl Schedule {
    /// Timers with explicit periods.
    pub fn new(active: Duration, full: Duration) -> Self {
        Self { active, full }
    }

    /// Timers described by the `[poll]` config section.
    pub fn from_config(config: &PollConfig) -> Self {
        Self::new(config.active_interval(), config.full_interval())
    }

    /// Period of the active-tab refresh.
    pub fn active(&self) -> Duration {
        self.active
    }

    /// Period of the full refresh.
    pub fn full(&self) -> Duration {
        self.full
    }

    /// Start both timers. Each first fires one period from now.
    pub fn spawn(self, sender: mpsc::Sender<FeedEvent>) -> ScheduleHandle {
        let tasks = vec![
            tokio::spawn(tick_loop(self.active, RefreshKind::Active, sender.clone())),
            tokio::spawn(tick_loop(self.full, RefreshKind::Full, sender)),
        ];
        ScheduleHandle { tasks }
    }
}

/// Aborts the timer tasks when dropped.
#[derive(Debug)]
pub struct ScheduleHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl Drop for ScheduleHandle {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

async fn tick_loop(period: Duration, kind: RefreshKind, sender: mpsc::Sender<FeedEvent>) {
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        debug!(?kind, "refresh timer fired");
        if sender.send(FeedEvent::Refresh(kind)).await.is_err() {
            break;
        }
    }
}

/// Run one fetch in the background and report its completion.
pub fn spawn_fetch<S: ScoreSource>(
    source: Arc<S>,
    kind: RefreshKind,
    dates: Vec<DateKey>,
    sender: mpsc::Sender<FeedEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = source.fetch(&dates).await;
        if sender
            .send(FeedEvent::Fetched {
                kind,
                dates,
                result,
            })
            .await
            .is_err()
        {
            debug!(?kind, "feed receiver closed before fetch completed");
        }
    })
}
