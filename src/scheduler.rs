use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::crawl::{CrawlCycle, CycleReport};
use crate::utils::error::{AppError, Result};

/// Something the scheduler can run once per tick.
#[async_trait]
pub trait CycleRunner: Send + Sync {
    async fn run(&self) -> Result<CycleReport>;
}

#[async_trait]
impl CycleRunner for CrawlCycle {
    async fn run(&self) -> Result<CycleReport> {
        CrawlCycle::run(self).await
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerStats {
    pub completed_runs: u64,
    pub failed_runs: u64,
    pub skipped_ticks: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub last_report: Option<CycleReport>,
    pub uptime_seconds: u64,
}

struct CycleGuard<'a>(&'a AtomicBool);

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runner plus bookkeeping shared between the scheduled job and manual runs.
struct CycleState {
    runner: Arc<dyn CycleRunner>,
    in_flight: AtomicBool,
    stats: RwLock<SchedulerStats>,
}

impl CycleState {
    fn new(runner: Arc<dyn CycleRunner>) -> Self {
        Self {
            runner,
            in_flight: AtomicBool::new(false),
            stats: RwLock::new(SchedulerStats::default()),
        }
    }

    /// Runs one cycle unless another is still in flight.
    async fn execute(&self) -> Result<CycleReport> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.stats.write().await.skipped_ticks += 1;
            tracing::warn!("Previous crawl cycle still running, skipping this tick");
            return Err(AppError::Scheduler("crawl cycle already in progress".to_string()));
        }
        let _guard = CycleGuard(&self.in_flight);

        let result = self.runner.run().await;

        let mut stats = self.stats.write().await;
        stats.last_run = Some(Utc::now());
        match &result {
            Ok(report) => {
                stats.completed_runs += 1;
                stats.last_report = Some(report.clone());
            }
            Err(e) => {
                stats.failed_runs += 1;
                tracing::error!("Crawl cycle failed: {}", e);
            }
        }
        result
    }
}

/// Drives the crawl cycle at a fixed interval.
pub struct MonitorScheduler {
    scheduler: JobScheduler,
    state: Arc<CycleState>,
    interval: Duration,
    start_time: DateTime<Utc>,
}

impl MonitorScheduler {
    pub async fn new(runner: Arc<dyn CycleRunner>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(AppError::Scheduler("interval must be greater than zero".to_string()));
        }
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            scheduler,
            state: Arc::new(CycleState::new(runner)),
            interval,
            start_time: Utc::now(),
        })
    }

    /// Registers the repeating job and starts ticking. The first cycle runs one interval from now.
    pub async fn start(&mut self) -> Result<()> {
        let state = Arc::clone(&self.state);
        let job = Job::new_repeated_async(self.interval, move |_uuid, _l| {
            let state = Arc::clone(&state);
            Box::pin(async move {
                // Errors are already counted and logged; the schedule keeps going.
                let _ = state.execute().await;
            })
        })?;

        self.scheduler.add(job).await?;
        self.scheduler.start().await?;
        tracing::info!("Monitor scheduler started, crawling every {}s", self.interval.as_secs());
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        tracing::info!("Monitor scheduler shutdown");
        Ok(())
    }

    /// Runs a cycle immediately, outside the schedule.
    pub async fn run_now(&self) -> Result<CycleReport> {
        tracing::info!("Running immediate crawl cycle");
        self.state.execute().await
    }

    pub fn is_running(&self) -> bool {
        self.state.in_flight.load(Ordering::Acquire)
    }

    pub async fn stats(&self) -> SchedulerStats {
        let mut stats = self.state.stats.read().await.clone();
        stats.uptime_seconds = Utc::now().signed_duration_since(self.start_time).num_seconds().max(0) as u64;
        stats
    }
}
