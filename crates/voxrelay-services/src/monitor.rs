//! System resource sampling and threshold warnings.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use serde::Serialize;
use sysinfo::{Disks, System};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;

use voxrelay_core::models::round2;
use voxrelay_core::Config;

/// Point-in-time resource usage, as reported by the stats endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResourceStats {
    /// Average CPU usage across all cores, percent.
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub memory_used_mb: f64,
    /// Usage of the filesystem holding the upload directory, percent.
    pub disk_percent: f64,
    pub uptime_secs: f64,
    /// Transcription requests currently in flight.
    pub processing_count: usize,
}

#[derive(Clone)]
pub struct ResourceMonitor {
    system: Arc<std::sync::Mutex<System>>,
    processing: Arc<AtomicUsize>,
    started_at: Instant,
    disk_path: PathBuf,
    max_cpu_usage_percent: f64,
    max_memory_usage_percent: f64,
}

impl ResourceMonitor {
    pub fn new(
        disk_path: PathBuf,
        max_cpu_usage_percent: f64,
        max_memory_usage_percent: f64,
    ) -> Self {
        let mut system = System::new();
        system.refresh_all();

        Self {
            system: Arc::new(std::sync::Mutex::new(system)),
            processing: Arc::new(AtomicUsize::new(0)),
            started_at: Instant::now(),
            disk_path,
            max_cpu_usage_percent,
            max_memory_usage_percent,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.upload_dir.clone(),
            config.max_cpu_usage_percent,
            config.max_memory_usage_percent,
        )
    }

    /// Marks a request as in flight until the guard drops.
    pub fn begin_processing(&self) -> ProcessingGuard {
        self.processing.fetch_add(1, Ordering::SeqCst);
        ProcessingGuard {
            counter: self.processing.clone(),
        }
    }

    pub fn processing_count(&self) -> usize {
        self.processing.load(Ordering::SeqCst)
    }

    /// Seconds since this monitor was constructed at startup.
    pub fn uptime_secs(&self) -> f64 {
        round2(self.started_at.elapsed().as_secs_f64())
    }

    /// Samples current resource usage. Refreshes shared sysinfo state, so
    /// this blocks; prefer [`Self::snapshot_async`] on the runtime.
    pub fn snapshot(&self) -> Result<ResourceStats> {
        let mut system = self.system.lock().map_err(|e| {
            tracing::error!(error = %e, "Failed to acquire system lock for stats");
            anyhow::anyhow!("Failed to read resource stats: mutex poisoned")
        })?;

        system.refresh_memory();
        system.refresh_cpu();

        let total_memory = system.total_memory();
        let used_memory = system.used_memory();
        let memory_percent = if total_memory == 0 {
            0.0
        } else {
            (used_memory as f64 / total_memory as f64) * 100.0
        };

        let cpus = system.cpus();
        let cpu_percent = if cpus.is_empty() {
            0.0
        } else {
            (cpus.iter().map(|cpu| cpu.cpu_usage()).sum::<f32>() / cpus.len() as f32) as f64
        };

        drop(system);

        Ok(ResourceStats {
            cpu_percent: round2(cpu_percent),
            memory_percent: round2(memory_percent),
            memory_used_mb: round2(used_memory as f64 / (1024.0 * 1024.0)),
            disk_percent: round2(self.disk_percent()),
            uptime_secs: self.uptime_secs(),
            processing_count: self.processing.load(Ordering::SeqCst),
        })
    }

    /// Samples resource usage in spawn_blocking to avoid blocking the runtime.
    pub async fn snapshot_async(&self) -> Result<ResourceStats> {
        let monitor = self.clone();
        tokio::task::spawn_blocking(move || monitor.snapshot())
            .await
            .map_err(|e| anyhow::anyhow!("spawn_blocking for resource stats: {}", e))?
    }

    fn disk_percent(&self) -> f64 {
        let target = self
            .disk_path
            .canonicalize()
            .unwrap_or_else(|_| self.disk_path.clone());
        let disks = Disks::new_with_refreshed_list();

        // Longest matching mount point wins
        let best = disks
            .iter()
            .filter(|disk| target.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len());

        match best {
            Some(disk) => {
                let total = disk.total_space();
                if total == 0 {
                    return 0.0;
                }
                let used = total.saturating_sub(disk.available_space());
                (used as f64 / total as f64) * 100.0
            }
            None => 0.0,
        }
    }

    /// Create a background task that samples usage periodically and warns
    /// when a threshold is crossed.
    pub fn start(
        &self,
        cancel_token: CancellationToken,
        check_interval: Duration,
    ) -> JoinHandle<()> {
        let monitor = self.clone();
        let mut check = interval(check_interval);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        break;
                    }
                    _ = check.tick() => {
                        match monitor.snapshot_async().await {
                            Ok(stats) => {
                                if stats.cpu_percent > monitor.max_cpu_usage_percent {
                                    tracing::warn!(
                                        cpu_percent = stats.cpu_percent,
                                        threshold = monitor.max_cpu_usage_percent,
                                        "High CPU usage"
                                    );
                                }
                                if stats.memory_percent > monitor.max_memory_usage_percent {
                                    tracing::warn!(
                                        memory_percent = stats.memory_percent,
                                        threshold = monitor.max_memory_usage_percent,
                                        "High memory usage"
                                    );
                                }
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "Resource check failed");
                            }
                        }
                    }
                }
            }
        })
    }
}

/// Keeps the in-flight counter raised; dropping lowers it again.
pub struct ProcessingGuard {
    counter: Arc<AtomicUsize>,
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        let _ = self
            .counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                Some(count.saturating_sub(1))
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_monitor() -> ResourceMonitor {
        ResourceMonitor::new(std::env::temp_dir(), 80.0, 80.0)
    }

    #[test]
    fn snapshot_reports_plausible_ranges() {
        let monitor = test_monitor();
        let stats = monitor.snapshot().unwrap();

        assert!(stats.cpu_percent >= 0.0);
        assert!(stats.memory_percent > 0.0 && stats.memory_percent <= 100.0);
        assert!(stats.memory_used_mb > 0.0);
        assert!((0.0..=100.0).contains(&stats.disk_percent));
        assert!(stats.uptime_secs >= 0.0);
        assert_eq!(stats.processing_count, 0);
    }

    #[test]
    fn guard_tracks_in_flight_requests() {
        let monitor = test_monitor();

        let first = monitor.begin_processing();
        let second = monitor.begin_processing();
        assert_eq!(monitor.processing_count(), 2);

        drop(first);
        assert_eq!(monitor.processing_count(), 1);
        drop(second);
        assert_eq!(monitor.processing_count(), 0);
    }

    #[tokio::test]
    async fn snapshot_async_matches_sync_shape() {
        let monitor = test_monitor();
        let _guard = monitor.begin_processing();

        let stats = monitor.snapshot_async().await.unwrap();
        assert_eq!(stats.processing_count, 1);
    }

    #[tokio::test]
    async fn background_task_stops_on_cancel() {
        let monitor = test_monitor();
        let cancel = CancellationToken::new();
        let handle = monitor.start(cancel.clone(), Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(30)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
