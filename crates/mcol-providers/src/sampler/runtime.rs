//! Process level sampler
//!
//! Reads the collector agent's own process through `sysinfo`, plus the
//! synthetic `PollCount` and `RandomValue` metrics.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mcol_domain::MetricValue;
use mcol_domain::constants::{POLL_COUNT_METRIC, RANDOM_VALUE_METRIC};
use mcol_domain::error::Result;
use mcol_domain::ports::{MetricSource, Readings};
use rand::Rng;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use super::with_system;

/// One refresh of the current process
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessSample {
    pub memory: u64,
    pub virtual_memory: u64,
    pub cpu_usage: f32,
    pub run_time: u64,
    pub disk_read: u64,
    pub disk_written: u64,
}

type Accessor = fn(&ProcessSample) -> MetricValue;

const PROCESS_METRICS: &[(&str, Accessor)] = &[
    ("Alloc", |p: &ProcessSample| MetricValue::Gauge(p.memory as f64)),
    ("Sys", |p: &ProcessSample| MetricValue::Gauge(p.virtual_memory as f64)),
    ("ProcessCPUUsage", |p: &ProcessSample| MetricValue::Gauge(f64::from(p.cpu_usage))),
    ("ProcessRunTime", |p: &ProcessSample| MetricValue::Gauge(p.run_time as f64)),
    ("ProcessDiskRead", |p: &ProcessSample| MetricValue::Gauge(p.disk_read as f64)),
    ("ProcessDiskWritten", |p: &ProcessSample| MetricValue::Gauge(p.disk_written as f64)),
];

/// Sampler of the current process
pub struct RuntimeSource {
    system: Arc<Mutex<System>>,
    pid: Option<Pid>,
    poll_count: AtomicI64,
}

impl RuntimeSource {
    pub fn new() -> Self {
        Self {
            system: Arc::new(Mutex::new(System::new())),
            pid: sysinfo::get_current_pid().ok(),
            poll_count: AtomicI64::new(0),
        }
    }

    /// Names this source reports, in order
    pub fn metric_names() -> Vec<&'static str> {
        PROCESS_METRICS
            .iter()
            .map(|(name, _)| *name)
            .chain([POLL_COUNT_METRIC, RANDOM_VALUE_METRIC])
            .collect()
    }

    /// Number of reads so far
    pub fn poll_count(&self) -> i64 {
        self.poll_count.load(Ordering::SeqCst)
    }

    async fn sample(&self) -> Result<ProcessSample> {
        let Some(pid) = self.pid else {
            return Ok(ProcessSample::default());
        };
        with_system(&self.system, move |system| {
            system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                true,
                ProcessRefreshKind::everything(),
            );
            system
                .process(pid)
                .map(|process| {
                    let disk = process.disk_usage();
                    ProcessSample {
                        memory: process.memory(),
                        virtual_memory: process.virtual_memory(),
                        cpu_usage: process.cpu_usage(),
                        run_time: process.run_time(),
                        disk_read: disk.total_read_bytes,
                        disk_written: disk.total_written_bytes,
                    }
                })
                .unwrap_or_default()
        })
        .await
    }
}

impl Default for RuntimeSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricSource for RuntimeSource {
    fn name(&self) -> &str {
        "runtime"
    }

    async fn read(&self) -> Result<Readings> {
        let sample = self.sample().await?;
        let polls = self.poll_count.fetch_add(1, Ordering::SeqCst) + 1;
        let random = rand::rng().random_range(0.0..100.0);

        let mut readings: Readings = PROCESS_METRICS
            .iter()
            .map(|(name, accessor)| ((*name).to_string(), accessor(&sample)))
            .collect();
        readings.push((POLL_COUNT_METRIC.to_string(), MetricValue::Counter(polls)));
        readings.push((RANDOM_VALUE_METRIC.to_string(), MetricValue::Gauge(random)));
        Ok(readings)
    }
}
