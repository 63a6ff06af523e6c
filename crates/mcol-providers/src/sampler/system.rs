//! OS level sampler
//!
//! Memory, swap and load figures plus one `CPUutilization{i}` gauge per
//! logical CPU, numbered from zero. A platform without a reading reports 0.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mcol_domain::MetricValue;
use mcol_domain::error::Result;
use mcol_domain::ports::{MetricSource, Readings};
use sysinfo::System;

use super::with_system;

/// One refresh of the host
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostSample {
    pub total_memory: u64,
    pub free_memory: u64,
    pub used_memory: u64,
    pub total_swap: u64,
    pub free_swap: u64,
    pub load_average_one: f64,
    pub cpu_usage: Vec<f32>,
}

type Accessor = fn(&HostSample) -> MetricValue;

const HOST_METRICS: &[(&str, Accessor)] = &[
    ("TotalMemory", |h: &HostSample| MetricValue::Gauge(h.total_memory as f64)),
    ("FreeMemory", |h: &HostSample| MetricValue::Gauge(h.free_memory as f64)),
    ("UsedMemory", |h: &HostSample| MetricValue::Gauge(h.used_memory as f64)),
    ("TotalSwap", |h: &HostSample| MetricValue::Gauge(h.total_swap as f64)),
    ("FreeSwap", |h: &HostSample| MetricValue::Gauge(h.free_swap as f64)),
    ("LoadAverage1", |h: &HostSample| MetricValue::Gauge(h.load_average_one)),
];

/// Sampler of host memory and CPUs
pub struct SystemSource {
    system: Arc<Mutex<System>>,
}

impl SystemSource {
    pub fn new() -> Self {
        let mut system = System::new();
        // CPU usage is a delta between two refreshes
        system.refresh_cpu_usage();
        Self {
            system: Arc::new(Mutex::new(system)),
        }
    }

    async fn sample(&self) -> Result<HostSample> {
        with_system(&self.system, |system| {
            system.refresh_memory();
            system.refresh_cpu_usage();
            HostSample {
                total_memory: system.total_memory(),
                free_memory: system.free_memory(),
                used_memory: system.used_memory(),
                total_swap: system.total_swap(),
                free_swap: system.free_swap(),
                load_average_one: System::load_average().one,
                cpu_usage: system.cpus().iter().map(sysinfo::Cpu::cpu_usage).collect(),
            }
        })
        .await
    }
}

impl Default for SystemSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Readings for a host sample, fixed table first then one gauge per CPU
pub fn host_readings(sample: &HostSample) -> Readings {
    HOST_METRICS
        .iter()
        .map(|(name, accessor)| ((*name).to_string(), accessor(sample)))
        .chain(sample.cpu_usage.iter().enumerate().map(|(i, usage)| {
            (
                format!("CPUutilization{i}"),
                MetricValue::Gauge(f64::from(*usage)),
            )
        }))
        .collect()
}

#[async_trait]
impl MetricSource for SystemSource {
    fn name(&self) -> &str {
        "system"
    }

    async fn read(&self) -> Result<Readings> {
        Ok(host_readings(&self.sample().await?))
    }
}
