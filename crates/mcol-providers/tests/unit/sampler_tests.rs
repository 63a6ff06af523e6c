//! Tests for the runtime and system samplers

use mcol_domain::MetricValue;
use mcol_domain::ports::MetricSource;
use mcol_providers::sampler::system::{HostSample, host_readings};
use mcol_providers::sampler::{RuntimeSource, SystemSource};

#[tokio::test]
async fn test_runtime_source_reports_table_in_order() {
    let source = RuntimeSource::new();
    let readings = source.read().await.expect("read");

    let names: Vec<_> = readings.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, RuntimeSource::metric_names());
    assert_eq!(names.last(), Some(&"RandomValue"));
}

#[tokio::test]
async fn test_poll_count_grows_by_one_per_read() {
    let source = RuntimeSource::new();
    source.read().await.expect("read");
    let readings = source.read().await.expect("read");

    let polls = readings.iter().find(|(name, _)| name == "PollCount").map(|(_, v)| *v);
    assert_eq!(polls, Some(MetricValue::Counter(2)));
    assert_eq!(source.poll_count(), 2);
}

#[tokio::test]
async fn test_random_value_is_a_percentage() {
    let source = RuntimeSource::new();
    for _ in 0..20 {
        let readings = source.read().await.expect("read");
        let random = readings
            .iter()
            .find(|(name, _)| name == "RandomValue")
            .map(|(_, v)| v.as_f64())
            .expect("RandomValue present");
        assert!((0.0..100.0).contains(&random));
    }
}

#[tokio::test]
async fn test_runtime_gauges_are_gauges() {
    let readings = RuntimeSource::new().read().await.expect("read");
    let alloc = readings.iter().find(|(name, _)| name == "Alloc").map(|(_, v)| *v);
    assert!(matches!(alloc, Some(MetricValue::Gauge(v)) if v >= 0.0));
}

#[tokio::test]
async fn test_system_source_reports_memory_and_cpus() {
    let readings = SystemSource::new().read().await.expect("read");
    let names: Vec<_> = readings.iter().map(|(name, _)| name.as_str()).collect();

    assert_eq!(
        &names[..6],
        ["TotalMemory", "FreeMemory", "UsedMemory", "TotalSwap", "FreeSwap", "LoadAverage1"]
    );
    assert!(names.iter().skip(6).all(|name| name.starts_with("CPUutilization")));
    assert!(readings.iter().all(|(_, v)| v.kind() == mcol_domain::MetricKind::Gauge));
}

#[test]
fn test_host_readings_number_cpus_from_zero() {
    let sample = HostSample {
        total_memory: 1024,
        cpu_usage: vec![12.5, 50.0],
        ..HostSample::default()
    };

    let readings = host_readings(&sample);

    assert_eq!(readings.len(), 8);
    assert_eq!(readings[0], ("TotalMemory".to_string(), MetricValue::Gauge(1024.0)));
    assert_eq!(readings[6], ("CPUutilization0".to_string(), MetricValue::Gauge(12.5)));
    assert_eq!(readings[7], ("CPUutilization1".to_string(), MetricValue::Gauge(50.0)));
}
