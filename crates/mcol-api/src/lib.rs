//! Metric collector RPC API
//!
//! Messages of the `metrics.v1` package and the generated `Metrics` client
//! and server. Conversions to and from the JSON wire form live in [`convert`].

/// Conversions between RPC messages and domain wire metrics
pub mod convert;

/// `metrics.v1` package
pub mod v1 {
    /// One metric; `delta` is read for counters, `value` for gauges
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct Metric {
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(string, tag = "2")]
        pub m_type: String,
        #[prost(int64, tag = "3")]
        pub delta: i64,
        #[prost(double, tag = "4")]
        pub value: f64,
        #[prost(string, tag = "5")]
        pub hash: String,
    }

    /// Outcome of a write; an empty `error` means success
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct StdResponse {
        #[prost(string, tag = "1")]
        pub error: String,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct GetMetricValueResponse {
        #[prost(int64, tag = "1")]
        pub delta: i64,
        #[prost(double, tag = "2")]
        pub value: f64,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct Empty {}

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct GetMetricNamesResponse {
        #[prost(string, repeated, tag = "1")]
        pub names: Vec<String>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct UpdateMetricsRequest {
        #[prost(message, repeated, tag = "1")]
        pub metrics: Vec<Metric>,
    }

    include!(concat!(env!("OUT_DIR"), "/metrics.v1.Metrics.rs"));
}

pub use v1::metrics_client::MetricsClient;
pub use v1::metrics_server::{Metrics, MetricsServer};

/// Metadata key carrying the caller's self-reported address
pub const REAL_IP_METADATA: &str = "x-real-ip";
