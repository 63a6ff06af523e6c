// Code generation for the metrics.v1.Metrics service
//
// Messages are written by hand with prost derives, so only the client and
// server stubs are generated and no protoc is needed.

use tonic_build::manual::{Builder, Method, Service};

const CODEC: &str = "tonic::codec::ProstCodec";

fn unary(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("crate::v1::{input}"))
        .output_type(format!("crate::v1::{output}"))
        .codec_path(CODEC)
        .build()
}

fn main() {
    let service = Service::builder()
        .name("Metrics")
        .package("metrics.v1")
        .method(unary("add_metric_gauge", "AddMetricGauge", "Metric", "StdResponse"))
        .method(unary("add_metric_counter", "AddMetricCounter", "Metric", "StdResponse"))
        .method(unary("get_metric_value", "GetMetricValue", "Metric", "GetMetricValueResponse"))
        .method(unary("update_metric", "UpdateMetric", "Metric", "StdResponse"))
        .method(unary("get_metric", "GetMetric", "Metric", "Metric"))
        .method(unary("update_metrics", "UpdateMetrics", "UpdateMetricsRequest", "StdResponse"))
        .method(unary("get_metric_names", "GetMetricNames", "Empty", "GetMetricNamesResponse"))
        .build();

    Builder::new().compile(&[service]);
    println!("cargo:rerun-if-changed=build.rs");
}
