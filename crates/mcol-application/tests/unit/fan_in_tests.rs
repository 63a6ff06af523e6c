//! Tests for the sampling fan-in

use mcol_application::agent::{SampleResult, fan_in};
use mcol_domain::Metric;
use mcol_domain::error::Error;
use tokio::sync::mpsc;

fn channel_with(result: SampleResult) -> mpsc::Receiver<SampleResult> {
    let (tx, rx) = mpsc::channel(1);
    tx.try_send(result).expect("capacity for one result");
    rx
}

#[tokio::test]
async fn test_merges_inputs_in_order() {
    let inputs = vec![
        channel_with(Ok(vec![Metric::gauge("Alloc", 1.0), Metric::gauge("Sys", 2.0)])),
        channel_with(Ok(vec![Metric::gauge("TotalMemory", 3.0)])),
    ];
    let (tx, mut rx) = mpsc::channel(inputs.len() + 1);

    fan_in(inputs, tx).await;

    let merged = rx.recv().await.expect("one message").expect("no error");
    let names: Vec<_> = merged.iter().map(Metric::name).collect();
    assert_eq!(names, vec!["Alloc", "Sys", "TotalMemory"]);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_error_is_forwarded_and_remaining_inputs_drained() {
    let (late_tx, late_rx) = mpsc::channel(1);
    let inputs = vec![channel_with(Err(Error::internal("runtime unavailable"))), late_rx];
    let (tx, mut rx) = mpsc::channel(inputs.len() + 1);

    let merge = tokio::spawn(fan_in(inputs, tx));

    let first = rx.recv().await.expect("error forwarded");
    assert!(first.is_err());

    late_tx
        .send(Ok(vec![Metric::gauge("FreeMemory", 1.0)]))
        .await
        .expect("late input drained");
    merge.await.expect("fan-in finished");

    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_closed_input_counts_as_error() {
    let (closed_tx, closed_rx) = mpsc::channel::<SampleResult>(1);
    drop(closed_tx);
    let (tx, mut rx) = mpsc::channel(2);

    fan_in(vec![closed_rx], tx).await;

    assert!(rx.recv().await.expect("message").is_err());
}
