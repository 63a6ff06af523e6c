//! Fan-in of sampling results
//!
//! Collects one result from each input channel into a single output. Errors
//! are forwarded as soon as they arrive while the remaining inputs are still
//! drained, so no sampling task is left blocked on a full channel.

use mcol_domain::Metric;
use mcol_domain::error::{Error, Result};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Result produced by one sampling task
pub type SampleResult = Result<Vec<Metric>>;

/// Merge every input into `output`
///
/// Inputs are read in order, so the merged list keeps the source order.
/// When every input succeeded the merged list is sent once at the end;
/// otherwise only the errors are sent. `output` should have capacity for
/// `inputs.len() + 1` messages so the merge never waits on its reader.
pub async fn fan_in(inputs: Vec<mpsc::Receiver<SampleResult>>, output: mpsc::Sender<SampleResult>) {
    let mut merged = Vec::new();
    let mut failed = false;

    for (index, mut input) in inputs.into_iter().enumerate() {
        match input.recv().await {
            Some(Ok(metrics)) => {
                debug!(input = index, count = metrics.len(), "Sample received");
                merged.extend(metrics);
            }
            Some(Err(e)) => {
                failed = true;
                if output.send(Err(e)).await.is_err() {
                    debug!(input = index, "Fan-in reader went away");
                }
            }
            None => {
                failed = true;
                warn!(input = index, "Sampling task ended without a result");
                let error = Error::internal(format!("sampling task {index} ended without a result"));
                if output.send(Err(error)).await.is_err() {
                    debug!(input = index, "Fan-in reader went away");
                }
            }
        }
    }

    if !failed && output.send(Ok(merged)).await.is_err() {
        debug!("Fan-in reader went away before the merged sample");
    }
}
