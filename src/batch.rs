//! Sequential batch driver.
//!
//! Records are forwarded strictly one at a time: each request is awaited to
//! completion before the next record is even resolved, and the first failure
//! aborts the rest of the batch. There is no retry and no reordering, so the
//! returned responses always line up 1:1 with the records that ran.

use tracing::{error, info};

use crate::client::{ConversionResponse, DoclingClient};
use crate::error::Result;
use crate::record::{ConversionRecord, RecordDefaults};

/// Called by [`run_batch`] as records are processed.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `index` is the record's zero-based position in the
/// batch. The driver is sequential, so calls never overlap; `Send + Sync`
/// is still required so one observer can be shared with other tasks (a
/// terminal progress bar, a status endpoint).
pub trait BatchProgress: Send + Sync {
    /// Called once before the first record.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called just before a record is resolved and forwarded.
    fn on_record_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when a record's response has arrived.
    fn on_record_done(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when a record fails. The batch stops after this call.
    fn on_record_failed(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after the last record, only if every record succeeded.
    fn on_batch_complete(&self, total: usize) {
        let _ = total;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopBatchProgress;

impl BatchProgress for NoopBatchProgress {}

/// Forward every record in order, stopping at the first failure.
///
/// Returns one response per record, in input order. On failure the error of
/// the failing record is returned, later records are never attempted, and
/// responses already received are dropped with the batch.
pub async fn run_batch(
    client: &DoclingClient,
    defaults: &RecordDefaults,
    records: Vec<ConversionRecord>,
    progress: &dyn BatchProgress,
) -> Result<Vec<ConversionResponse>> {
    let total = records.len();
    info!(total, "Starting batch");
    progress.on_batch_start(total);

    let mut responses = Vec::with_capacity(total);
    for (index, record) in records.into_iter().enumerate() {
        progress.on_record_start(index, total);
        match forward_one(client, defaults, record).await {
            Ok(response) => {
                progress.on_record_done(index, total);
                responses.push(response);
            }
            Err(e) => {
                error!(index, error = %e, "Record failed, aborting batch");
                progress.on_record_failed(index, total, &e.to_string());
                return Err(e);
            }
        }
    }

    progress.on_batch_complete(total);
    info!(total, "Batch complete");
    Ok(responses)
}

async fn forward_one(
    client: &DoclingClient,
    defaults: &RecordDefaults,
    record: ConversionRecord,
) -> Result<ConversionResponse> {
    let request = record.resolve(defaults).await?;
    client.convert(&request).await
}
