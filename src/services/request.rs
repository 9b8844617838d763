use tracing::{instrument, warn};

use crate::error::AppResult;
use crate::metrics;
use crate::models::Record;
use crate::producer::ProducerHandle;

/// Turns validated records into producer sends.
///
/// Used the same way for a single record and for a list. Only the
/// synchronous enqueue result is checked; delivery is never awaited.
#[derive(Clone)]
pub struct RequestService {
    producer: ProducerHandle,
}

impl RequestService {
    pub fn new(producer: ProducerHandle) -> Self {
        Self { producer }
    }

    /// Send one record.
    pub fn produce(&self, record: &Record) -> AppResult<()> {
        self.producer.send(record)
    }

    /// Send records one by one in order, stopping at the first failure.
    ///
    /// Records before the failing one have been enqueued; the failing one
    /// and everything after it are not attempted again.
    #[instrument(skip(self, records), fields(batch_size = records.len()))]
    pub fn produce_all(&self, records: &[Record]) -> AppResult<()> {
        metrics::record_batch_size(records.len());

        for (index, record) in records.iter().enumerate() {
            if let Err(e) = self.produce(record) {
                warn!(index, total = records.len(), error = %e, "Batch aborted");
                return Err(e);
            }
        }

        Ok(())
    }

    pub fn producer(&self) -> &ProducerHandle {
        &self.producer
    }
}
