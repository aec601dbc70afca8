//! The `DeltaSink` trait and an in-memory sink.

use tf_agent::DeltaBatch;

use crate::NetResult;

/// Destination for the per-tick outbound batch.
///
/// Wire transport is not modelled here: a sink only receives already-encoded
/// batches in publication order.  Errors are reported to the caller;
/// [`PublishObserver`](crate::PublishObserver) keeps the first one.
pub trait DeltaSink {
    fn publish(&mut self, batch: &DeltaBatch) -> NetResult<()>;

    /// Push out anything buffered.  Idempotent.
    fn flush(&mut self) -> NetResult<()>;
}

/// Keeps every non-empty batch.  For tests and in-process consumers.
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Vec<DeltaBatch>,
    flushes: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> &[DeltaBatch] {
        &self.batches
    }

    /// Drain the collected batches.
    pub fn take(&mut self) -> Vec<DeltaBatch> {
        std::mem::take(&mut self.batches)
    }

    /// Agent deltas across all collected batches.
    pub fn total_deltas(&self) -> usize {
        self.batches.iter().map(|b| b.deltas.len()).sum()
    }

    #[inline]
    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl DeltaSink for MemorySink {
    fn publish(&mut self, batch: &DeltaBatch) -> NetResult<()> {
        if !batch.is_empty() {
            self.batches.push(batch.clone());
        }
        Ok(())
    }

    fn flush(&mut self) -> NetResult<()> {
        self.flushes += 1;
        Ok(())
    }
}

impl<S: DeltaSink + ?Sized> DeltaSink for Box<S> {
    fn publish(&mut self, batch: &DeltaBatch) -> NetResult<()> {
        (**self).publish(batch)
    }

    fn flush(&mut self) -> NetResult<()> {
        (**self).flush()
    }
}
