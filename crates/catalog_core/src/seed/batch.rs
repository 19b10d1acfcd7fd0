//! Bounded write-behind buffer.
//!
//! Records accumulate until the buffer holds `capacity` entries, then the
//! whole buffer goes to the sink as one batch and is cleared.

use log::info;
use std::num::NonZeroUsize;

/// Destination for full batches (typically one repository `save_batch`).
pub trait BatchSink<T> {
    type Error;

    fn write_batch(&mut self, batch: &[T]) -> Result<(), Self::Error>;
}

/// Counters for one writer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub flushes: u64,
    pub written: u64,
    pub largest_batch: usize,
}

/// Buffers records and flushes them to `S` in batches of at most `capacity`.
pub struct BatchWriter<T, S> {
    label: &'static str,
    buffer: Vec<T>,
    capacity: usize,
    sink: S,
    stats: BatchStats,
}

impl<T, S> BatchWriter<T, S>
where
    S: BatchSink<T>,
{
    /// `label` names the record kind in progress logs.
    pub fn new(label: &'static str, capacity: NonZeroUsize, sink: S) -> Self {
        Self {
            label,
            buffer: Vec::with_capacity(capacity.get()),
            capacity: capacity.get(),
            sink,
            stats: BatchStats::default(),
        }
    }

    /// Buffers one record and flushes once capacity is reached.
    pub fn push(&mut self, record: T) -> Result<(), S::Error> {
        self.buffer.push(record);
        if self.buffer.len() >= self.capacity {
            self.flush()?;
        }
        Ok(())
    }

    /// Writes the buffered records, if any, as one batch.
    ///
    /// On error the buffer is kept so the caller can inspect or drop it.
    pub fn flush(&mut self) -> Result<(), S::Error> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        self.sink.write_batch(&self.buffer)?;

        let rows = self.buffer.len();
        self.stats.flushes += 1;
        self.stats.written += rows as u64;
        self.stats.largest_batch = self.stats.largest_batch.max(rows);
        self.buffer.clear();

        info!(
            "event=seed_batch module=seed status=ok entity={} batch={} rows={} total={}",
            self.label, self.stats.flushes, rows, self.stats.written
        );
        Ok(())
    }

    /// Flushes the remainder and returns the counters and the sink.
    pub fn finish(mut self) -> Result<(BatchStats, S), S::Error> {
        self.flush()?;
        Ok((self.stats, self.sink))
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn stats(&self) -> BatchStats {
        self.stats
    }
}
