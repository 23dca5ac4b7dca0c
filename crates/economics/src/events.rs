//! Observability sinks for emission records.
//!
//! Sinks are fire-and-forget: they never fail and nothing they do feeds back
//! into the next block.

use mint_types::EmissionRecord;
use parking_lot::Mutex;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use tracing::info;

pub trait EventSink {
    fn emit(&self, record: &EmissionRecord);
}

impl<T: EventSink + ?Sized> EventSink for &T {
    fn emit(&self, record: &EmissionRecord) {
        (**self).emit(record)
    }
}

impl<T: EventSink + ?Sized> EventSink for Box<T> {
    fn emit(&self, record: &EmissionRecord) {
        (**self).emit(record)
    }
}

impl<T: EventSink + ?Sized> EventSink for Arc<T> {
    fn emit(&self, record: &EmissionRecord) {
        (**self).emit(record)
    }
}

/// Logs each record as a structured `info` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, record: &EmissionRecord) {
        info!(
            target: "mint",
            height = record.height,
            block_time = %record.block_time,
            release_rate = %record.release_rate,
            annual_provisions = %record.annual_provisions,
            emitted = record.emitted_amount,
            denom = %record.denom,
            diluted = record.diluted,
            "Block emission"
        );
    }
}

/// Publishes records through the `metrics` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsEventSink;

impl MetricsEventSink {
    pub const RELEASE_RATE: &'static str = "mint_release_rate";
    pub const ANNUAL_PROVISIONS: &'static str = "mint_annual_provisions";
    pub const EMITTED_TOTAL: &'static str = "mint_emitted_total";
    pub const DILUTIONS_TOTAL: &'static str = "mint_dilutions_total";
    pub const LAST_HEIGHT: &'static str = "mint_last_emission_height";

    /// Register descriptions with the installed recorder.
    pub fn describe() {
        metrics::describe_gauge!(Self::RELEASE_RATE, "Effective release rate after this block");
        metrics::describe_gauge!(
            Self::ANNUAL_PROVISIONS,
            "Annual emission target in token units"
        );
        metrics::describe_counter!(
            Self::EMITTED_TOTAL,
            "Tokens released from the reward pool"
        );
        metrics::describe_counter!(Self::DILUTIONS_TOTAL, "Release rate dilutions applied");
        metrics::describe_gauge!(Self::LAST_HEIGHT, "Height of the last emitting block");
    }
}

impl EventSink for MetricsEventSink {
    fn emit(&self, record: &EmissionRecord) {
        metrics::gauge!(Self::RELEASE_RATE).set(record.release_rate.to_f64().unwrap_or_default());
        metrics::gauge!(Self::ANNUAL_PROVISIONS)
            .set(record.annual_provisions.to_f64().unwrap_or_default());
        metrics::counter!(Self::EMITTED_TOTAL)
            .increment(u64::try_from(record.emitted_amount).unwrap_or(u64::MAX));
        if record.diluted {
            metrics::counter!(Self::DILUTIONS_TOTAL).increment(1);
        }
        metrics::gauge!(Self::LAST_HEIGHT).set(record.height as f64);
    }
}

/// Keeps every record in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingEventSink {
    records: Arc<Mutex<Vec<EmissionRecord>>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<EmissionRecord> {
        self.records.lock().clone()
    }

    pub fn last(&self) -> Option<EmissionRecord> {
        self.records.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, record: &EmissionRecord) {
        self.records.lock().push(record.clone());
    }
}

/// Fan-out to several sinks in insertion order.
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn EventSink + Send + Sync>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<S: EventSink + Send + Sync + 'static>(mut self, sink: S) -> Self {
        self.push(sink);
        self
    }

    pub fn push<S: EventSink + Send + Sync + 'static>(&mut self, sink: S) {
        self.sinks.push(Box::new(sink));
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for SinkSet {
    fn emit(&self, record: &EmissionRecord) {
        for sink in &self.sinks {
            sink.emit(record);
        }
    }
}
