//! `tf-net`: the outbound publish boundary of the tickforge simulation core.
//!
//! Transport and session handling live elsewhere; this crate only turns the
//! per-tick [`DeltaBatch`](tf_agent::DeltaBatch) stream into bytes.
//!
//! | Type                | Output                                           |
//! |---------------------|--------------------------------------------------|
//! | [`JsonLinesSink`]   | one JSON line per non-empty batch or snapshot    |
//! | [`MemorySink`]      | `Vec<DeltaBatch>` kept in process                |
//! | [`TickCsvWriter`]   | `tick_summaries.csv`, one row per tick           |
//!
//! Sinks implement [`DeltaSink`] and are driven by [`PublishObserver`], which
//! implements `tf_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tf_net::{JsonLinesSink, PublishObserver};
//!
//! let sink = JsonLinesSink::create(Path::new("deltas.jsonl"))?;
//! let mut obs = PublishObserver::new(sink);
//! sim.run(&mut obs);
//! if let Some(e) = obs.take_error() {
//!     eprintln!("publish error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod json;
pub mod observer;
pub mod row;
pub mod sink;

#[cfg(test)]
mod tests;

pub use csv::TickCsvWriter;
pub use error::{NetError, NetResult};
pub use json::JsonLinesSink;
pub use observer::PublishObserver;
pub use row::TickSummaryRow;
pub use sink::{DeltaSink, MemorySink};
