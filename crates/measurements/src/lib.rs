//! # Measurements
//!
//! Record types and metric derivation for memory latency benchmark results.
//!
//! The benchmark harness emits one CSV row per configuration, recording the
//! buffer and page geometry, the total elapsed cycles, and the cache/TLB miss
//! counts observed while performing a known number of loads. This crate turns
//! those raw counters into normalized per-load metrics: latency in cycles per
//! load, miss rates as percentages, and the number of page table entries the
//! buffer spans.
//!
//! The primary entry point is [`derive_metrics`], which maps a slice of
//! [`RawMeasurement`]s to [`Measurement`]s while preserving input order.

pub mod bytes;
pub mod record;

pub use bytes::format_bytes;
pub use record::*;
