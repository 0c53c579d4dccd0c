use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while deriving metrics from raw measurements
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DeriveError {
    /// A record reported zero logical loads, so per-load metrics are undefined
    #[error("record {row} has NumLogicalLoads == 0, per-load metrics are undefined")]
    ZeroLogicalLoads { row: usize },

    /// A record reported a zero page size, so the page entry count is undefined
    #[error("record {row} has PageSize == 0, page entry count is undefined")]
    ZeroPageSize { row: usize },
}

/// One raw benchmark measurement, as emitted by the benchmark harness.
///
/// Field names map to the exact CSV column headers the harness writes
/// (`BufferSize`, `PaddedElementSize`, `PageSize`, `Cycles`,
/// `NumLogicalLoads`, `L1DMisses`, `L2Misses`, `L3Misses`, `TLBMisses`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawMeasurement {
    /// Size of the accessed buffer in bytes
    #[serde(rename = "BufferSize")]
    pub buffer_size: u64,

    /// Stride between successive accessed elements, in bytes
    #[serde(rename = "PaddedElementSize")]
    pub padded_element_size: u64,

    /// Page size the buffer was mapped with, in bytes
    #[serde(rename = "PageSize")]
    pub page_size: u64,

    /// Total elapsed cycles for the run
    #[serde(rename = "Cycles")]
    pub cycles: u64,

    /// Number of load operations performed (the normalization denominator)
    #[serde(rename = "NumLogicalLoads")]
    pub num_logical_loads: u64,

    /// L1 data cache misses observed
    #[serde(rename = "L1DMisses")]
    pub l1d_misses: u64,

    /// L2 cache misses observed
    #[serde(rename = "L2Misses")]
    pub l2_misses: u64,

    /// L3 cache misses observed
    #[serde(rename = "L3Misses")]
    pub l3_misses: u64,

    /// TLB misses observed
    #[serde(rename = "TLBMisses")]
    pub tlb_misses: u64,
}

/// A raw measurement augmented with derived per-load metrics.
///
/// Produced by [`derive_metrics`] (or [`Measurement::from_raw`] for a single
/// record). Immutable once derived.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// The raw counters this measurement was derived from
    pub raw: RawMeasurement,

    /// Average cycles per logical load
    pub latency: f64,

    /// L1 data cache misses per logical load, as a percentage
    pub l1d_miss_rate: f64,

    /// L2 cache misses per logical load, as a percentage
    pub l2_miss_rate: f64,

    /// L3 cache misses per logical load, as a percentage
    pub l3_miss_rate: f64,

    /// TLB misses per logical load, as a percentage
    pub tlb_miss_rate: f64,

    /// Number of page table entries the buffer spans (ceiling division)
    pub page_entries: u64,
}

impl Measurement {
    /// Derives per-load metrics for a single raw measurement.
    ///
    /// Returns `None` if the record has `num_logical_loads == 0` or
    /// `page_size == 0`, since the derived metrics would be undefined.
    /// Miss rates can exceed 100 when a level misses more than once per load.
    ///
    /// # Examples
    ///
    /// ```
    /// use measurements::{Measurement, RawMeasurement};
    ///
    /// let raw = RawMeasurement {
    ///     buffer_size: 4097,
    ///     padded_element_size: 64,
    ///     page_size: 4096,
    ///     cycles: 1000,
    ///     num_logical_loads: 100,
    ///     l1d_misses: 10,
    ///     l2_misses: 5,
    ///     l3_misses: 1,
    ///     tlb_misses: 0,
    /// };
    ///
    /// let m = Measurement::from_raw(raw).unwrap();
    /// assert_eq!(m.latency, 10.0);
    /// assert_eq!(m.l1d_miss_rate, 10.0);
    /// // A partial page still needs a full page table entry
    /// assert_eq!(m.page_entries, 2);
    /// ```
    pub fn from_raw(raw: RawMeasurement) -> Option<Self> {
        if raw.num_logical_loads == 0 || raw.page_size == 0 {
            return None;
        }

        let loads = raw.num_logical_loads as f64;
        let miss_rate = |misses: u64| (misses as f64 / loads) * 100.0;

        Some(Self {
            latency: raw.cycles as f64 / loads,
            l1d_miss_rate: miss_rate(raw.l1d_misses),
            l2_miss_rate: miss_rate(raw.l2_misses),
            l3_miss_rate: miss_rate(raw.l3_misses),
            tlb_miss_rate: miss_rate(raw.tlb_misses),
            page_entries: raw.buffer_size.div_ceil(raw.page_size),
            raw,
        })
    }
}

/// Derives metrics for a batch of raw measurements.
///
/// The output preserves input order and cardinality: one [`Measurement`] per
/// input record, in the same order. A record with zero logical loads (or a
/// zero page size) aborts the whole batch with an error naming the offending
/// row; no partial result is produced.
///
/// # Examples
///
/// ```
/// use measurements::{derive_metrics, RawMeasurement};
///
/// let records = vec![RawMeasurement {
///     buffer_size: 1024,
///     padded_element_size: 64,
///     page_size: 4096,
///     cycles: 1000,
///     num_logical_loads: 100,
///     l1d_misses: 10,
///     l2_misses: 5,
///     l3_misses: 1,
///     tlb_misses: 0,
/// }];
///
/// let measurements = derive_metrics(&records).unwrap();
/// assert_eq!(measurements.len(), 1);
/// assert_eq!(measurements[0].latency, 10.0);
/// assert_eq!(measurements[0].page_entries, 1);
/// ```
pub fn derive_metrics(records: &[RawMeasurement]) -> Result<Vec<Measurement>, DeriveError> {
    records
        .iter()
        .enumerate()
        .map(|(row, raw)| {
            if raw.num_logical_loads == 0 {
                return Err(DeriveError::ZeroLogicalLoads { row });
            }
            Measurement::from_raw(raw.clone()).ok_or(DeriveError::ZeroPageSize { row })
        })
        .collect()
}
