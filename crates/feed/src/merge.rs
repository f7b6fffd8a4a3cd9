//! Chronological merge of per-instrument row series.
//!
//! Turns N individually time-sorted series into one globally ordered,
//! single-pass sequence. Ordering key is (timestamp, ticker): the ticker
//! tie-break exists purely so that two instruments reporting a bar at the
//! identical timestamp always emit in the same order, run after run.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tape_core::TimestampMs;

use crate::loader::PriceRow;

/// A row labeled with its instrument, as produced by the merged stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRow {
    /// Instrument the row belongs to.
    pub ticker: String,
    /// The row itself, passed through unchanged.
    pub row: PriceRow,
}

/// One registered series and its consumption cursor.
#[derive(Debug)]
struct SeriesCursor {
    ticker: String,
    rows: Vec<PriceRow>,
    next: usize,
}

/// Heap key; the smallest (time, ticker) pair is emitted first.
///
/// The series index participates only to make the ordering total; distinct
/// series never share a ticker, so it cannot influence emission order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct HeapKey {
    time: TimestampMs,
    ticker: String,
    series: usize,
}

/// K-way merge over per-instrument sorted series.
///
/// Holds one pending heap entry per series, so memory is O(K) beyond the
/// series themselves, and within-series duplicates can never reorder. The
/// sequence is consumed exactly once; restart requires reconstruction.
#[derive(Debug, Default)]
pub struct SeriesMerge {
    series: Vec<SeriesCursor>,
    heap: BinaryHeap<Reverse<HeapKey>>,
}

impl SeriesMerge {
    /// Create a merge with no series registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one instrument's time-sorted rows.
    ///
    /// A series with zero rows contributes nothing. Registration is allowed
    /// after consumption has begun: the new series joins the still-pending
    /// merge and already-emitted rows are not revisited.
    pub fn add_series(&mut self, ticker: &str, rows: Vec<PriceRow>) {
        let index = self.series.len();
        self.series.push(SeriesCursor {
            ticker: ticker.to_string(),
            rows,
            next: 0,
        });
        self.push_key(index);
    }

    /// Total rows not yet emitted.
    pub fn remaining(&self) -> usize {
        self.series.iter().map(|s| s.rows.len() - s.next).sum()
    }

    fn push_key(&mut self, index: usize) {
        let cursor = &self.series[index];
        if let Some(row) = cursor.rows.get(cursor.next) {
            self.heap.push(Reverse(HeapKey {
                time: row.time,
                ticker: cursor.ticker.clone(),
                series: index,
            }));
        }
    }
}

impl Iterator for SeriesMerge {
    type Item = MergedRow;

    fn next(&mut self) -> Option<MergedRow> {
        let Reverse(key) = self.heap.pop()?;
        let cursor = &mut self.series[key.series];
        let row = cursor.rows[cursor.next];
        cursor.next += 1;
        self.push_key(key.series);
        Some(MergedRow {
            ticker: key.ticker,
            row,
        })
    }
}
