// PATHDIV: Batch Aggregation of AS-Path Diversity from Collected BGP Updates
// Copyright (C) 2024-2025 The pathdiv developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! The streaming batch aggregator: windowing, per-collector grouping, and
//! per-window reduction over a shared clock.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::{
    event::UpdateEvent,
    records::{RawUpdate, SummaryRow},
    store::GroupingStore,
    strategy::ReductionStrategy,
    window::{window_label, WindowClock},
};

/// Per-collector grouping state behind one shared window clock.
///
/// All collectors' windows stay phase-aligned: a closure triggered by any
/// event closes the window of every tracked collector at the same boundary.
/// Collectors are iterated in their configured order when a window closes.
#[derive(Debug, Clone)]
pub struct MultiCollectorFanout {
    order: Vec<String>,
    stores: HashMap<String, GroupingStore>,
}

impl MultiCollectorFanout {
    pub fn new(collectors: impl IntoIterator<Item = String>) -> Self {
        let mut order = Vec::new();
        let mut stores = HashMap::new();
        for collector in collectors {
            if stores.contains_key(&collector) {
                continue;
            }
            stores.insert(collector.clone(), GroupingStore::default());
            order.push(collector);
        }
        Self { order, stores }
    }

    /// The tracked collectors, in configured order.
    pub fn collectors(&self) -> &[String] {
        &self.order
    }

    /// Record a normalized event. Returns `false` if the event's collector
    /// is not tracked; such events are ignored, not an error.
    pub fn record(&mut self, event: &UpdateEvent) -> bool {
        let Some(store) = self.stores.get_mut(&event.collector) else {
            return false;
        };
        store.record(event.origin, &event.prefix, event.path.clone());
        true
    }

    /// Close the current window: reduce and reset every tracked collector in
    /// configured order. Collectors without events this window are skipped
    /// entirely; no zero-rows are fabricated.
    pub fn close(&mut self, window: &str, strategies: &[ReductionStrategy]) -> Vec<SummaryRow> {
        let mut rows = Vec::new();
        for collector in &self.order {
            let store = self.stores.get_mut(collector).unwrap();
            if store.is_empty() {
                continue;
            }
            for strategy in strategies {
                rows.extend(strategy.reduce(store).into_iter().map(|r| SummaryRow {
                    window: window.to_string(),
                    collector: collector.clone(),
                    strategy: *strategy,
                    origin: r.origin,
                    metric: r.metric,
                    supporting_count: r.supporting_count,
                }));
            }
            store.reset();
        }
        rows
    }

    fn is_all_empty(&self) -> bool {
        self.stores.values().all(GroupingStore::is_empty)
    }
}

/// Consumes a time-ordered update stream and emits one batch of summary rows
/// per window closure.
///
/// The aggregator exclusively owns the grouping state; reductions only ever
/// see it by shared reference for the duration of one `close`. The window
/// start is a single shared value across all collectors and is advanced
/// exactly once per closure, regardless of how many collectors emit.
#[derive(Debug, Clone)]
pub struct BatchAggregator {
    clock: WindowClock,
    window_start: Option<DateTime<Utc>>,
    strategies: Vec<ReductionStrategy>,
    fanout: MultiCollectorFanout,
}

impl BatchAggregator {
    pub fn new(
        duration: Duration,
        collectors: impl IntoIterator<Item = String>,
        strategies: Vec<ReductionStrategy>,
    ) -> Self {
        Self {
            clock: WindowClock::new(duration),
            window_start: None,
            strategies,
            fanout: MultiCollectorFanout::new(collectors),
        }
    }

    /// Ingest the next update from the stream.
    ///
    /// Updates whose origin cannot be determined are dropped entirely.
    /// Updates from untracked collectors still drive the shared clock but
    /// are never recorded. Returns the summary rows emitted by a window
    /// closure, or an empty vector if the window stays open.
    pub fn ingest(&mut self, raw: RawUpdate) -> Vec<SummaryRow> {
        let Some(event) = UpdateEvent::normalize(raw) else {
            log::trace!("dropping update with undeterminable origin");
            return Vec::new();
        };

        let (start, closed) = self.clock.advance(self.window_start, event.time);
        let mut rows = Vec::new();
        if closed {
            let label = window_label(self.window_start.unwrap());
            rows = self.fanout.close(&label, &self.strategies);
            log::debug!("window {label} closed with {} summary rows", rows.len());
        }
        self.window_start = Some(start);

        if !self.fanout.record(&event) {
            log::trace!("ignoring update from untracked collector {}", event.collector);
        }
        rows
    }

    /// Emit the trailing partial window, if any.
    ///
    /// The end of the stream does not flush by itself; callers that want the
    /// final partial window must ask for it. Idempotent: a second call (or a
    /// call before any data arrived) is a no-op returning no rows.
    pub fn flush(&mut self) -> Vec<SummaryRow> {
        let Some(start) = self.window_start else {
            return Vec::new();
        };
        if self.fanout.is_all_empty() {
            return Vec::new();
        }
        let label = window_label(start);
        let rows = self.fanout.close(&label, &self.strategies);
        log::debug!("flushed partial window {label} with {} summary rows", rows.len());
        rows
    }

    pub fn strategies(&self) -> &[ReductionStrategy] {
        &self.strategies
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const T0: f64 = 1704092400.0; // 2024-01-01 07:00:00 UTC
    const HOUR: f64 = 3600.0;

    fn raw(collector: &str, offset: f64, prefix: &str, path: &[u32]) -> RawUpdate {
        RawUpdate {
            collector: collector.to_string(),
            time: T0 + offset,
            prefix: prefix.to_string(),
            path: path.to_vec(),
        }
    }

    fn aggregator(collectors: &[&str]) -> BatchAggregator {
        BatchAggregator::new(
            Duration::minutes(60),
            collectors.iter().map(|c| c.to_string()),
            vec![ReductionStrategy::MaxPaths],
        )
    }

    #[test]
    fn closure_fires_at_the_boundary_event() {
        let mut agg = aggregator(&["rrc00"]);
        assert!(agg.ingest(raw("rrc00", 0.0, "p1", &[1, 2])).is_empty());
        assert!(agg.ingest(raw("rrc00", 59.0 * 60.0, "p1", &[1, 3])).is_empty());
        let rows = agg.ingest(raw("rrc00", HOUR, "p2", &[1, 2]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].window, "2024-01-01 07:00");
        assert_eq!(rows[0].origin, 1);
        assert_eq!(rows[0].metric, 2.0);
        assert_eq!(rows[0].supporting_count, 1);
    }

    #[test]
    fn one_batch_per_closure_and_no_auto_flush() {
        let mut agg = aggregator(&["rrc00"]);
        let mut batches = 0;
        for i in 0..5 {
            let rows = agg.ingest(raw("rrc00", i as f64 * HOUR, "p", &[1, i]));
            if !rows.is_empty() {
                batches += 1;
            }
        }
        // 5 events at exact hour marks: 4 closures, trailing window unflushed
        assert_eq!(batches, 4);
        assert_eq!(agg.flush().len(), 1);
    }

    #[test]
    fn gap_longer_than_window_emits_once() {
        let mut agg = aggregator(&["rrc00"]);
        agg.ingest(raw("rrc00", 0.0, "p", &[1, 2]));
        let rows = agg.ingest(raw("rrc00", 5.0 * HOUR, "p", &[1, 3]));
        // no synthetic rows for the empty windows in between
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].window, "2024-01-01 07:00");
        let rows = agg.flush();
        assert_eq!(rows[0].window, "2024-01-01 12:00");
    }

    #[test]
    fn malformed_and_untracked_events_are_dropped() {
        let mut agg = aggregator(&["rrc00"]);
        assert!(agg.ingest(raw("rrc00", 0.0, "p", &[])).is_empty());
        assert!(agg.ingest(raw("route-views2", 1.0, "p", &[7, 8])).is_empty());
        // nothing recorded for rrc00, so nothing to flush
        assert!(agg.flush().is_empty());
    }

    #[test]
    fn multi_collector_windows_stay_aligned() {
        let mut agg = aggregator(&["rrc00", "rrc01"]);
        agg.ingest(raw("rrc01", 10.0, "p", &[5, 6]));
        agg.ingest(raw("rrc00", 20.0, "q", &[7, 8]));
        // closure triggered by an rrc00 event closes both collectors
        let rows = agg.ingest(raw("rrc00", 10.0 + HOUR, "q", &[7, 9]));
        assert_eq!(rows.len(), 2);
        // configured order, not event-arrival order
        assert_eq!(rows[0].collector, "rrc00");
        assert_eq!(rows[1].collector, "rrc01");
        assert_eq!(rows[0].window, rows[1].window);
    }

    #[test]
    fn collector_without_events_is_skipped() {
        let mut agg = aggregator(&["rrc00", "rrc01"]);
        agg.ingest(raw("rrc00", 0.0, "p", &[1, 2]));
        let rows = agg.ingest(raw("rrc00", HOUR, "p", &[1, 2]));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].collector, "rrc00");
    }

    #[test]
    fn multiple_strategies_emit_one_row_each() {
        let mut agg = BatchAggregator::new(
            Duration::minutes(60),
            ["rrc00".to_string()],
            vec![ReductionStrategy::MaxPaths, ReductionStrategy::AveragePaths],
        );
        agg.ingest(raw("rrc00", 0.0, "p1", &[1, 2]));
        agg.ingest(raw("rrc00", 1.0, "p1", &[1, 3]));
        agg.ingest(raw("rrc00", 2.0, "p1", &[1, 4]));
        agg.ingest(raw("rrc00", 3.0, "p2", &[1, 2]));
        let rows = agg.ingest(raw("rrc00", HOUR, "p", &[1, 2]));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].strategy, ReductionStrategy::MaxPaths);
        assert_eq!(rows[0].metric, 3.0);
        assert_eq!(rows[1].strategy, ReductionStrategy::AveragePaths);
        assert_eq!(rows[1].metric, 2.0);
        assert_eq!(rows[1].supporting_count, 2);
    }

    #[test]
    fn flush_is_idempotent() {
        let mut agg = aggregator(&["rrc00"]);
        assert!(agg.flush().is_empty());
        agg.ingest(raw("rrc00", 0.0, "p", &[1, 2]));
        assert_eq!(agg.flush().len(), 1);
        assert!(agg.flush().is_empty());
    }

    #[test]
    fn repeated_identical_paths_do_not_inflate_diversity() {
        let mut agg = aggregator(&["rrc00"]);
        agg.ingest(raw("rrc00", 0.0, "p", &[1, 2, 3]));
        agg.ingest(raw("rrc00", 1.0, "p", &[1, 2, 3]));
        agg.ingest(raw("rrc00", 2.0, "p", &[1, 1, 2, 3]));
        let rows = agg.flush();
        assert_eq!(rows[0].metric, 1.0);
    }
}
