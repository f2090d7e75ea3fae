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
//! Time-series visualization of the per-window diversity metrics.

use std::{collections::BTreeMap, path::Path};

use plotly::{
    common::Mode,
    layout::{Axis, AxisType},
    Plot, Scatter,
};

use crate::records::SummaryRow;

type TraceData = BTreeMap<(String, String), (Vec<String>, Vec<f64>)>;

/// Snap a metric to the next power of two, for the `2^n` log scale of the
/// diversity plot. Non-positive values map to 1.
pub fn pow2_ceil(value: f64) -> f64 {
    if value > 0.0 {
        2f64.powf(value.log2().ceil())
    } else {
        1.0
    }
}

/// Group summary rows into one (window label, transformed metric) series per
/// (collector, strategy) pair, windows in emission order.
fn trace_data(rows: &[SummaryRow]) -> TraceData {
    let mut traces = TraceData::new();
    for row in rows {
        let key = (row.collector.clone(), row.strategy.to_string());
        let (t, y) = traces.entry(key).or_default();
        t.push(row.window.clone());
        y.push(pow2_ceil(row.metric));
    }
    traces
}

/// Build the diversity time-series plot: one lines+markers trace per
/// (collector, strategy) pair, metric on a `2^n` log axis.
pub fn diversity_plot(rows: &[SummaryRow]) -> Plot {
    let traces = trace_data(rows);
    let max_exp = traces
        .values()
        .flat_map(|(_, y)| y.iter())
        .fold(0, |acc, y| acc.max(y.log2().ceil() as i32));

    let mut plot = Plot::new();
    plot.set_layout(
        plot.layout()
            .clone()
            .title("<b>Path Diversity per Time Window (2^n Scale)</b>".to_string())
            .x_axis(Axis::new().title("Time Window".to_string()).tick_angle(-45.0))
            .y_axis(
                Axis::new()
                    .title("Metric (2^n)".to_string())
                    .type_(AxisType::Log)
                    .tick_values((0..=max_exp).map(|i| 2f64.powi(i)).collect())
                    .tick_text((0..=max_exp).map(|i| format!("2^{i}")).collect()),
            )
            .height(600),
    );
    log::debug!("plotting {} traces", traces.len());
    for ((collector, strategy), (t, y)) in traces {
        plot.add_trace(
            Scatter::new(t, y)
                .name(format!("{collector} {strategy}"))
                .mode(Mode::LinesMarkers),
        );
    }
    plot
}

/// Render the plot as a standalone HTML file; optionally open it in the
/// browser right away.
pub fn render(rows: &[SummaryRow], path: impl AsRef<Path>, show: bool) {
    if rows.is_empty() {
        log::warn!("no summary rows were emitted, skipping the plot");
        return;
    }
    let plot = diversity_plot(rows);
    plot.write_html(path.as_ref());
    log::info!("wrote diversity plot to {:?}", path.as_ref());
    if show {
        plot.show();
    }
}

#[cfg(test)]
mod test {
    use crate::strategy::ReductionStrategy;

    use super::*;

    #[test]
    fn pow2_ceil_transform() {
        assert_eq!(pow2_ceil(0.0), 1.0);
        assert_eq!(pow2_ceil(1.0), 1.0);
        assert_eq!(pow2_ceil(3.0), 4.0);
        assert_eq!(pow2_ceil(8.0), 8.0);
        assert_eq!(pow2_ceil(1000.0), 1024.0);
    }

    #[test]
    fn one_trace_per_collector_and_strategy() {
        let row = |collector: &str, strategy, window: &str| SummaryRow {
            window: window.to_string(),
            collector: collector.to_string(),
            strategy,
            origin: 1,
            metric: 3.0,
            supporting_count: 1,
        };
        let rows = vec![
            row("rrc00", ReductionStrategy::MaxPaths, "2024-01-01 07:00"),
            row("rrc00", ReductionStrategy::AveragePaths, "2024-01-01 07:00"),
            row("rrc01", ReductionStrategy::MaxPaths, "2024-01-01 07:00"),
            row("rrc00", ReductionStrategy::MaxPaths, "2024-01-01 08:00"),
        ];
        let traces = trace_data(&rows);
        assert_eq!(traces.len(), 3);
        let (t, y) = &traces[&("rrc00".to_string(), "max_paths".to_string())];
        assert_eq!(t, &vec!["2024-01-01 07:00", "2024-01-01 08:00"]);
        assert_eq!(y, &vec![4.0, 4.0]);
    }
}
