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
//! Reduction strategies turning one window's grouping state into summary tuples.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::{store::GroupingStore, Asn};

/// One reduced data point: the selected origin, its metric value, and a
/// supporting count whose meaning depends on the strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub origin: Asn,
    pub metric: f64,
    pub supporting_count: usize,
}

/// The closed set of per-window reduction strategies.
///
/// All strategies select the best-ranked origin by their metric; ties are
/// broken by the first origin in first-seen order, which makes repeated runs
/// over the same input ordering deterministic.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumIter,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReductionStrategy {
    /// The largest number of distinct paths observed for any single prefix
    /// under an origin; supporting count = distinct prefixes of that origin.
    MaxPaths,
    /// The mean distinct-path count over all prefixes of an origin, rounded
    /// to 2 decimal digits; supporting count = distinct prefixes.
    AveragePaths,
    /// The number of distinct prefixes under an origin; supporting count =
    /// total distinct paths summed over those prefixes.
    CountUniquePrefixes,
}

impl ReductionStrategy {
    /// Reduce one collector's grouping state to its summary tuples.
    ///
    /// Strategies are pure: the store is only read. Panics if the store is
    /// empty; callers must check `is_empty` before reducing. Violating that
    /// contract is a programming error, not a data-quality condition.
    pub fn reduce(&self, store: &GroupingStore) -> Vec<Reduction> {
        assert!(
            !store.is_empty(),
            "reduction invoked on an empty grouping store"
        );
        let mut best: Option<Reduction> = None;
        for origin in store.origins() {
            let candidate = self.evaluate(store, origin);
            // strictly greater, so the first origin wins ties
            if best
                .as_ref()
                .map_or(true, |b| OrderedFloat(candidate.metric) > OrderedFloat(b.metric))
            {
                best = Some(candidate);
            }
        }
        best.into_iter().collect()
    }

    fn evaluate(&self, store: &GroupingStore, origin: Asn) -> Reduction {
        let mut num_prefixes = 0usize;
        let mut total_paths = 0usize;
        let mut max_paths = 0usize;
        for (_, count) in store.prefixes(origin) {
            num_prefixes += 1;
            total_paths += count;
            max_paths = max_paths.max(count);
        }
        // a prefix key is only created alongside an insertion
        debug_assert!(num_prefixes > 0, "origin {origin} tracked without any prefix");

        match self {
            Self::MaxPaths => Reduction {
                origin,
                metric: max_paths as f64,
                supporting_count: num_prefixes,
            },
            Self::AveragePaths => Reduction {
                origin,
                metric: round2(total_paths as f64 / num_prefixes as f64),
                supporting_count: num_prefixes,
            },
            Self::CountUniquePrefixes => Reduction {
                origin,
                metric: num_prefixes as f64,
                supporting_count: total_paths,
            },
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
