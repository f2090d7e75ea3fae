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
//! Per-window grouping state: distinct path signatures per (origin, prefix).

use std::collections::{BTreeMap, HashSet};

use crate::{event::PathSignature, Asn};

/// Grouping state of one collector for the current window.
///
/// Keyed by the composite `(origin, prefix)` rather than nested maps, so a
/// reset is a single `clear` and per-origin lookups are range scans. The
/// first-seen order of origins is tracked separately: it defines the
/// tie-break order for the reduction strategies.
#[derive(Debug, Default, Clone)]
pub struct GroupingStore {
    paths: BTreeMap<(Asn, String), HashSet<PathSignature>>,
    origin_order: Vec<Asn>,
}

impl GroupingStore {
    /// Record one observation. Repeated observations of the identical
    /// (origin, prefix, path) triple within a window are idempotent.
    pub fn record(&mut self, origin: Asn, prefix: &str, path: PathSignature) {
        if !self.contains_origin(origin) {
            self.origin_order.push(origin);
        }
        self.paths
            .entry((origin, prefix.to_string()))
            .or_default()
            .insert(path);
    }

    /// Discard all entries of the current window. Diversity metrics are
    /// window-local, so nothing carries over.
    pub fn reset(&mut self) {
        self.paths.clear();
        self.origin_order.clear();
    }

    /// True if nothing was recorded this window.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Origins in first-seen order.
    pub fn origins(&self) -> impl Iterator<Item = Asn> + '_ {
        self.origin_order.iter().copied()
    }

    /// The prefixes tracked under `origin`, each with its distinct-path
    /// count. Every yielded count is at least 1, since a prefix key is only
    /// ever created together with an insertion.
    pub fn prefixes(&self, origin: Asn) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.paths
            .range((origin, String::new())..)
            .take_while(move |((o, _), _)| *o == origin)
            .map(|((_, prefix), paths)| (prefix.as_str(), paths.len()))
    }

    fn contains_origin(&self, origin: Asn) -> bool {
        self.paths
            .range((origin, String::new())..)
            .next()
            .is_some_and(|((o, _), _)| *o == origin)
    }
}
