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
//! Normalized update events and the canonical form of an AS path.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use itertools::Itertools;

use crate::{records::RawUpdate, Asn};

/// Canonical form of an AS path: immediately repeated hops (AS-path
/// prepending) are collapsed, so two observations of the same route are
/// recognized as the same path. Always contains at least one hop.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathSignature(Vec<Asn>);

impl PathSignature {
    /// Collapse a raw hop sequence into its canonical form. Returns `None`
    /// if the collapsed path is empty, i.e. the origin cannot be determined.
    pub fn collapse(hops: &[Asn]) -> Option<Self> {
        let collapsed = hops.iter().copied().dedup().collect::<Vec<_>>();
        (!collapsed.is_empty()).then_some(Self(collapsed))
    }

    /// The originator of the announced route, i.e. the first collapsed hop.
    pub fn origin(&self) -> Asn {
        self.0[0]
    }

    pub fn hops(&self) -> &[Asn] {
        &self.0
    }
}

impl fmt::Display for PathSignature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(" "))
    }
}

/// One normalized routing-update event, ready for the grouping stage.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEvent {
    pub collector: String,
    pub time: DateTime<Utc>,
    pub origin: Asn,
    pub prefix: String,
    pub path: PathSignature,
}

impl UpdateEvent {
    /// Normalize a raw update. Returns `None` for events that must be
    /// dropped before grouping: empty collapsed path, or a timestamp that
    /// does not map to a valid UTC instant.
    pub fn normalize(raw: RawUpdate) -> Option<Self> {
        let path = PathSignature::collapse(&raw.path)?;
        let time = from_epoch(raw.time)?;
        Some(Self {
            collector: raw.collector,
            time,
            origin: path.origin(),
            prefix: raw.prefix,
            path,
        })
    }
}

/// Convert fractional seconds since the UNIX epoch to a UTC instant.
pub fn from_epoch(time: f64) -> Option<DateTime<Utc>> {
    if !time.is_finite() {
        return None;
    }
    let secs = time.floor() as i64;
    let nanos = ((time - secs as f64) * 1e9) as u32;
    Utc.timestamp_opt(secs, nanos).single()
}

/// Parse an AS-path string of whitespace-separated hops. Returns `None` if
/// any hop is not a plain AS number (e.g. an AS-set in braces).
pub fn parse_hops(path: &str) -> Option<Vec<Asn>> {
    path.split_whitespace()
        .map(|hop| hop.parse::<Asn>().ok())
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn collapse_prepended_hops() {
        let sig = PathSignature::collapse(&[61218, 61218, 61218, 24961]).unwrap();
        assert_eq!(sig.hops(), &[61218, 24961]);
        assert_eq!(sig.origin(), 61218);
        assert_eq!(sig.to_string(), "61218 24961");
    }

    #[test]
    fn collapse_keeps_non_adjacent_repetition() {
        // only *immediately* repeated hops are collapsed
        let sig = PathSignature::collapse(&[1, 2, 1]).unwrap();
        assert_eq!(sig.hops(), &[1, 2, 1]);
    }

    #[test]
    fn collapse_empty_path() {
        assert_eq!(PathSignature::collapse(&[]), None);
    }

    #[test]
    fn normalize_drops_empty_path() {
        let raw = RawUpdate {
            collector: "rrc00".to_string(),
            time: 1704092400.0,
            prefix: "10.0.0.0/8".to_string(),
            path: vec![],
        };
        assert_eq!(UpdateEvent::normalize(raw), None);
    }

    #[test]
    fn normalize_derives_origin() {
        let raw = RawUpdate {
            collector: "rrc00".to_string(),
            time: 1704092400.5,
            prefix: "10.0.0.0/8".to_string(),
            path: vec![3356, 3356, 1299, 13335],
        };
        let ev = UpdateEvent::normalize(raw).unwrap();
        assert_eq!(ev.origin, 3356);
        assert_eq!(ev.path.hops(), &[3356, 1299, 13335]);
        assert_eq!(ev.time, from_epoch(1704092400.5).unwrap());
    }

    #[test]
    fn parse_hops_rejects_as_sets() {
        assert_eq!(parse_hops("3356 1299 13335"), Some(vec![3356, 1299, 13335]));
        assert_eq!(parse_hops("3356 {64512,64513}"), None);
    }
}
