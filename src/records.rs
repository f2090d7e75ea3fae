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
//! Module defining record data types to (de-)serialize updates and summaries to CSV.

use serde::{de::IntoDeserializer, Deserialize, Deserializer, Serialize, Serializer};

use crate::{strategy::ReductionStrategy, Asn};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// One raw update as delivered by a source, before normalization.
pub struct RawUpdate {
    /// Collector (vantage point) that observed the update.
    pub collector: String,
    /// Seconds since the UNIX epoch, UTC.
    pub time: f64,
    /// The announced prefix.
    pub prefix: String,
    /// The AS path as announced, prepending not yet collapsed.
    #[serde(
        serialize_with = "serialize_list",
        deserialize_with = "deserialize_list"
    )]
    pub path: Vec<Asn>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
/// One summary emitted for a (window, collector, strategy) triple.
pub struct SummaryRow {
    /// Label of the window start, `%Y-%m-%d %H:%M`.
    pub window: String,
    pub collector: String,
    pub strategy: ReductionStrategy,
    /// The origin AS selected by the strategy.
    pub origin: Asn,
    pub metric: f64,
    pub supporting_count: usize,
}

fn serialize_list<S: Serializer, T: ToString>(
    list: &[T],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    // Join the hops as a comma-separated string
    let list_str = list
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(",");

    serializer.serialize_str(&list_str)
}

fn deserialize_list<'de, D: Deserializer<'de>, T: Deserialize<'de>>(
    deserializer: D,
) -> Result<Vec<T>, D::Error> {
    let buf = String::deserialize(deserializer)?;
    if buf.is_empty() {
        return Ok(Vec::new());
    }
    buf.split(',')
        .map(|x| T::deserialize(x.into_deserializer()))
        .collect()
}
