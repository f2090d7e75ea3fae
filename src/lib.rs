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
//! Library for batching a time-ordered stream of BGP update events into fixed
//! windows and summarizing the AS-path diversity per origin and prefix.

/// Type for AS numbers as they appear in AS paths.
pub type Asn = u32;

pub mod aggregator;
pub mod event;
pub mod plot;
pub mod records;
pub mod sink;
pub mod source;
pub mod store;
pub mod strategy;
pub mod util;
pub mod window;

pub mod prelude {
    pub use super::{
        aggregator::{BatchAggregator, MultiCollectorFanout},
        event::{PathSignature, UpdateEvent},
        records::{RawUpdate, SummaryRow},
        strategy::ReductionStrategy,
        window::WindowClock,
        Asn,
    };
}
