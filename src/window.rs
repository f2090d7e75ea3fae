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
//! Event-time windowing policy over half-open intervals `[start, start + duration)`.

use chrono::{DateTime, Duration, Utc};

/// Decides when the current window closes, driven purely by event
/// timestamps. The clock never runs on wall-clock time: a gap in the stream
/// longer than the window duration simply skips the empty windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowClock {
    duration: Duration,
}

impl WindowClock {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Advance the clock with the next event timestamp.
    ///
    /// Returns the window start to use from now on and whether the previous
    /// window just closed. The first event establishes the first window's
    /// start without signaling a closure; any later event whose timestamp is
    /// at least `start + duration` closes the window and seeds the next
    /// window's start with its own timestamp.
    pub fn advance(
        &self,
        current_start: Option<DateTime<Utc>>,
        event_time: DateTime<Utc>,
    ) -> (DateTime<Utc>, bool) {
        match current_start {
            None => (event_time, false),
            Some(start) if event_time - start >= self.duration => (event_time, true),
            Some(start) => (start, false),
        }
    }
}

/// Label of the window starting at `start`, as used in persisted rows and
/// plot axes.
pub fn window_label(start: DateTime<Utc>) -> String {
    start.format("%Y-%m-%d %H:%M").to_string()
}
