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
//! Update sources: sequential pull of raw updates from MRT dumps or CSV files.

use std::{fs, path::Path};

use bgpkit_parser::{models::ElemType, BgpElem, BgpkitParser};
use ipnet::IpNet;

use crate::{event::parse_hops, records::RawUpdate};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("BGP parser error: {0}")]
    Parser(#[from] bgpkit_parser::error::ParserErrorWithBytes),
}

/// A lazy, ordered, finite sequence of raw updates. The aggregator pulls
/// from a source one update at a time and never seeks.
pub trait UpdateSource: Iterator<Item = Result<RawUpdate, SourceError>> {}

impl<T: Iterator<Item = Result<RawUpdate, SourceError>>> UpdateSource for T {}

/// Reads announcements from an MRT update dump.
///
/// Only IPv4 announcement elements are yielded, matching the collection
/// filter of the update feeds we analyze. MRT elements do not carry the
/// collector name, so it is supplied per file. Elements whose AS path
/// contains anything but plain AS numbers (e.g. AS-sets) are skipped.
pub struct MrtSource {
    collector: String,
    elems: Box<dyn Iterator<Item = BgpElem>>,
}

impl MrtSource {
    pub fn new(path: &str, collector: impl Into<String>) -> Result<Self, SourceError> {
        let parser = BgpkitParser::new(path)?;
        Ok(Self {
            collector: collector.into(),
            elems: Box::new(parser.into_elem_iter()),
        })
    }
}

impl Iterator for MrtSource {
    type Item = Result<RawUpdate, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let elem = self.elems.next()?;
            if !matches!(elem.elem_type, ElemType::ANNOUNCE) {
                continue;
            }
            let IpNet::V4(prefix) = elem.prefix.prefix else {
                continue;
            };
            let Some(path) = elem.as_path.as_ref() else {
                log::trace!("skipping announcement of {prefix} without an AS path");
                continue;
            };
            let Some(hops) = parse_hops(&path.to_string()) else {
                log::trace!("skipping announcement of {prefix} with AS-set in path");
                continue;
            };
            return Some(Ok(RawUpdate {
                collector: self.collector.clone(),
                time: elem.timestamp,
                prefix: prefix.to_string(),
                path: hops,
            }));
        }
    }
}

/// Reads pre-extracted updates from a `;`-delimited CSV of [`RawUpdate`]
/// rows, as written by the extraction step.
pub struct CsvSource {
    records: csv::DeserializeRecordsIntoIter<fs::File, RawUpdate>,
}

impl CsvSource {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let file = fs::File::open(path)?;
        let reader = csv::ReaderBuilder::new().delimiter(b';').from_reader(file);
        Ok(Self {
            records: reader.into_deserialize(),
        })
    }
}

impl Iterator for CsvSource {
    type Item = Result<RawUpdate, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.records.next()?.map_err(SourceError::from))
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    #[test]
    fn csv_source_reads_raw_updates() {
        let mut path = std::env::temp_dir();
        path.push(format!("pathdiv_updates_{}.csv", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "collector;time;prefix;path").unwrap();
        writeln!(file, "rrc00;1704092400.0;10.0.0.0/8;3356,1299,13335").unwrap();
        writeln!(file, "rrc00;1704092401.0;10.0.0.0/9;3356,3356,13335").unwrap();
        drop(file);

        let updates = CsvSource::new(&path)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].collector, "rrc00");
        assert_eq!(updates[0].path, vec![3356, 1299, 13335]);
        assert_eq!(updates[1].time, 1704092401.0);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            CsvSource::new("/nonexistent/updates.csv"),
            Err(SourceError::Io(_))
        ));
    }
}
