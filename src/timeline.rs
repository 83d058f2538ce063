//! Release timeline of an artist.
//!
//! Catalog release dates come with year, month or day precision
//! (`2018`, `2018-11`, `2018-11-23`). Coarser dates are anchored on the first
//! day of their period.

use crate::types::Release;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Granularity of a catalog release date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePrecision {
    Year,
    Month,
    Day,
}

/// A release placed on the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub date: NaiveDate,
    pub precision: DatePrecision,
    pub release: Release,
}

/// Releases in chronological order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    pub entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&TimelineEntry> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&TimelineEntry> {
        self.entries.last()
    }

    /// Calendar years between the first and the last release.
    pub fn span_years(&self) -> i32 {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => last.date.year() - first.date.year(),
            _ => 0,
        }
    }

    /// Number of releases per calendar year, ascending.
    pub fn releases_per_year(&self) -> BTreeMap<i32, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.date.year()).or_insert(0) += 1;
        }
        counts
    }
}

/// Parse a catalog release date.
///
/// Year zero is the catalog's placeholder for an unknown date and is refused.
pub fn parse_release_date(raw: &str) -> Option<(NaiveDate, DatePrecision)> {
    let raw = raw.trim();
    let parsed = if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Some((date, DatePrecision::Day))
    } else if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        Some((date, DatePrecision::Month))
    } else if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
        raw.parse()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
            .map(|date| (date, DatePrecision::Year))
    } else {
        None
    };
    parsed.filter(|(date, _)| date.year() > 0)
}

/// Sort releases chronologically, dropping unparsable dates.
///
/// Releases sharing a date keep their catalog order.
pub fn build_timeline(releases: Vec<Release>) -> Timeline {
    let mut entries: Vec<TimelineEntry> = releases
        .into_iter()
        .filter_map(|release| match parse_release_date(&release.release_date) {
            Some((date, precision)) => Some(TimelineEntry {
                date,
                precision,
                release,
            }),
            None => {
                log::debug!(
                    "Dropping release '{}' with unparsable date '{}'",
                    release.name,
                    release.release_date
                );
                None
            }
        })
        .collect();
    entries.sort_by_key(|entry| entry.date);
    Timeline { entries }
}
