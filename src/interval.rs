use crate::error::{Error, Result};
use crate::ids::RoomId;
use crate::segment::{relevant_rooms, room_segments, RoomSegment};
use chrono::{DateTime, NaiveDateTime};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Wire format of interval timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse an interval timestamp; RFC 3339 strings are accepted as UTC
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.naive_utc()))
        .map_err(|_| Error::InvalidTimestamp {
            value: value.to_string(),
        })
}

mod timestamp {
    use super::{parse_timestamp, TIMESTAMP_FORMAT};
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&ts.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

/// Something that happened inside an interval (a hitch, a load, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    pub offset: f64,
}

/// One fixed-width telemetry sample of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    #[serde(with = "timestamp")]
    pub ts: NaiveDateTime,
    pub fps_avg: f64,
    pub memory_used: f64,
    pub room_def_id: RoomId,
    #[serde(default)]
    pub num_events: u32,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Interval {
    pub fn has_events(&self) -> bool {
        self.num_events > 0
    }

    /// Hover text for an event marker, one line per event
    pub fn tooltip_text(&self) -> String {
        self.events
            .iter()
            .map(|e| format!("Event: {}  Offset: {}", e.kind, e.offset))
            .join("\n")
    }
}

/// Check that timestamps never go backwards.
///
/// Segmentation walks intervals in the order received and never re-sorts,
/// so a decreasing timestamp is reported instead of producing segments with
/// negative widths. Equal neighbours are allowed.
pub fn check_monotonic(intervals: &[Interval]) -> Result<()> {
    match intervals
        .iter()
        .tuple_windows()
        .position(|(prev, next)| next.ts < prev.ts)
    {
        Some(pos) => Err(Error::NonMonotonicTimestamps { index: pos + 1 }),
        None => Ok(()),
    }
}

/// Ordered intervals of the session currently on screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalStore {
    intervals: Vec<Interval>,
}

impl IntervalStore {
    /// Build a store from intervals already sorted by ascending timestamp
    pub fn new(intervals: Vec<Interval>) -> Result<Self> {
        check_monotonic(&intervals)?;
        Ok(Self { intervals })
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn segments(&self) -> Vec<RoomSegment> {
        room_segments(&self.intervals)
    }

    /// Distinct rooms in first-visit order
    pub fn relevant_rooms(&self) -> Vec<RoomId> {
        relevant_rooms(&self.segments())
    }

    /// Intervals that carry at least one event
    pub fn event_markers(&self) -> impl Iterator<Item = &Interval> {
        self.intervals.iter().filter(|i| i.has_events())
    }

    /// First and last timestamp, `None` when empty
    pub fn time_extent(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match (self.intervals.first(), self.intervals.last()) {
            (Some(first), Some(last)) => Some((first.ts, last.ts)),
            _ => None,
        }
    }
}
