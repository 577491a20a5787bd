use crate::ids::RoomId;
use crate::interval::Interval;
use chrono::NaiveDateTime;
use itertools::Itertools;
use serde::Serialize;
use std::ops::Range;

/// A maximal run of consecutive intervals spent in one room
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomSegment {
    /// First interval of the run
    pub enter: Interval,
    /// Timestamp the subject left the room
    #[serde(serialize_with = "serialize_ts")]
    pub exit: NaiveDateTime,
    /// Indices of the intervals covered by this segment
    pub span: Range<usize>,
}

fn serialize_ts<S: serde::Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&ts.format(crate::interval::TIMESTAMP_FORMAT))
}

impl RoomSegment {
    pub fn room(&self) -> &RoomId {
        &self.enter.room_def_id
    }

    pub fn interval_count(&self) -> usize {
        self.span.len()
    }
}

/// Split time-ordered intervals into room segments.
///
/// A new segment opens wherever consecutive intervals differ in room, and
/// the closed segment exits at the timestamp of the interval that changed
/// rooms. The last segment exits at the last interval's own timestamp, so a
/// session ending on a room change yields a zero-width final segment.
///
/// Intervals must be in ascending timestamp order (see
/// [`check_monotonic`](crate::interval::check_monotonic)); they are never
/// re-sorted here.
pub fn room_segments(intervals: &[Interval]) -> Vec<RoomSegment> {
    let Some(last) = intervals.last() else {
        return Vec::new();
    };

    let mut segments = Vec::new();
    let mut start = 0;

    for (index, interval) in intervals.iter().enumerate().skip(1) {
        if interval.room_def_id != intervals[start].room_def_id {
            segments.push(RoomSegment {
                enter: intervals[start].clone(),
                exit: interval.ts,
                span: start..index,
            });
            start = index;
        }
    }

    segments.push(RoomSegment {
        enter: intervals[start].clone(),
        exit: last.ts,
        span: start..intervals.len(),
    });

    log::debug!(
        "segmented {} intervals into {} room segments",
        intervals.len(),
        segments.len()
    );

    segments
}

/// Distinct rooms across segments, in first-seen order
pub fn relevant_rooms(segments: &[RoomSegment]) -> Vec<RoomId> {
    segments
        .iter()
        .map(|segment| segment.room().clone())
        .unique()
        .collect()
}
