use crate::config::Config;
use crate::ids::{RoomId, SessionId};
use crate::interval::{Interval, IntervalStore};
use crate::search::RoomCatalog;
use crate::segment::{relevant_rooms, RoomSegment};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Session whose timeline is on screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentSession {
    pub session: SessionId,
    pub user: String,
}

pub fn chart_title(current: Option<&CurrentSession>) -> String {
    match current {
        Some(c) => format!("User: {} - Session: {}", c.user, c.session),
        None => "Sample Chart".to_string(),
    }
}

/// Memory axis bounds: headroom above the peak, or a fixed ceiling when empty
pub fn memory_range(intervals: &[Interval], config: &Config) -> (f64, f64) {
    let peak = intervals
        .iter()
        .map(|i| i.memory_used)
        .fold(None, |acc: Option<f64>, m| Some(acc.map_or(m, |a| a.max(m))));

    match peak {
        Some(max) => (0.0, max + config.memory_headroom),
        None => (0.0, config.default_memory_ceiling),
    }
}

/// Grid cell (column, row) of the `index`-th legend entry
pub fn legend_cell(index: usize, columns: usize) -> (usize, usize) {
    let columns = columns.max(1);
    (index % columns, index / columns)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub room: RoomId,
    pub label: String,
    pub column: usize,
    pub row: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventMarker {
    pub interval: Interval,
    pub tooltip: String,
}

/// Everything the timeline renderer needs, minus pixels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartModel {
    pub title: String,
    #[serde(skip)]
    pub time_extent: Option<(NaiveDateTime, NaiveDateTime)>,
    pub fps_range: (f64, f64),
    pub memory_range: (f64, f64),
    pub segments: Vec<RoomSegment>,
    pub legend: Vec<LegendEntry>,
    pub markers: Vec<EventMarker>,
}

impl ChartModel {
    pub fn build(
        store: &IntervalStore,
        current: Option<&CurrentSession>,
        catalog: &RoomCatalog,
        config: &Config,
    ) -> Self {
        let segments = store.segments();
        let legend = relevant_rooms(&segments)
            .into_iter()
            .enumerate()
            .map(|(i, room)| {
                let (column, row) = legend_cell(i, config.legend_columns);
                LegendEntry {
                    label: catalog.label(&room),
                    room,
                    column,
                    row,
                }
            })
            .collect();
        let markers = store
            .event_markers()
            .map(|i| EventMarker {
                tooltip: i.tooltip_text(),
                interval: i.clone(),
            })
            .collect();

        Self {
            title: chart_title(current),
            time_extent: store.time_extent(),
            fps_range: (config.min_fps, config.max_fps),
            memory_range: memory_range(store.intervals(), config),
            segments,
            legend,
            markers,
        }
    }

    pub fn rooms(&self) -> impl Iterator<Item = &RoomId> {
        self.legend.iter().map(|entry| &entry.room)
    }
}
