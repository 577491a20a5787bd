use crate::aggregate::{self, Aggregate, Scope};
use crate::chart::{ChartModel, CurrentSession};
use crate::config::Config;
use crate::error::Result;
use crate::ids::SessionId;
use crate::interval::IntervalStore;
use crate::page_cache::{MergeReport, SessionPageCache};
use crate::search::{RoomCatalog, SearchQuery, SearchResponse, SessionDetailResponse};
use crate::selection::SelectionSet;
use crate::session::TableRow;

/// Application state behind one dashboard page.
///
/// Owns the current query and its page cache, the timeline of the session
/// being viewed, and the table selection. Collaborators hand it parsed
/// responses and read plain data back out.
#[derive(Debug, Default)]
pub struct Dashboard {
    config: Config,
    query: Option<SearchQuery>,
    cache: SessionPageCache,
    intervals: IntervalStore,
    current: Option<CurrentSession>,
    selection: SelectionSet,
    rooms: RoomCatalog,
}

impl Dashboard {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn query(&self) -> Option<&SearchQuery> {
        self.query.as_ref()
    }

    pub fn cache(&self) -> &SessionPageCache {
        &self.cache
    }

    pub fn intervals(&self) -> &IntervalStore {
        &self.intervals
    }

    pub fn current(&self) -> Option<&CurrentSession> {
        self.current.as_ref()
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn rooms(&self) -> &RoomCatalog {
        &self.rooms
    }

    /// Replace the room picker entries used to label the legend
    pub fn load_rooms(&mut self, catalog: RoomCatalog) {
        log::debug!("{} rooms in catalogue", catalog.rooms.len());
        self.rooms = catalog;
    }

    /// Fold a search response into the cache.
    ///
    /// A different query, or a changed total for the same query, starts a
    /// fresh result set and clears the selection. Otherwise the response is
    /// another page window of the current results and is merged in place.
    /// A rejected merge leaves the previous state intact.
    pub fn apply_search(
        &mut self,
        query: SearchQuery,
        response: &SearchResponse,
    ) -> Result<MergeReport> {
        let page_length = response.page_length.unwrap_or(self.config.page_length);
        let fresh = self.query.as_ref() != Some(&query)
            || self.cache.full_count() != response.full_count;

        if !fresh {
            return self
                .cache
                .merge_pages(&response.pages, page_length, &response.sessions);
        }

        let mut cache =
            SessionPageCache::initialize(response.full_count, response.avg_fps, response.avg_mem);
        let report = cache.merge_pages(&response.pages, page_length, &response.sessions)?;

        log::info!(
            "new result set: {} sessions, {} fetched",
            response.full_count,
            report.written
        );
        self.cache = cache;
        self.query = Some(query);
        self.selection.clear();
        Ok(report)
    }

    /// Replace the viewed timeline; bad input keeps the previous one
    pub fn load_session_detail(
        &mut self,
        session: SessionId,
        user: impl Into<String>,
        response: SessionDetailResponse,
    ) -> Result<()> {
        let store = IntervalStore::new(response.intervals).inspect_err(|e| {
            log::warn!("not loading session {session}: {e}");
        })?;
        self.intervals = store;
        self.current = Some(CurrentSession {
            session,
            user: user.into(),
        });
        Ok(())
    }

    pub fn select(&mut self, id: SessionId) -> bool {
        self.selection.select(id)
    }

    pub fn deselect(&mut self, id: &SessionId) -> bool {
        self.selection.deselect(id)
    }

    pub fn whole_set_aggregate(&self) -> Aggregate {
        aggregate::aggregate(&self.cache, Scope::WholeSet)
    }

    pub fn selected_aggregate(&self) -> Aggregate {
        aggregate::aggregate(&self.cache, Scope::Selection(&self.selection))
    }

    pub fn table_rows(&self) -> Vec<TableRow> {
        self.cache.rows()
    }

    pub fn chart(&self) -> ChartModel {
        ChartModel::build(
            &self.intervals,
            self.current.as_ref(),
            &self.rooms,
            &self.config,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::ids::RoomId;
    use crate::interval::{parse_timestamp, Interval};
    use crate::session::SessionSummary;
    use assert_matches::assert_matches;

    fn summary(n: usize) -> SessionSummary {
        SessionSummary {
            user_id: "u".into(),
            device_type: "d".into(),
            platform: 8,
            start_time: "2016-03-01 12:00:00".into(),
            id: SessionId::new(format!("s{n}")),
            room_def_id: RoomId::from("1"),
            build_type: 1,
            avg_fps: n as f64,
            avg_mem: 10.0 * n as f64,
        }
    }

    fn response(
        full_count: usize,
        pages: Vec<usize>,
        rows: std::ops::Range<usize>,
    ) -> SearchResponse {
        SearchResponse {
            full_count,
            avg_fps: 33.0,
            avg_mem: 330.0,
            pages,
            page_length: Some(10),
            sessions: rows.map(summary).collect(),
        }
    }

    fn query(user: &str) -> SearchQuery {
        SearchQuery {
            user: Some(user.into()),
            ..Default::default()
        }
    }

    #[test]
    fn same_query_merges_additional_pages() {
        let mut d = Dashboard::default();
        d.apply_search(query("a"), &response(40, vec![0, 1], 0..20)).unwrap();
        d.apply_search(query("a"), &response(40, vec![2, 3], 20..40)).unwrap();
        assert_eq!(d.cache().fetched_count(), 40);
    }

    #[test]
    fn new_query_discards_previous_results_and_selection() {
        let mut d = Dashboard::default();
        d.apply_search(query("a"), &response(40, vec![0], 0..10)).unwrap();
        d.select(SessionId::from("s3"));

        d.apply_search(query("b"), &response(12, vec![1], 10..12)).unwrap();
        assert_eq!(d.cache().full_count(), 12);
        assert_eq!(d.cache().fetched_count(), 2);
        assert!(d.cache().get(3).is_none());
        assert!(d.selection().is_empty());
        assert_eq!(d.query(), Some(&query("b")));
    }

    #[test]
    fn same_query_with_new_total_starts_over() {
        let mut d = Dashboard::default();
        d.apply_search(query("a"), &response(40, vec![0, 1], 0..20)).unwrap();
        d.select(SessionId::from("s3"));

        d.apply_search(query("a"), &response(12, vec![1], 10..12)).unwrap();
        assert_eq!(d.cache().full_count(), 12);
        assert_eq!(d.cache().fetched_count(), 2);
        assert!(d.cache().get(3).is_none());
        assert_eq!(d.cache().get(10).map(|s| s.id.as_str()), Some("s10"));
        assert!(d.selection().is_empty());
        assert_eq!(d.query(), Some(&query("a")));
    }

    #[test]
    fn missing_page_length_falls_back_to_config() {
        let mut d = Dashboard::new(Config {
            page_length: 5,
            ..Config::default()
        });
        let mut r = response(20, vec![2], 0..5);
        r.page_length = None;
        d.apply_search(query("a"), &r).unwrap();
        assert_eq!(d.cache().get(10).map(|s| s.id.as_str()), Some("s0"));
    }

    #[test]
    fn rejected_fresh_search_keeps_old_state() {
        let mut d = Dashboard::default();
        d.apply_search(query("a"), &response(40, vec![0], 0..10)).unwrap();
        let err = d
            .apply_search(query("b"), &response(5, vec![0], 0..10))
            .unwrap_err();
        assert_matches!(err, Error::MergeOutOfBounds { index: 5, full_count: 5 });
        assert_eq!(d.query(), Some(&query("a")));
        assert_eq!(d.cache().full_count(), 40);
    }

    #[test]
    fn selection_and_whole_set_aggregates() {
        let mut d = Dashboard::default();
        d.apply_search(query("a"), &response(30, vec![0], 0..10)).unwrap();
        d.select(SessionId::from("s2"));
        d.select(SessionId::from("s5"));
        d.select(SessionId::from("s25"));

        let whole = d.whole_set_aggregate();
        assert_eq!((whole.count, whole.avg_fps, whole.avg_mem), (30, 33.0, 330.0));

        let sel = d.selected_aggregate();
        assert_eq!(sel.count, 2);
        assert_eq!(sel.avg_fps, 3.0);
        assert_eq!(sel.avg_mem, 35.0);
        assert_eq!(sel.unresolved, 1);

        d.deselect(&SessionId::from("s25"));
        assert_eq!(d.selected_aggregate().unresolved, 0);
    }

    #[test]
    fn bad_detail_keeps_previous_timeline() {
        let at = |s: &str| parse_timestamp(s).unwrap();
        let iv = |ts: &str, room: &str| Interval {
            ts: at(ts),
            fps_avg: 60.0,
            memory_used: 1.0,
            room_def_id: RoomId::from(room),
            num_events: 0,
            events: vec![],
        };

        let mut d = Dashboard::default();
        d.load_session_detail(
            SessionId::from("s1"),
            "u1",
            SessionDetailResponse {
                intervals: vec![iv("2016-03-01 12:00:00", "A"), iv("2016-03-01 12:00:01", "B")],
            },
        )
        .unwrap();

        let bad = SessionDetailResponse {
            intervals: vec![iv("2016-03-01 12:00:09", "A"), iv("2016-03-01 12:00:01", "A")],
        };
        assert!(d.load_session_detail(SessionId::from("s2"), "u2", bad).is_err());
        assert_eq!(d.intervals().len(), 2);
        assert_eq!(d.chart().title, "User: u1 - Session: s1");
    }
}
