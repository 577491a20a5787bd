use crate::error::{Error, Result};
use crate::ids::SessionId;
use crate::session::{SessionSummary, TableRow};

/// Absolute index of the first entry of `page`, or `None` if it overflows
pub fn page_start(page: usize, page_length: usize) -> Option<usize> {
    page.checked_mul(page_length)
}

/// Outcome of merging one search response into the cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Slots written (new or overwritten)
    pub written: usize,
    /// Entries of the flat list that no requested page accounted for
    pub unplaced: usize,
}

/// Fixed-size, possibly sparse view of a full search result.
///
/// Slot `i` holds the `i`-th session in the server's ordering once a page
/// covering it has been merged; until then it is `None`. The length is the
/// server-reported `fullCount` and never changes after initialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPageCache {
    slots: Vec<Option<SessionSummary>>,
    avg_fps: f64,
    avg_mem: f64,
}

impl SessionPageCache {
    /// Allocate `full_count` placeholder slots for a fresh result set
    pub fn initialize(full_count: usize, avg_fps: f64, avg_mem: f64) -> Self {
        Self {
            slots: vec![None; full_count],
            avg_fps,
            avg_mem,
        }
    }

    pub fn full_count(&self) -> usize {
        self.slots.len()
    }

    /// Server-side mean FPS over the whole result set
    pub fn avg_fps(&self) -> f64 {
        self.avg_fps
    }

    /// Server-side mean memory over the whole result set
    pub fn avg_mem(&self) -> f64 {
        self.avg_mem
    }

    pub fn get(&self, index: usize) -> Option<&SessionSummary> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn slots(&self) -> &[Option<SessionSummary>] {
        &self.slots
    }

    /// Entries that have been fetched, in result order
    pub fn fetched(&self) -> impl Iterator<Item = &SessionSummary> {
        self.slots.iter().flatten()
    }

    pub fn fetched_count(&self) -> usize {
        self.fetched().count()
    }

    pub fn find(&self, id: &SessionId) -> Option<&SessionSummary> {
        self.fetched().find(|s| &s.id == id)
    }

    /// One table row per slot; unfetched slots render blank
    pub fn rows(&self) -> Vec<TableRow> {
        self.slots
            .iter()
            .map(|slot| TableRow::from(slot.as_ref()))
            .collect()
    }

    /// Write a page window into its absolute positions.
    ///
    /// The `i`-th entry of `pages` owns `sessions[i * page_length ..
    /// (i + 1) * page_length]`, placed from `page_start(pages[i], page_length)`.
    /// A short final page leaves the rest of its slots untouched. Writes are
    /// positional, so responses for the same query may arrive in any order.
    ///
    /// Any write past `full_count` rejects the whole merge and leaves the
    /// cache unchanged. Indices that overflow `usize` are reported as
    /// `usize::MAX`.
    pub fn merge_pages(
        &mut self,
        pages: &[usize],
        page_length: usize,
        sessions: &[SessionSummary],
    ) -> Result<MergeReport> {
        if page_length == 0 {
            return Err(Error::ZeroPageLength);
        }

        let placements: Vec<(usize, &SessionSummary)> = sessions
            .chunks(page_length)
            .zip(pages)
            .flat_map(|(chunk, &page)| {
                let start = page_start(page, page_length);
                chunk.iter().enumerate().map(move |(offset, s)| {
                    let index = start.and_then(|st| st.checked_add(offset));
                    (index.unwrap_or(usize::MAX), s)
                })
            })
            .collect();

        let full_count = self.full_count();
        if let Some(&(index, _)) = placements.iter().find(|(index, _)| *index >= full_count) {
            log::warn!(
                "rejecting merge of pages {pages:?}: index {index} is outside {full_count} results"
            );
            return Err(Error::MergeOutOfBounds { index, full_count });
        }

        let report = MergeReport {
            written: placements.len(),
            unplaced: sessions.len() - placements.len(),
        };
        if report.unplaced > 0 {
            log::debug!(
                "{} sessions fell outside requested pages {pages:?}",
                report.unplaced
            );
        }

        for (index, session) in placements {
            self.slots[index] = Some(session.clone());
        }

        log::debug!(
            "merged pages {pages:?} ({} entries), {}/{} slots fetched",
            report.written,
            self.fetched_count(),
            full_count
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::RoomId;
    use assert_matches::assert_matches;

    fn summary(n: usize) -> SessionSummary {
        SessionSummary {
            user_id: format!("user{n}"),
            device_type: "phone".into(),
            platform: 8,
            start_time: "2016-03-01 12:00:00".into(),
            id: SessionId::new(format!("s{n}")),
            room_def_id: RoomId::from("1"),
            build_type: 1,
            avg_fps: 30.0,
            avg_mem: 100.0,
        }
    }

    fn batch(range: std::ops::Range<usize>) -> Vec<SessionSummary> {
        range.map(summary).collect()
    }

    #[test]
    fn page_start_is_page_times_length() {
        assert_eq!(page_start(0, 10), Some(0));
        assert_eq!(page_start(1, 10), Some(10));
        assert_eq!(page_start(7, 25), Some(175));
        assert_eq!(page_start(1 << 63, 2), None);
    }

    #[test]
    fn initialize_fills_placeholders() {
        let cache = SessionPageCache::initialize(25, 45.0, 300.0);
        assert_eq!(cache.full_count(), 25);
        assert_eq!(cache.fetched_count(), 0);
        assert!(cache.rows().iter().all(TableRow::is_blank));
    }

    #[test]
    fn single_page_lands_at_its_offset() {
        let mut cache = SessionPageCache::initialize(25, 0.0, 0.0);
        let sessions = batch(100..110);
        let report = cache.merge_pages(&[1], 10, &sessions).unwrap();

        assert_eq!(report.written, 10);
        for k in 0..10 {
            assert_eq!(cache.get(10 + k), Some(&sessions[k]));
        }
        assert_eq!(cache.get(9), None);
        assert_eq!(cache.get(20), None);
    }

    #[test]
    fn window_with_short_last_page() {
        let mut cache = SessionPageCache::initialize(25, 0.0, 0.0);
        let sessions = batch(0..24);
        cache.merge_pages(&[0, 1, 2], 10, &sessions).unwrap();

        for i in 0..24 {
            assert_eq!(cache.get(i), Some(&sessions[i]));
        }
        assert_eq!(cache.get(24), None);
        assert_eq!(cache.full_count(), 25);
    }

    #[test]
    fn merges_keep_earlier_pages() {
        let mut cache = SessionPageCache::initialize(30, 0.0, 0.0);
        cache.merge_pages(&[0, 1], 10, &batch(0..20)).unwrap();
        cache.merge_pages(&[2], 10, &batch(20..30)).unwrap();
        assert_eq!(cache.fetched_count(), 30);
        assert_eq!(cache.get(5).map(|s| s.id.as_str()), Some("s5"));
    }

    #[test]
    fn out_of_order_windows_converge() {
        let older = batch(0..30);
        let newer = batch(10..40);

        let mut in_order = SessionPageCache::initialize(40, 0.0, 0.0);
        in_order.merge_pages(&[0, 1, 2], 10, &older).unwrap();
        in_order.merge_pages(&[1, 2, 3], 10, &newer).unwrap();

        let mut reversed = SessionPageCache::initialize(40, 0.0, 0.0);
        reversed.merge_pages(&[1, 2, 3], 10, &newer).unwrap();
        reversed.merge_pages(&[0, 1, 2], 10, &older).unwrap();

        assert_eq!(in_order, reversed);
    }

    #[test]
    fn out_of_bounds_merge_is_rejected_and_leaves_cache_alone() {
        let mut cache = SessionPageCache::initialize(15, 0.0, 0.0);
        let before = cache.clone();
        let err = cache.merge_pages(&[1], 10, &batch(0..10)).unwrap_err();

        assert_matches!(
            err,
            Error::MergeOutOfBounds {
                index: 15,
                full_count: 15
            }
        );
        assert_eq!(cache, before);
        assert_eq!(cache.full_count(), 15);
    }

    #[test]
    fn overflowing_page_number_is_rejected() {
        let mut cache = SessionPageCache::initialize(4, 0.0, 0.0);
        let before = cache.clone();
        let err = cache.merge_pages(&[1 << 63], 2, &batch(0..2)).unwrap_err();

        assert_matches!(
            err,
            Error::MergeOutOfBounds {
                index: usize::MAX,
                full_count: 4
            }
        );
        assert_eq!(cache, before);
        assert_eq!(cache.get(0), None);
    }

    #[test]
    fn page_start_near_the_limit_is_out_of_bounds_not_wrapped() {
        let mut cache = SessionPageCache::initialize(4, 0.0, 0.0);
        let page = usize::MAX / 2;
        let err = cache.merge_pages(&[page], 2, &batch(0..2)).unwrap_err();
        assert_matches!(err, Error::MergeOutOfBounds { full_count: 4, .. });
        assert_eq!(cache.fetched_count(), 0);
    }

    #[test]
    fn zero_page_length_is_rejected() {
        let mut cache = SessionPageCache::initialize(5, 0.0, 0.0);
        assert_matches!(
            cache.merge_pages(&[0], 0, &batch(0..1)),
            Err(Error::ZeroPageLength)
        );
    }

    #[test]
    fn extra_entries_beyond_requested_pages_are_reported() {
        let mut cache = SessionPageCache::initialize(20, 0.0, 0.0);
        let report = cache.merge_pages(&[0], 10, &batch(0..12)).unwrap();
        assert_eq!(report.written, 10);
        assert_eq!(report.unplaced, 2);
        assert_eq!(cache.get(10), None);
    }

    #[test]
    fn find_only_sees_fetched_entries() {
        let mut cache = SessionPageCache::initialize(20, 0.0, 0.0);
        cache.merge_pages(&[1], 10, &batch(10..15)).unwrap();
        assert!(cache.find(&SessionId::from("s12")).is_some());
        assert!(cache.find(&SessionId::from("s3")).is_none());
    }
}
