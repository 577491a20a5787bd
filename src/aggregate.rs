use crate::page_cache::SessionPageCache;
use crate::selection::SelectionSet;
use crate::util::floored_mean;
use serde::Serialize;
use std::collections::HashSet;

/// Count and mean performance figures for a set of sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Aggregate {
    pub count: usize,
    pub avg_fps: f64,
    pub avg_mem: f64,
    /// Selected ids with no fetched entry, left out of the means
    pub unresolved: usize,
}

/// Which sessions an aggregate covers
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// Every match of the current query, as summarized by the server
    WholeSet,
    /// Only the operator's selection
    Selection(&'a SelectionSet),
}

pub fn aggregate(cache: &SessionPageCache, scope: Scope<'_>) -> Aggregate {
    match scope {
        Scope::WholeSet => whole_set(cache),
        Scope::Selection(selection) => selected(cache, selection),
    }
}

/// Server totals for the whole result set; most pages may be unfetched, so
/// nothing is recomputed locally.
pub fn whole_set(cache: &SessionPageCache) -> Aggregate {
    Aggregate {
        count: cache.full_count(),
        avg_fps: cache.avg_fps(),
        avg_mem: cache.avg_mem(),
        unresolved: 0,
    }
}

/// Floored means over the fetched entries whose id is selected.
///
/// Selected ids whose page has not been fetched cannot contribute; they are
/// counted in `unresolved` instead of failing. An empty match reports zero
/// means.
pub fn selected(cache: &SessionPageCache, selection: &SelectionSet) -> Aggregate {
    let matched: Vec<_> = cache
        .fetched()
        .filter(|s| selection.contains(&s.id))
        .collect();

    let resolved: HashSet<_> = matched.iter().map(|s| &s.id).collect();
    let unresolved = selection.len() - resolved.len();
    if unresolved > 0 {
        log::debug!("{unresolved} selected sessions are not fetched yet");
    }

    Aggregate {
        count: matched.len(),
        avg_fps: floored_mean(matched.iter().map(|s| s.avg_fps)),
        avg_mem: floored_mean(matched.iter().map(|s| s.avg_mem)),
        unresolved,
    }
}
