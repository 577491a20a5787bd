// Library surface: the analytics core the dashboard calls into, plus the
// config plumbing shared with the replay binary in main.rs.
pub mod aggregate;
pub mod app_dirs;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod ids;
pub mod interval;
pub mod page_cache;
pub mod search;
pub mod segment;
pub mod selection;
pub mod session;
pub mod util;

pub use aggregate::{Aggregate, Scope};
pub use dashboard::Dashboard;
pub use error::{Error, Result};
pub use ids::{RoomId, SessionId};
pub use interval::{Interval, IntervalStore};
pub use page_cache::SessionPageCache;
pub use segment::RoomSegment;
pub use selection::SelectionSet;
pub use session::SessionSummary;
