use crate::error::Result;
use crate::ids::RoomId;
use crate::interval::Interval;
use crate::session::SessionSummary;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Decode a JSON response body
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(body)?)
}

/// Constraints of a session search; `None` means unconstrained
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchQuery {
    pub user: Option<String>,
    pub device_type: Option<String>,
    pub platform: Option<String>,
    pub build_type: Option<String>,
    pub build_version: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub room_def_id: Option<String>,
}

impl SearchQuery {
    /// Build a query from search-form fields.
    ///
    /// Empty fields are unconstrained, as is `"0"` in the device type, build
    /// version and room pickers (their "any" entry). Unknown fields are
    /// ignored.
    pub fn from_form<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut query = SearchQuery::default();
        for (name, value) in fields {
            let value = value.trim();
            let any_choice = value == "0" && matches!(name, "deviceType" | "buildVersion" | "room");
            let value = (!value.is_empty() && !any_choice).then(|| value.to_string());

            match name {
                "username" => query.user = value,
                "deviceType" => query.device_type = value,
                "platform" => query.platform = value,
                "buildType" => query.build_type = value,
                "buildVersion" => query.build_version = value,
                "startTime" => query.start_time = value,
                "endTime" => query.end_time = value,
                "room" => query.room_def_id = value,
                _ => {}
            }
        }
        query
    }
}

fn first_page() -> Vec<usize> {
    vec![0]
}

/// Body of a search response: totals plus one page window of rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub full_count: usize,
    #[serde(default)]
    pub avg_fps: f64,
    #[serde(default)]
    pub avg_mem: f64,
    #[serde(default = "first_page")]
    pub pages: Vec<usize>,
    #[serde(default)]
    pub page_length: Option<usize>,
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
}

/// Body of a session-detail response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetailResponse {
    pub intervals: Vec<Interval>,
}

/// One entry of the room picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: RoomId,
    pub name: String,
}

/// Body of a room-list response, in picker order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCatalog {
    #[serde(default)]
    pub rooms: Vec<RoomInfo>,
}

impl RoomCatalog {
    pub fn name(&self, id: &RoomId) -> Option<&str> {
        self.rooms
            .iter()
            .find(|room| &room.id == id)
            .map(|room| room.name.as_str())
    }

    /// Display label for a room: its catalogue name, else the raw id
    pub fn label(&self, id: &RoomId) -> String {
        self.name(id).map_or_else(|| id.to_string(), str::to_string)
    }
}
